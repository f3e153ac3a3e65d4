use crate::{
    data::{
        pagination::PageRequest,
        predicate::SearchFilters,
        student::{Student, StudentForm},
    },
    error::RosterResult,
};
use std::future::Future;

#[cfg(test)]
pub mod memory;
pub mod pagination;
pub mod postgres;
pub mod predicate;
pub mod student;
pub mod translit;

///one page of records, plus how many records there are in total across every page
pub type Listing = (Vec<Student>, u64);

///Everything the HTTP layer needs from storage.
///
///`Option`/`bool` results signal a missing id, which is kept apart from storage failures in `Err`.
pub trait StudentRepository: Clone + Send + Sync + 'static {
    fn list(&self, page: PageRequest) -> impl Future<Output = RosterResult<Listing>> + Send;

    fn get(&self, id: i32) -> impl Future<Output = RosterResult<Option<Student>>> + Send;

    fn create(&self, form: StudentForm) -> impl Future<Output = RosterResult<Student>> + Send;

    ///replaces every field, not just the ones that changed
    fn update(
        &self,
        id: i32,
        form: StudentForm,
    ) -> impl Future<Output = RosterResult<Option<Student>>> + Send;

    fn delete(&self, id: i32) -> impl Future<Output = RosterResult<bool>> + Send;

    ///sorted by last, first, then middle name so that pages stay put between calls
    fn search(
        &self,
        filters: &SearchFilters,
        page: PageRequest,
    ) -> impl Future<Output = RosterResult<Listing>> + Send;
}
