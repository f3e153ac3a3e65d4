//! In-process backend that evaluates the predicate tree directly. Lets search semantics and the
//! HTTP layer be checked without a database.

use crate::{
    data::{
        Listing, StudentRepository,
        pagination::PageRequest,
        predicate::{self, Predicate, SearchFilters, TextField},
        student::{Student, StudentForm},
    },
    error::RosterResult,
};
use std::{collections::BTreeMap, sync::Arc};
use time::OffsetDateTime;
use tokio::sync::RwLock;

#[derive(Default)]
struct Store {
    next_id: i32,
    students: BTreeMap<i32, Student>,
}

#[derive(Clone, Default)]
pub struct MemoryStudentRepository {
    store: Arc<RwLock<Store>>,
}

fn field_value(student: &Student, field: TextField) -> &str {
    match field {
        TextField::LastName => &student.last_name,
        TextField::FirstName => &student.first_name,
        TextField::MiddleName => &student.middle_name,
        TextField::Group => &student.group,
        TextField::Faculty => &student.faculty,
    }
}

pub fn evaluate(predicate: &Predicate, student: &Student) -> bool {
    match predicate {
        Predicate::All => true,
        Predicate::And { all } => all.iter().all(|p| evaluate(p, student)),
        Predicate::Or { any } => any.iter().any(|p| evaluate(p, student)),
        Predicate::Contains { field, needle } => field_value(student, *field)
            .to_lowercase()
            .contains(&needle.to_lowercase()),
        Predicate::CourseEquals { course } => student.course == *course,
    }
}

fn sorted_page<'a>(matching: impl Iterator<Item = &'a Student>, page: PageRequest) -> Listing {
    let mut matching: Vec<&Student> = matching.collect();
    matching.sort_by(|a, b| {
        (&a.last_name, &a.first_name, &a.middle_name, a.id).cmp(&(
            &b.last_name,
            &b.first_name,
            &b.middle_name,
            b.id,
        ))
    });

    let total = matching.len() as u64;
    let items = matching
        .into_iter()
        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
        .cloned()
        .collect();
    (items, total)
}

impl StudentRepository for MemoryStudentRepository {
    async fn list(&self, page: PageRequest) -> RosterResult<Listing> {
        let store = self.store.read().await;
        Ok(sorted_page(store.students.values(), page))
    }

    async fn get(&self, id: i32) -> RosterResult<Option<Student>> {
        Ok(self.store.read().await.students.get(&id).cloned())
    }

    async fn create(&self, form: StudentForm) -> RosterResult<Student> {
        let mut store = self.store.write().await;
        store.next_id += 1;

        let now = OffsetDateTime::now_utc();
        let student = Student {
            id: store.next_id,
            last_name: form.last_name,
            first_name: form.first_name,
            middle_name: form.middle_name,
            course: form.course,
            group: form.group,
            faculty: form.faculty,
            created_at: now,
            updated_at: now,
        };
        store.students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn update(&self, id: i32, form: StudentForm) -> RosterResult<Option<Student>> {
        let mut store = self.store.write().await;
        let Some(student) = store.students.get_mut(&id) else {
            return Ok(None);
        };

        student.last_name = form.last_name;
        student.first_name = form.first_name;
        student.middle_name = form.middle_name;
        student.course = form.course;
        student.group = form.group;
        student.faculty = form.faculty;
        student.updated_at = OffsetDateTime::now_utc();
        Ok(Some(student.clone()))
    }

    async fn delete(&self, id: i32) -> RosterResult<bool> {
        Ok(self.store.write().await.students.remove(&id).is_some())
    }

    async fn search(&self, filters: &SearchFilters, page: PageRequest) -> RosterResult<Listing> {
        let predicate = predicate::build(filters);
        let store = self.store.read().await;
        Ok(sorted_page(
            store.students.values().filter(|s| evaluate(&predicate, s)),
            page,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::student::tests::form;

    fn query(text: &str) -> SearchFilters {
        SearchFilters {
            query: Some(text.into()),
            ..SearchFilters::default()
        }
    }

    fn last_names(listing: &Listing) -> Vec<&str> {
        listing.0.iter().map(|s| s.last_name.as_str()).collect()
    }

    async fn seeded() -> MemoryStudentRepository {
        let repo = MemoryStudentRepository::default();
        for last_name in ["Сидоров", "Иванов", "Петров"] {
            repo.create(form(last_name, "Петр", "Сергеевич")).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn empty_search_returns_everything_sorted() {
        let repo = seeded().await;
        let listing = repo
            .search(&SearchFilters::default(), PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(listing.1, 3);
        assert_eq!(last_names(&listing), ["Иванов", "Петров", "Сидоров"]);
    }

    #[tokio::test]
    async fn partial_last_name_finds_one() {
        let repo = seeded().await;
        let listing = repo
            .search(&query("Иван"), PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(listing.1, 1);
        assert_eq!(last_names(&listing), ["Иванов"]);
    }

    #[tokio::test]
    async fn group_code_ignores_names() {
        let repo = seeded().await;
        let mut other = form("Пи-21ов", "Петр", "Сергеевич");
        other.group = "МТ-11".into();
        repo.create(other).await.unwrap();

        let listing = repo
            .search(&query("пи-21"), PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(listing.1, 3);
        assert!(listing.0.iter().all(|s| s.group == "ПИ-21"));
    }

    #[tokio::test]
    async fn name_terms_must_be_in_position() {
        let repo = MemoryStudentRepository::default();
        repo.create(form("Иванов", "Петр", "Сергеевич")).await.unwrap();
        repo.create(form("Петров", "Иванов", "Сергеевич")).await.unwrap();
        let mut in_group = form("Сидоров", "Иванов", "Сергеевич");
        in_group.group = "Иванов-Б".into();
        repo.create(in_group).await.unwrap();

        let both = repo
            .search(&query("Иванов Петр"), PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(last_names(&both), ["Иванов"]);

        //"Иванов" as a first name only counts through the group
        let single = repo
            .search(&query("Иванов"), PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(last_names(&single), ["Иванов", "Сидоров"]);
    }

    #[tokio::test]
    async fn faculty_matches_across_scripts_and_combines_with_course() {
        let repo = seeded().await;
        let mut physics = form("Абрамов", "Петр", "Сергеевич");
        physics.faculty = "Физика".into();
        repo.create(physics).await.unwrap();
        let mut first_year = form("Борисов", "Петр", "Сергеевич");
        first_year.course = 1;
        repo.create(first_year).await.unwrap();

        let translit = SearchFilters {
            faculty: Some("Informatika".into()),
            ..SearchFilters::default()
        };
        let listing = repo.search(&translit, PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(listing.1, 4);

        let combined = SearchFilters {
            faculty: Some("Информатика".into()),
            course: Some(3),
            ..SearchFilters::default()
        };
        let listing = repo.search(&combined, PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(last_names(&listing), ["Иванов", "Петров", "Сидоров"]);
    }

    #[tokio::test]
    async fn latin_e_finds_cyrillic_hard_e() {
        let repo = seeded().await;
        let mut economist = form("Егоров", "Петр", "Сергеевич");
        economist.faculty = "Экономика".into();
        repo.create(economist).await.unwrap();

        let latin = SearchFilters {
            faculty: Some("Ekonomika".into()),
            ..SearchFilters::default()
        };
        let listing = repo.search(&latin, PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(last_names(&listing), ["Егоров"]);
    }

    #[tokio::test]
    async fn pages_are_stable_and_total_ignores_window() {
        let repo = seeded().await;
        let filters = query("ов");

        let first = repo.search(&filters, PageRequest::new(1, 2)).await.unwrap();
        let again = repo.search(&filters, PageRequest::new(1, 2)).await.unwrap();
        let second = repo.search(&filters, PageRequest::new(2, 2)).await.unwrap();

        assert_eq!(first.0, again.0);
        assert_eq!(first.1, 3);
        assert_eq!(second.1, 3);
        assert_eq!(last_names(&first), ["Иванов", "Петров"]);
        assert_eq!(last_names(&second), ["Сидоров"]);

        let past_the_end = repo.search(&filters, PageRequest::new(5, 2)).await.unwrap();
        assert!(past_the_end.0.is_empty());
        assert_eq!(past_the_end.1, 3);
    }

    #[tokio::test]
    async fn missing_ids_do_not_mutate() {
        let repo = seeded().await;
        assert!(repo.update(99, form("X", "Y", "Z")).await.unwrap().is_none());
        assert!(!repo.delete(99).await.unwrap());
        assert_eq!(repo.list(PageRequest::new(1, 10)).await.unwrap().1, 3);
    }

    #[tokio::test]
    async fn update_replaces_every_field() {
        let repo = seeded().await;
        let before = repo.get(1).await.unwrap().unwrap();

        let mut replacement = form("Кузнецов", "Иван", "Ильич");
        replacement.course = 6;
        replacement.group = "ФИ-61".into();
        replacement.faculty = "Философия".into();
        let after = repo.update(1, replacement).await.unwrap().unwrap();

        assert_eq!(after.id, 1);
        assert_eq!(after.last_name, "Кузнецов");
        assert_eq!(after.course, 6);
        assert_eq!(after.group, "ФИ-61");
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= after.created_at);
    }

    #[tokio::test]
    async fn delete_removes_once() {
        let repo = seeded().await;
        assert!(repo.delete(2).await.unwrap());
        assert!(repo.get(2).await.unwrap().is_none());
        assert!(!repo.delete(2).await.unwrap());
    }
}
