use crate::{
    data::{
        StudentRepository,
        pagination::{DEFAULT_PAGE, DEFAULT_SIZE, MAX_SIZE, PageRequest, Paginated},
        predicate::SearchFilters,
        student::{Student, StudentForm, check_course},
    },
    error::{MissingStudentSnafu, RosterResult, ValidationSnafu},
    routes::extract::{ApiJson, ApiPath, ApiQuery},
};
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use snafu::{OptionExt, ensure};

#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
    page: Option<i64>,
    size: Option<i64>,
    search: Option<String>,
    faculty: Option<String>,
    course: Option<i32>,
}

impl ListQuery {
    ///Range-checks the window, and works out whether there is anything to search by at all.
    ///Empty strings count as not given.
    fn into_parts(self) -> RosterResult<(PageRequest, Option<SearchFilters>)> {
        let page = self.page.unwrap_or(DEFAULT_PAGE.into());
        ensure!(
            page >= 1,
            ValidationSnafu {
                field: "page",
                reason: format!("must be at least 1, got {page}"),
            }
        );
        let size = self.size.unwrap_or(DEFAULT_SIZE.into());
        ensure!(
            (1..=i64::from(MAX_SIZE)).contains(&size),
            ValidationSnafu {
                field: "size",
                reason: format!("must be between 1 and {MAX_SIZE}, got {size}"),
            }
        );
        if let Some(course) = self.course {
            check_course(course)?;
        }

        let page = PageRequest::new(
            u32::try_from(page).map_err(|_| {
                ValidationSnafu {
                    field: "page",
                    reason: format!("must be at most {}, got {page}", u32::MAX),
                }
                .build()
            })?,
            //checked against MAX_SIZE just above
            u32::try_from(size).unwrap_or(MAX_SIZE),
        );

        let search = self.search.filter(|s| !s.is_empty());
        let faculty = self.faculty.filter(|f| !f.is_empty());
        let filters = if search.is_some() || faculty.is_some() || self.course.is_some() {
            Some(SearchFilters {
                query: search,
                faculty,
                course: self.course,
            })
        } else {
            None
        };

        Ok((page, filters))
    }
}

pub async fn list_students<R: StudentRepository>(
    State(repo): State<R>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> RosterResult<Json<Paginated<Student>>> {
    let (page, filters) = query.into_parts()?;

    let (items, total) = match filters {
        Some(filters) => repo.search(&filters, page).await?,
        None => repo.list(page).await?,
    };

    Ok(Json(Paginated::new(items, total, page)))
}

pub async fn create_student<R: StudentRepository>(
    State(repo): State<R>,
    ApiJson(form): ApiJson<StudentForm>,
) -> RosterResult<(StatusCode, Json<Student>)> {
    form.validate()?;
    let student = repo.create(form).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn get_student<R: StudentRepository>(
    State(repo): State<R>,
    ApiPath(id): ApiPath<i32>,
) -> RosterResult<Json<Student>> {
    repo.get(id)
        .await?
        .context(MissingStudentSnafu { id })
        .map(Json)
}

pub async fn update_student<R: StudentRepository>(
    State(repo): State<R>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(form): ApiJson<StudentForm>,
) -> RosterResult<Json<Student>> {
    form.validate()?;
    repo.update(id, form)
        .await?
        .context(MissingStudentSnafu { id })
        .map(Json)
}

pub async fn delete_student<R: StudentRepository>(
    State(repo): State<R>,
    ApiPath(id): ApiPath<i32>,
) -> RosterResult<StatusCode> {
    ensure!(repo.delete(id).await?, MissingStudentSnafu { id });
    Ok(StatusCode::NO_CONTENT)
}
