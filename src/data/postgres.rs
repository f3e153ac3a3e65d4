use crate::{
    data::{
        Listing, StudentRepository,
        pagination::PageRequest,
        predicate::{self, Predicate, SearchFilters},
        student::{Student, StudentForm},
    },
    error::{CommitTransactionSnafu, MakeQuerySnafu, RosterResult},
    state::RosterState,
};
use futures::TryStreamExt;
use snafu::ResultExt;
use sqlx::{Postgres, QueryBuilder};

const STABLE_ORDER: &str = " ORDER BY last_name, first_name, middle_name, id";

#[derive(Clone, Debug)]
pub struct PostgresStudentRepository {
    state: RosterState,
}

impl PostgresStudentRepository {
    pub const fn new(state: RosterState) -> Self {
        Self { state }
    }
}

///`LIKE` pattern matching `needle` literally anywhere in the column
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::All => {
            builder.push("TRUE");
        }
        Predicate::And { all } => push_joined(builder, all, " AND ", "TRUE"),
        Predicate::Or { any } => push_joined(builder, any, " OR ", "FALSE"),
        Predicate::Contains { field, needle } => {
            builder
                .push(field.column())
                .push(" ILIKE ")
                .push_bind(like_pattern(needle));
        }
        Predicate::CourseEquals { course } => {
            builder.push("course = ").push_bind(*course);
        }
    }
}

fn push_joined(
    builder: &mut QueryBuilder<'_, Postgres>,
    parts: &[Predicate],
    separator: &str,
    when_empty: &str,
) {
    if parts.is_empty() {
        builder.push(when_empty);
        return;
    }

    builder.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            builder.push(separator);
        }
        push_predicate(builder, part);
    }
    builder.push(")");
}

fn push_filtered_statement(builder: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    builder.push("SELECT * FROM public.students WHERE ");
    push_predicate(builder, predicate);
    builder.push(STABLE_ORDER);
}

fn window(page: PageRequest) -> (i64, i64) {
    (
        i64::try_from(page.offset()).unwrap_or(i64::MAX),
        i64::try_from(page.limit()).unwrap_or(i64::MAX),
    )
}

fn total_from_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

impl StudentRepository for PostgresStudentRepository {
    async fn list(&self, page: PageRequest) -> RosterResult<Listing> {
        let (offset, limit) = window(page);
        let mut conn = self.state.get_connection().await?;

        let students: Vec<Student> = sqlx::query_as(
            "SELECT * FROM public.students ORDER BY last_name, first_name, middle_name, id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch(&mut *conn)
        .try_collect()
        .await
        .context(MakeQuerySnafu)?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM public.students")
            .fetch_one(&mut *conn)
            .await
            .context(MakeQuerySnafu)?;

        Ok((students, total_from_count(count)))
    }

    async fn get(&self, id: i32) -> RosterResult<Option<Student>> {
        let mut conn = self.state.get_connection().await?;
        sqlx::query_as::<_, Student>("SELECT * FROM public.students WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn create(&self, form: StudentForm) -> RosterResult<Student> {
        let StudentForm {
            last_name,
            first_name,
            middle_name,
            course,
            group,
            faculty,
        } = form;

        let mut conn = self.state.get_connection().await?;
        let student = sqlx::query_as::<_, Student>(
            "INSERT INTO public.students (last_name, first_name, middle_name, course, \"group\", faculty) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(last_name)
        .bind(first_name)
        .bind(middle_name)
        .bind(course)
        .bind(group)
        .bind(faculty)
        .fetch_one(&mut *conn)
        .await
        .context(MakeQuerySnafu)?;

        info!(id = student.id, "Created student");
        Ok(student)
    }

    async fn update(&self, id: i32, form: StudentForm) -> RosterResult<Option<Student>> {
        let StudentForm {
            last_name,
            first_name,
            middle_name,
            course,
            group,
            faculty,
        } = form;

        //existence check and write in one statement
        let mut conn = self.state.get_connection().await?;
        let student = sqlx::query_as::<_, Student>(
            "UPDATE public.students SET last_name = $2, first_name = $3, middle_name = $4, course = $5, \"group\" = $6, faculty = $7, updated_at = CURRENT_TIMESTAMP WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(last_name)
        .bind(first_name)
        .bind(middle_name)
        .bind(course)
        .bind(group)
        .bind(faculty)
        .fetch_optional(&mut *conn)
        .await
        .context(MakeQuerySnafu)?;

        match &student {
            Some(_) => info!(id, "Updated student"),
            None => debug!(id, "Tried to update missing student"),
        }
        Ok(student)
    }

    async fn delete(&self, id: i32) -> RosterResult<bool> {
        let mut conn = self.state.get_connection().await?;
        let removed = sqlx::query("DELETE FROM public.students WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .context(MakeQuerySnafu)?
            .rows_affected()
            > 0;

        if removed {
            info!(id, "Deleted student");
        }
        Ok(removed)
    }

    async fn search(&self, filters: &SearchFilters, page: PageRequest) -> RosterResult<Listing> {
        let predicate = predicate::build(filters);
        debug!(?predicate, ?page, "Searching students");

        let (offset, limit) = window(page);

        let mut rows = QueryBuilder::new("");
        push_filtered_statement(&mut rows, &predicate);
        rows.push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let mut matches = QueryBuilder::new("SELECT COUNT(*) FROM (");
        push_filtered_statement(&mut matches, &predicate);
        matches.push(") AS matches");

        //both reads come from the same snapshot so `total` agrees with the page
        let mut tx = self.state.get_transaction().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .context(MakeQuerySnafu)?;

        let students = rows
            .build_query_as::<Student>()
            .fetch_all(&mut *tx)
            .await
            .context(MakeQuerySnafu)?;
        let count: i64 = matches
            .build_query_scalar()
            .fetch_one(&mut *tx)
            .await
            .context(MakeQuerySnafu)?;

        tx.commit().await.context(CommitTransactionSnafu)?;

        Ok((students, total_from_count(count)))
    }
}
