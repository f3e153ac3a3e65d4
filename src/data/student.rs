use crate::error::{RosterResult, ValidationSnafu};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use time::OffsetDateTime;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_GROUP_LEN: usize = 20;
pub const COURSES: std::ops::RangeInclusive<i32> = 1..=6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: i32,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub course: i32,
    pub group: String,
    pub faculty: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

///everything about a student the caller gets to choose - used for both creating and (fully) replacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentForm {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub course: i32,
    pub group: String,
    pub faculty: String,
}

impl StudentForm {
    pub fn validate(&self) -> RosterResult<()> {
        check_text("last_name", &self.last_name, MAX_NAME_LEN)?;
        check_text("first_name", &self.first_name, MAX_NAME_LEN)?;
        check_text("middle_name", &self.middle_name, MAX_NAME_LEN)?;
        check_text("group", &self.group, MAX_GROUP_LEN)?;
        check_text("faculty", &self.faculty, MAX_NAME_LEN)?;
        check_course(self.course)
    }
}

pub fn check_course(course: i32) -> RosterResult<()> {
    ensure!(
        COURSES.contains(&course),
        ValidationSnafu {
            field: "course",
            reason: format!(
                "must be between {} and {}, got {course}",
                COURSES.start(),
                COURSES.end()
            ),
        }
    );
    Ok(())
}

//VARCHAR(n) counts characters, not bytes
fn check_text(field: &'static str, value: &str, max: usize) -> RosterResult<()> {
    ensure!(
        !value.trim().is_empty(),
        ValidationSnafu {
            field,
            reason: "must not be blank",
        }
    );
    let len = value.chars().count();
    ensure!(
        len <= max,
        ValidationSnafu {
            field,
            reason: format!("must be at most {max} characters, got {len}"),
        }
    );
    Ok(())
}
