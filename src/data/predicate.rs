//! Turns free text plus the structured filters into a storage-agnostic condition tree.
//!
//! A query with a digit anywhere in it is taken as a group code and only ever checked against
//! `group`. Anything else is read as `last first middle`, positionally, with every term also allowed
//! to hit `group`. This means a name or faculty that legitimately contains a digit gets misrouted -
//! that is accepted rather than guessed around.

use crate::data::translit;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub faculty: Option<String>,
    pub course: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    LastName,
    FirstName,
    MiddleName,
    Group,
    Faculty,
}

impl TextField {
    ///the (already quoted where needed) column this field lives in
    pub const fn column(self) -> &'static str {
        match self {
            Self::LastName => "last_name",
            Self::FirstName => "first_name",
            Self::MiddleName => "middle_name",
            Self::Group => "\"group\"",
            Self::Faculty => "faculty",
        }
    }

    ///which name field the n-th term of a name query is compared against
    const fn for_name_position(position: usize) -> Option<Self> {
        match position {
            0 => Some(Self::LastName),
            1 => Some(Self::FirstName),
            2 => Some(Self::MiddleName),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    All,
    And { all: Vec<Predicate> },
    Or { any: Vec<Predicate> },
    ///case-insensitive substring match
    Contains { field: TextField, needle: String },
    CourseEquals { course: i32 },
}

impl Predicate {
    pub fn all(mut parts: Vec<Self>) -> Self {
        match parts.len() {
            0 => Self::All,
            1 => parts.remove(0),
            _ => Self::And { all: parts },
        }
    }

    pub fn any(mut parts: Vec<Self>) -> Self {
        match parts.len() {
            1 => parts.remove(0),
            _ => Self::Or { any: parts },
        }
    }

    pub fn contains(field: TextField, needle: impl Into<String>) -> Self {
        Self::Contains {
            field,
            needle: needle.into(),
        }
    }
}

fn has_digit(s: &str) -> bool {
    s.chars().any(char::is_numeric)
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

pub fn build(filters: &SearchFilters) -> Predicate {
    let mut parts = vec![];

    if let Some(query) = non_blank(filters.query.as_deref()) {
        parts.push(query_predicate(query));
    }

    if let Some(faculty) = non_blank(filters.faculty.as_deref()).filter(|f| !has_digit(f)) {
        let spellings = translit::variants(faculty)
            .into_iter()
            .map(|variant| Predicate::contains(TextField::Faculty, variant))
            .collect();
        parts.push(Predicate::any(spellings));
    }

    if let Some(course) = filters.course {
        parts.push(Predicate::CourseEquals { course });
    }

    Predicate::all(parts)
}

fn query_predicate(query: &str) -> Predicate {
    if has_digit(query) {
        return Predicate::contains(TextField::Group, query);
    }

    let per_term = query
        .split_whitespace()
        .enumerate()
        .map(|(position, term)| {
            let mut eligible = vec![];
            if let Some(field) = TextField::for_name_position(position) {
                eligible.push(Predicate::contains(field, term));
            }
            eligible.push(Predicate::contains(TextField::Group, term));
            Predicate::any(eligible)
        })
        .collect();

    Predicate::all(per_term)
}
