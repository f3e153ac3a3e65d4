use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;
use std::num::ParseIntError;

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error commiting SQL transaction"))]
    CommitTransaction { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    Migrate { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse `{}` as an integer", name))]
    ParseEnvInt {
        source: ParseIntError,
        name: &'static str,
    },
    #[snafu(display("Invalid `{}`: {}", field, reason))]
    Validation {
        field: &'static str,
        reason: String,
    },
    #[snafu(display("Student not found"))]
    MissingStudent { id: i32 },
}

impl From<JsonRejection> for RosterError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation {
            field: "body",
            reason: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for RosterError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation {
            field: "query",
            reason: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for RosterError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation {
            field: "path",
            reason: rejection.body_text(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for RosterError {
    #[allow(clippy::match_same_arms)]
    fn into_response(self) -> Response {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::UNPROCESSABLE_ENTITY; //bad input

        let status_code = match &self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::Migrate { .. } => ISE,
            Self::MakeQuery { .. } | Self::CommitTransaction { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParseEnvInt { .. } => ISE,
            Self::Validation { .. } => BI,
            Self::MissingStudent { .. } => NF,
        };

        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            debug!(?self, "Rejected request");
        }

        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status_code, Json(body)).into_response()
    }
}
