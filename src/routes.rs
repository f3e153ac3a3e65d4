use crate::{
    data::StudentRepository,
    routes::students::{
        create_student, delete_student, get_student, list_students, update_student,
    },
};
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod extract;
pub mod students;

pub fn router<R: StudentRepository>(repo: R) -> Router {
    Router::new()
        .route(
            "/api/v1/students",
            get(list_students::<R>).post(create_student::<R>),
        )
        .route(
            "/api/v1/students/{id}",
            get(get_student::<R>)
                .patch(update_student::<R>)
                .delete(delete_student::<R>),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(repo)
}
