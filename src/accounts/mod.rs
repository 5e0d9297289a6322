use crate::state::AppState;
use axum::{routing::post, Router};

pub mod codes;
mod dto;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::signup))
        .route("/verify", post(handlers::verify))
        .route("/login", post(handlers::login))
        .route("/resend", post(handlers::resend))
        .route("/forgot-password", post(handlers::forgot_password))
        .route("/verify-reset-code", post(handlers::verify_reset_code))
        .route("/reset-password", post(handlers::reset_password))
}
