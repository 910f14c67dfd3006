use axum::{routing::post, Router};
use password::{issue_otp, reset_password};
use utoipa::OpenApi;

use crate::app::ApiContext;

pub mod password;

pub fn router() -> Router<ApiContext> {
    Router::new()
        .route("/auth/otp", post(issue_otp))
        .route("/auth/reset-password", post(reset_password))
}

#[derive(OpenApi)]
#[openapi(paths(password::issue_otp, password::reset_password))]
pub struct AuthApi;
