use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;

use crate::{
    auth::{AuthMiddleware, AuthenticatedUserId, LoginRequest, RegisterRequest},
    error::AppError,
    state::AppState,
    validation::ValidatedJson,
};

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::BadRequest(format!("{} is required", field)))
}

/// Register a new user
///
/// Creates the account, starts a session and returns the public user record.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    body: ValidatedJson<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let input = body.into_inner();
    let user = state
        .credentials
        .create_user(
            &required(input.name, "Name")?,
            &required(input.email, "Email")?,
            &required(input.password, "Password")?,
        )
        .await?;

    let token = state.sessions.issue(user.id)?;
    Ok(HttpResponse::Created()
        .cookie(state.sessions.session_cookie(token))
        .json(json!({ "success": true, "user": user })))
}

/// Login user
///
/// Checks the credentials and starts a session.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: ValidatedJson<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let input = body.into_inner();
    let user = state
        .credentials
        .authenticate(
            &required(input.email, "Email")?,
            &required(input.password, "Password")?,
        )
        .await?;

    let token = state.sessions.issue(user.id)?;
    Ok(HttpResponse::Ok()
        .cookie(state.sessions.session_cookie(token))
        .json(json!({ "success": true, "user": user })))
}

/// Clears the session cookie. Needs no session, so it never fails.
#[post("/logout")]
pub async fn logout(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok()
        .cookie(state.sessions.revoke())
        .json(json!({ "success": true, "message": "Logged out successfully" }))
}

/// Current user
///
/// A valid session whose user has since disappeared is treated as no session.
#[get("/me", wrap = "AuthMiddleware")]
pub async fn me(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user = state
        .credentials
        .find_by_id(user_id.0)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not authorized, user not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "user": user })))
}
