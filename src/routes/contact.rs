use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;

use crate::{error::AppError, mail::ContactRequest, state::AppState, validation::ValidatedJson};

/// Relays a contact-form message through the configured mailer.
#[post("/contact")]
pub async fn send_contact(
    state: web::Data<AppState>,
    body: ValidatedJson<ContactRequest>,
) -> Result<impl Responder, AppError> {
    let message = body.into_inner().into_message()?;
    state
        .mailer
        .send(&message)
        .await
        .map_err(|err| AppError::MailDelivery(err.to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Email sent successfully",
    })))
}
