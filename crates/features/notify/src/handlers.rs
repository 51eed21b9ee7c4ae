use crate::Notify;
use crate::error::NotifyError;
use crate::templates;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use hq_derive::{api_handler, api_model};
use hq_kernel::domain::constants::NOTIFICATIONS_TAG;
use hq_kernel::server::{ApiError, ApiState, ErrorBody};
use hq_roster::model::Id;
use hq_roster::{Roster, RosterError};
use tracing::error;

#[api_model]
pub struct SendTestEmailRequest {
    pub to: Option<String>,
}

#[api_model]
pub struct NotifyPowerUpdateRequest {
    pub power_id: Option<Id>,
    pub email: Option<String>,
}

#[api_model]
pub struct WelcomeHeroRequest {
    pub hero_name: Option<String>,
    pub super_name: Option<String>,
    pub email: Option<String>,
}

#[api_model]
pub struct MessageResponse {
    pub message: String,
}

impl From<NotifyError> for ApiError {
    fn from(err: NotifyError) -> Self {
        match err {
            NotifyError::InvalidValue { message } => Self::bad_request(message),
            NotifyError::Roster { source: RosterError::NotFound { message }, .. } => {
                Self::not_found(message)
            },
            NotifyError::Roster { source, .. } => source.into(),
            err => {
                error!(error = %err, "Email delivery failed");
                Self::detailed(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send email", err)
            },
        }
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, NotifyError> {
    value.ok_or_else(|| NotifyError::required(field))
}

#[api_handler(
    post,
    path = "/send-test-email",
    request_body = SendTestEmailRequest,
    responses(
        (status = OK, body = MessageResponse),
        (status = BAD_REQUEST, description = "Missing or invalid recipient", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Delivery failed", body = ErrorBody),
    ),
    tag = NOTIFICATIONS_TAG,
)]
pub(crate) async fn send_test_email(
    State(state): State<ApiState>,
    body: Result<Json<SendTestEmailRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = body?;
    let to = required(request.to, "to")?;

    let notify = state.try_get_slice::<Notify>()?;
    notify.mailer.send(&to, &templates::test_email()).await?;

    Ok(Json(MessageResponse { message: format!("Test email sent to {to}") }))
}

#[api_handler(
    post,
    path = "/notify-power-update",
    request_body = NotifyPowerUpdateRequest,
    responses(
        (status = OK, body = MessageResponse),
        (status = BAD_REQUEST, description = "Missing field or invalid recipient", body = ErrorBody),
        (status = NOT_FOUND, description = "Power not found", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Delivery failed", body = ErrorBody),
    ),
    tag = NOTIFICATIONS_TAG,
)]
pub(crate) async fn notify_power_update(
    State(state): State<ApiState>,
    body: Result<Json<NotifyPowerUpdateRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = body?;
    let power_id = required(request.power_id, "power_id")?;
    let email = required(request.email, "email")?;

    let roster = state.try_get_slice::<Roster>()?;
    let power = roster.repository.get_power(power_id).await.map_err(NotifyError::from)?;

    let notify = state.try_get_slice::<Notify>()?;
    notify.mailer.send(&email, &templates::power_update(&power)).await?;

    Ok(Json(MessageResponse { message: format!("Power update notification sent to {email}") }))
}

#[api_handler(
    post,
    path = "/welcome-hero",
    request_body = WelcomeHeroRequest,
    responses(
        (status = OK, body = MessageResponse),
        (status = BAD_REQUEST, description = "Missing field or invalid recipient", body = ErrorBody),
        (status = INTERNAL_SERVER_ERROR, description = "Delivery failed", body = ErrorBody),
    ),
    tag = NOTIFICATIONS_TAG,
)]
pub(crate) async fn welcome_hero(
    State(state): State<ApiState>,
    body: Result<Json<WelcomeHeroRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = body?;
    let hero_name = required(request.hero_name, "hero_name")?;
    let super_name = required(request.super_name, "super_name")?;
    let email = required(request.email, "email")?;

    let notify = state.try_get_slice::<Notify>()?;
    notify.mailer.send(&email, &templates::hero_welcome(&hero_name, &super_name)).await?;

    Ok(Json(MessageResponse { message: format!("Welcome email sent to {email}") }))
}
