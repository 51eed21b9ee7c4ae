use crate::Roster;
use crate::error::RosterError;
use crate::model::{Hero, HeroDetail, HeroPowerView, Id, Power};
use crate::repository::NewHeroPower;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use hq_derive::{api_handler, api_model};
use hq_kernel::domain::constants::{HERO_POWERS_TAG, HEROES_TAG, POWERS_TAG};
use hq_kernel::server::{ApiError, ApiState, ErrorBody};
use tracing::error;

/// `PATCH /powers/{id}` body.
#[api_model]
pub struct UpdatePowerRequest {
    pub description: Option<String>,
}

/// `POST /hero_powers` body. Missing fields are reported one at a time, in declaration order.
#[api_model]
pub struct CreateHeroPowerRequest {
    pub strength: Option<String>,
    pub power_id: Option<Id>,
    pub hero_id: Option<Id>,
}

impl CreateHeroPowerRequest {
    fn into_new(self) -> Result<NewHeroPower, RosterError> {
        let strength = self.strength.ok_or(RosterError::MissingField { field: "strength" })?;
        let power_id = self.power_id.ok_or(RosterError::MissingField { field: "power_id" })?;
        let hero_id = self.hero_id.ok_or(RosterError::MissingField { field: "hero_id" })?;
        Ok(NewHeroPower { hero_id, power_id, strength })
    }
}

impl From<RosterError> for ApiError {
    fn from(err: RosterError) -> Self {
        match err {
            RosterError::NotFound { message } => Self::list(StatusCode::NOT_FOUND, message),
            RosterError::InvalidValue { message } => Self::bad_request(message),
            err @ RosterError::MissingField { .. } => Self::bad_request(err.to_string()),
            RosterError::Persistence { ref context, .. } => {
                error!(error = %err, "Roster store failure");
                Self::internal(context.as_deref().unwrap_or("accessing the roster"))
            },
            RosterError::Internal { ref context, .. } => {
                error!(error = %err, "Roster internal failure");
                Self::internal(context.as_deref().unwrap_or("accessing the roster"))
            },
        }
    }
}

/// Lookup routes answer a missing entity with `{"error": ...}`.
fn lookup_error(err: RosterError) -> ApiError {
    match err {
        RosterError::NotFound { message } => ApiError::not_found(message),
        other => other.into(),
    }
}

fn path_id(path: Result<Path<Id>, PathRejection>, missing: &'static str) -> Result<Id, ApiError> {
    path.map(|Path(id)| id).map_err(|_| ApiError::not_found(missing))
}

#[api_handler(
    get,
    path = "/heroes",
    responses(
        (status = OK, description = "All heroes ordered by id", body = Vec<Hero>),
        (status = INTERNAL_SERVER_ERROR, body = ErrorBody),
    ),
    tag = HEROES_TAG,
)]
pub(crate) async fn list_heroes(State(state): State<ApiState>) -> Result<Json<Vec<Hero>>, ApiError> {
    let roster = state.try_get_slice::<Roster>()?;
    Ok(Json(roster.repository.list_heroes().await?))
}

#[api_handler(
    get,
    path = "/heroes/{id}",
    params(("id" = i64, Path, description = "Hero id")),
    responses(
        (status = OK, description = "The hero with its powers", body = HeroDetail),
        (status = NOT_FOUND, description = "Hero not found", body = ErrorBody),
    ),
    tag = HEROES_TAG,
)]
pub(crate) async fn get_hero(
    State(state): State<ApiState>,
    path: Result<Path<Id>, PathRejection>,
) -> Result<Json<HeroDetail>, ApiError> {
    let id = path_id(path, RosterError::HERO_NOT_FOUND)?;
    let roster = state.try_get_slice::<Roster>()?;
    let hero = roster.repository.get_hero_with_powers(id).await.map_err(lookup_error)?;
    Ok(Json(hero))
}

#[api_handler(
    get,
    path = "/powers",
    responses(
        (status = OK, description = "All powers ordered by id", body = Vec<Power>),
        (status = INTERNAL_SERVER_ERROR, body = ErrorBody),
    ),
    tag = POWERS_TAG,
)]
pub(crate) async fn list_powers(State(state): State<ApiState>) -> Result<Json<Vec<Power>>, ApiError> {
    let roster = state.try_get_slice::<Roster>()?;
    Ok(Json(roster.repository.list_powers().await?))
}

#[api_handler(
    get,
    path = "/powers/{id}",
    params(("id" = i64, Path, description = "Power id")),
    responses(
        (status = OK, body = Power),
        (status = NOT_FOUND, description = "Power not found", body = ErrorBody),
    ),
    tag = POWERS_TAG,
)]
pub(crate) async fn get_power(
    State(state): State<ApiState>,
    path: Result<Path<Id>, PathRejection>,
) -> Result<Json<Power>, ApiError> {
    let id = path_id(path, RosterError::POWER_NOT_FOUND)?;
    let roster = state.try_get_slice::<Roster>()?;
    let power = roster.repository.get_power(id).await.map_err(lookup_error)?;
    Ok(Json(power))
}

/// Existence is checked before the body, so an unknown id wins over a bad payload.
#[api_handler(
    patch,
    path = "/powers/{id}",
    params(("id" = i64, Path, description = "Power id")),
    request_body = UpdatePowerRequest,
    responses(
        (status = OK, description = "The updated power", body = Power),
        (status = BAD_REQUEST, description = "Missing or invalid description", body = ErrorBody),
        (status = NOT_FOUND, description = "Power not found", body = ErrorBody),
    ),
    tag = POWERS_TAG,
)]
pub(crate) async fn update_power(
    State(state): State<ApiState>,
    path: Result<Path<Id>, PathRejection>,
    body: Result<Json<UpdatePowerRequest>, JsonRejection>,
) -> Result<Json<Power>, ApiError> {
    let id = path_id(path, RosterError::POWER_NOT_FOUND)?;
    let roster = state.try_get_slice::<Roster>()?;
    roster.repository.get_power(id).await.map_err(lookup_error)?;

    let description = body
        .ok()
        .and_then(|Json(request)| request.description)
        .ok_or_else(|| ApiError::bad_request("Description is required"))?;

    let power = roster.repository.update_power(id, &description).await.map_err(lookup_error)?;
    Ok(Json(power))
}

#[api_handler(
    post,
    path = "/hero_powers",
    request_body = CreateHeroPowerRequest,
    responses(
        (status = CREATED, description = "The association with both parents", body = HeroPowerView),
        (status = BAD_REQUEST, description = "Missing body, missing field or invalid strength", body = ErrorBody),
        (status = NOT_FOUND, description = "Hero or power not found", body = ErrorBody),
    ),
    tag = HERO_POWERS_TAG,
)]
pub(crate) async fn create_hero_power(
    State(state): State<ApiState>,
    body: Result<Json<CreateHeroPowerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<HeroPowerView>), ApiError> {
    let Json(request) = body?;
    let new = request.into_new()?;

    let roster = state.try_get_slice::<Roster>()?;
    let view = roster.repository.create_hero_power(new).await?;
    Ok((StatusCode::CREATED, Json(view)))
}
