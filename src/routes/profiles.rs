use actix_web::{web, HttpResponse};

use crate::error::{LumeError, Result};
use crate::models::{CreateProfileRequest, UpdatePreferencesRequest};
use crate::routes::{AppState, AuthenticatedUser};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profiles", web::post().to(create_profile))
        .route("/profiles/me", web::get().to(get_own_profile))
        .route("/profiles/me/preferences", web::put().to(update_preferences));
}

/// POST /api/v1/profiles
///
/// The body's `id` must be the authenticated user.
async fn create_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateProfileRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    if req.id != user.user_id {
        return Err(LumeError::Unauthorized(
            "profiles can only be created for the authenticated user".into(),
        ));
    }

    let profile = state.profiles.create_profile(req).await?;
    Ok(HttpResponse::Created().json(profile))
}

/// GET /api/v1/profiles/me
async fn get_own_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let profile = state.profiles.get_profile(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /api/v1/profiles/me/preferences
///
/// Partial update; omitted fields keep their stored values.
async fn update_preferences(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<UpdatePreferencesRequest>,
) -> Result<HttpResponse> {
    let profile = state
        .profiles
        .update_preferences(&user.user_id, req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}
