use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::Result;
use crate::models::{ConfirmMeetupRequest, Match, MatchView};
use crate::routes::{AppState, AuthenticatedUser};

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/matches", web::get().to(list_matches))
        .route("/matches/{match_id}/extend", web::post().to(extend_match))
        .route("/matches/{match_id}/freeze", web::post().to(freeze_match))
        .route("/matches/{match_id}/unfreeze", web::post().to(unfreeze_match))
        .route("/matches/{match_id}/meetup", web::post().to(confirm_meetup))
        .route("/matches/{match_id}/met", web::post().to(mark_met));
}

/// GET /api/v1/matches
async fn list_matches(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let matches = state.lifecycle.matches_for_user(&user.user_id).await?;
    tracing::info!("Returning {} matches for user {}", matches.len(), user.user_id);
    Ok(HttpResponse::Ok().json(matches))
}

/// POST /api/v1/matches/{match_id}/extend
async fn extend_match(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let updated = state.lifecycle.extend_match(&path, &user.user_id).await?;
    Ok(view(&state, updated, &user))
}

/// POST /api/v1/matches/{match_id}/freeze
async fn freeze_match(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let updated = state.lifecycle.freeze_match(&path, &user.user_id).await?;
    Ok(view(&state, updated, &user))
}

/// POST /api/v1/matches/{match_id}/unfreeze
async fn unfreeze_match(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let updated = state.lifecycle.unfreeze_match(&path, &user.user_id).await?;
    Ok(view(&state, updated, &user))
}

/// POST /api/v1/matches/{match_id}/meetup
///
/// Request body:
/// ```json
/// {
///   "time": "2026-10-20T19:00:00Z",
///   "location": "string"
/// }
/// ```
async fn confirm_meetup(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    req: web::Json<ConfirmMeetupRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    req.validate()?;

    let updated = state
        .lifecycle
        .confirm_meetup(&path, &user.user_id, req.time, req.location)
        .await?;
    Ok(view(&state, updated, &user))
}

/// POST /api/v1/matches/{match_id}/met
async fn mark_met(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let updated = state.lifecycle.mark_met_in_person(&path, &user.user_id).await?;
    Ok(view(&state, updated, &user))
}

fn view(state: &AppState, record: Match, user: &AuthenticatedUser) -> HttpResponse {
    let now = state.lifecycle.now();
    HttpResponse::Ok().json(MatchView::for_user(record, &user.user_id, now))
}
