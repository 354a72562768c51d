use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::{LumeError, Result};
use crate::models::{DiscoverQuery, MeetReadiness, MeetupPreference, RecordSwipeRequest, SwipeResponse};
use crate::routes::{AppState, AuthenticatedUser};
use crate::services::{DiscoveryOptions, SwipeInput};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/discover", web::get().to(discover))
        .route("/swipes", web::post().to(record_swipe));
}

/// Discovery endpoint
///
/// GET /api/v1/discover?useCompatibility=true&meetReadiness=within_48h
///
/// `meetReadiness` only changes the ranking for premium users. The view
/// quota always applies here.
async fn discover(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<DiscoverQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let meet_readiness = query
        .meet_readiness
        .as_deref()
        .map(str::parse::<MeetReadiness>)
        .transpose()
        .map_err(LumeError::Validation)?;

    tracing::info!("Discovering candidates for user: {}", user.user_id);

    let response = state
        .discovery
        .discover(
            &user.user_id,
            DiscoveryOptions {
                use_compatibility: query.use_compatibility,
                respect_quota: true,
                meet_readiness,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Record swipe endpoint
///
/// POST /api/v1/swipes
///
/// Request body:
/// ```json
/// {
///   "swipedId": "string",
///   "isLike": true,
///   "isSuperLike": false,
///   "meetupPreference": "coffee"
/// }
/// ```
async fn record_swipe(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<RecordSwipeRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    req.validate()?;

    let meetup_preference = req
        .meetup_preference
        .as_deref()
        .map(str::parse::<MeetupPreference>)
        .transpose()
        .map_err(LumeError::Validation)?;

    let outcome = state
        .swipes
        .record_swipe(
            &user.user_id,
            SwipeInput {
                swiped_id: req.swiped_id,
                is_like: req.is_like,
                is_super_like: req.is_super_like,
                meetup_preference,
            },
        )
        .await?;

    let is_match = outcome.matched.is_some();
    Ok(HttpResponse::Created().json(SwipeResponse {
        swipe: outcome.swipe,
        matched: outcome.matched,
        is_match,
    }))
}
