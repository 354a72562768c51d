use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::error::{LumeError, Result};
use crate::routes::AppState;

/// Bearer token claims; `sub` is the requesting user's id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// HS256 token verifier
#[derive(Clone)]
pub struct JwtVerifier {
    secret: Vec<u8>,
    issuer: Option<String>,
}

impl JwtVerifier {
    pub fn new(secret: &str, issuer: Option<String>) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            issuer,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let data = decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map_err(|e| {
                tracing::warn!(error = %e, "JWT verification failed");
                LumeError::Unauthenticated("invalid or expired token".into())
            })?;

        if data.claims.sub.is_empty() {
            return Err(LumeError::Unauthenticated("token has no subject".into()));
        }
        Ok(data.claims)
    }

    /// Sign a token for `user_id` valid for `ttl`
    pub fn issue(&self, user_id: &str, ttl: Duration) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
            iss: self.issuer.clone(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(&self.secret))
            .map_err(|e| LumeError::Internal(format!("failed to sign token: {}", e)))
    }
}

/// Extractor that requires a valid bearer token
///
/// ```ignore
/// async fn handler(user: AuthenticatedUser) -> impl Responder {
///     format!("Hello, {}", user.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = LumeError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| LumeError::Internal("application state not configured".into()))?;

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| LumeError::Unauthenticated("missing authorization token".into()))?
        .to_str()
        .map_err(|_| LumeError::Unauthenticated("invalid authorization format".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| LumeError::Unauthenticated("invalid authorization format".into()))?;

    let claims = state.auth.verify(token)?;
    Ok(AuthenticatedUser { user_id: claims.sub })
}
