use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use crate::models::user::{ROLE_ADMIN, ROLE_APPLICANT, ROLE_RECRUITER};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
    pub org: Option<Uuid>,
}

fn unauthorized(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
}

fn decode_claims(req: &Request) -> Result<Claims, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(unauthorized("missing_authorization"));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(unauthorized("bad_authorization"));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(unauthorized("unsupported_scheme"));
    };

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| unauthorized("invalid_token"))
}

fn has_role(claims: &Claims, allowed: &[&str]) -> bool {
    let role = claims.role.as_deref().unwrap_or_default();
    allowed.iter().any(|r| r.eq_ignore_ascii_case(role))
}

/// Recruiter surface; admins implicitly have recruiter access. Recruiter
/// claims must carry an organization for scoping.
pub async fn require_recruiter(mut req: Request, next: Next) -> Response {
    match decode_claims(&req) {
        Ok(claims) => {
            if !has_role(&claims, &[ROLE_RECRUITER, ROLE_ADMIN]) {
                return (StatusCode::FORBIDDEN, Json(json!({"error":"forbidden"})))
                    .into_response();
            }
            if claims.org.is_none() {
                return (
                    StatusCode::FORBIDDEN,
                    Json(json!({"error":"missing_organization"})),
                )
                    .into_response();
            }
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}

pub async fn require_admin(mut req: Request, next: Next) -> Response {
    match decode_claims(&req) {
        Ok(claims) => {
            if !has_role(&claims, &[ROLE_ADMIN]) {
                return (StatusCode::FORBIDDEN, Json(json!({"error":"forbidden"})))
                    .into_response();
            }
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}

pub async fn require_applicant(mut req: Request, next: Next) -> Response {
    match decode_claims(&req) {
        Ok(claims) => {
            if !has_role(&claims, &[ROLE_APPLICANT]) {
                return (StatusCode::FORBIDDEN, Json(json!({"error":"forbidden"})))
                    .into_response();
            }
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(resp) => resp,
    }
}
