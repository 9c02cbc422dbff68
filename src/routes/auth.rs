/// Authentication Routes
///
/// HTTP binding of the authentication service: session issuance and
/// refresh rotation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::auth::AuthService;
use crate::error::AuthError;
use crate::origin::client_origin;

pub const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";
pub const REFRESH_TOKEN_HEADER: &str = "X-Refresh-Token";

/// Query string of `POST /auth`
#[derive(Deserialize)]
pub struct IssueQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// POST /auth?userId=<subject>
///
/// Issues an access token and a refresh token for the subject.
///
/// # Errors
/// - 400: `userId` missing or empty
/// - 500: Internal server error
pub async fn issue_tokens(
    req: HttpRequest,
    query: web::Query<IssueQuery>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    let subject = query.user_id.as_deref().unwrap_or_default();
    let origin = client_origin(&req);

    let pair = service.login(subject, &origin).await?;

    Ok(HttpResponse::Ok().json(pair))
}

/// POST /auth/refresh
///
/// Exchanges the `X-Access-Token` / `X-Refresh-Token` pair for a new one.
/// The presented refresh token is consumed whether or not the caller keeps
/// the response.
///
/// # Errors
/// - 400: Either header missing or empty
/// - 401: Invalid or expired access token; unknown, mismatched or reused refresh token
/// - 500: Internal server error
pub async fn refresh_tokens(
    req: HttpRequest,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AuthError> {
    let access_token = header_value(&req, ACCESS_TOKEN_HEADER);
    let refresh_token = header_value(&req, REFRESH_TOKEN_HEADER);
    let origin = client_origin(&req);

    let pair = service.refresh(access_token, refresh_token, &origin).await?;

    Ok(HttpResponse::Ok().json(pair))
}

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> &'a str {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .unwrap_or_default()
}
