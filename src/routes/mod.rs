mod auth;
mod health_check;

pub use auth::{issue_tokens, refresh_tokens, IssueQuery, ACCESS_TOKEN_HEADER, REFRESH_TOKEN_HEADER};
pub use health_check::health_check;
