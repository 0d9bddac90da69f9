use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum YouTubeError {
    #[error("API returned error code {0}: {1}")]
    ErrorResponse(i64, String),
    #[error("OAuth endpoint returned error '{0}': {1}")]
    OAuthError(String, String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error("missing field '{0}' for video {1}")]
    MissingField(&'static str, String),
    #[error("field '{0}' is not a valid count: {1}")]
    InvalidCount(&'static str, String),
    #[error("authorization denied by user: {0}")]
    AuthorizationDenied(String),
    #[error("state parameter of authorization callback does not match")]
    StateMismatch,
}
