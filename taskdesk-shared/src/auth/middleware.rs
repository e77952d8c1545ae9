/// Bearer token authentication
///
/// Every protected request carries `Authorization: Bearer <token>`. The token
/// is validated, then the user it names is loaded so that deleted accounts
/// lose access immediately and role changes take effect without reissuing
/// tokens.
///
/// The resulting [`AuthContext`] is inserted into request extensions by the
/// API's middleware layer and read by handlers with `Extension<AuthContext>`.
///
/// # Example
///
/// ```no_run
/// use axum::{extract::Request, Extension};
/// use taskdesk_shared::auth::middleware::{authenticate, AuthContext};
/// use sqlx::PgPool;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, user {} ({})", auth.user_id, auth.role.as_str())
/// }
///
/// # async fn layer(pool: PgPool, mut req: Request) -> Result<(), Box<dyn std::error::Error>> {
/// let auth = authenticate(&pool, "jwt-secret", req.headers()).await?;
/// req.extensions_mut().insert(auth);
/// # Ok(())
/// # }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};
use crate::models::user::{User, UserRole};

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn from_user(user: &User) -> Self {
        Self::new(user.id, user.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Error type for authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Not authorized, no token")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("{0}")]
    InvalidFormat(String),

    /// Signature, issuer or format check failed
    #[error("Not authorized, token failed")]
    InvalidToken(String),

    #[error("Token has expired")]
    TokenExpired,

    /// Token is valid but the user no longer exists
    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::TokenExpired,
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
///
/// The scheme is matched case-insensitively.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Invalid authorization header".to_string()))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidFormat("Expected Bearer token".to_string()));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Expected Bearer token".to_string()));
    }

    Ok(token)
}

/// Validates the bearer token and resolves the user behind it
///
/// # Errors
///
/// - `MissingCredentials` / `InvalidFormat` for a missing or malformed header
/// - `InvalidToken` / `TokenExpired` when validation fails
/// - `UserNotFound` when the subject no longer exists
/// - `DatabaseError` if the lookup fails
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = extract_bearer(headers)?;
    let claims = validate_token(token, secret)?;

    let user = User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    Ok(AuthContext::from_user(&user))
}
