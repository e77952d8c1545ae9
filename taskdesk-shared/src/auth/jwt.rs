/// JWT token generation and validation
///
/// TaskDesk issues a single kind of bearer token at registration, login and
/// profile update. Tokens are signed with HS256 and carry the user id as the
/// subject; the user's role is looked up on every request rather than
/// trusted from the token.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 7 days by default, configurable
/// - **Validation**: signature, `exp`, `nbf` and issuer (`"taskdesk"`)
/// - **Secret**: at least 32 bytes, enforced by the API configuration
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let secret = "your-secret-key-at-least-32-bytes-long";
///
/// let token = create_token(&Claims::new(user_id), secret)?;
/// let claims = validate_token(&token, secret)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value of the `iss` claim
pub const ISSUER: &str = "taskdesk";

/// Default token lifetime in hours (7 days)
pub const DEFAULT_EXPIRATION_HOURS: i64 = 24 * 7;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, issuer or format check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// JWT claims
///
/// - `sub`: user id
/// - `iss`: always `"taskdesk"`
/// - `iat` / `nbf`: issue time (Unix seconds)
/// - `exp`: expiration (Unix seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl Claims {
    /// Claims with the default 7 day lifetime
    pub fn new(user_id: Uuid) -> Self {
        Self::with_expiration(user_id, Duration::hours(DEFAULT_EXPIRATION_HOURS))
    }

    /// Claims expiring `expires_in` from now
    ///
    /// # Example
    ///
    /// ```
    /// use taskdesk_shared::auth::jwt::Claims;
    /// use chrono::Duration;
    /// use uuid::Uuid;
    ///
    /// let claims = Claims::with_expiration(Uuid::new_v4(), Duration::hours(1));
    /// assert_eq!(claims.exp - claims.iat, 3600);
    /// ```
    pub fn with_expiration(user_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

}

/// Signs claims into a token string using HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and returns its claims
///
/// # Errors
///
/// - `JwtError::Expired` when `exp` has passed
/// - `JwtError::ValidationError` for a bad signature, wrong issuer, token
///   used before `nbf`, or malformed input
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
