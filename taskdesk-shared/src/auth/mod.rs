/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and the minimum length rule
/// - [`jwt`]: HS256 bearer token creation and validation
/// - [`middleware`]: bearer extraction and user resolution into [`middleware::AuthContext`]
/// - [`authorization`]: admin, assignee and self checks
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::auth::password::{hash_password, verify_password};
/// use taskdesk_shared::auth::jwt::{create_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_token(&Claims::new(Uuid::new_v4()), "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
