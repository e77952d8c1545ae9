/// Authentication and profile endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register a new user
/// - `POST /api/auth/login` - Login and get a token
/// - `GET /api/auth/profile` - Current user's profile
/// - `PUT /api/auth/profile` - Update own profile
/// - `PUT /api/auth/profile/:id` - Update a profile (self or admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskdesk_shared::{
    auth::{authorization::require_self_or_admin, middleware::AuthContext, password},
    models::user::{CreateUser, UpdateUser, User, UserProfile, UserRole},
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    /// Checked with `validate_password_strength`
    #[serde(default)]
    pub password: String,

    #[validate(length(max = 1024, message = "Profile image URL must be at most 1024 characters"))]
    pub profile_image_url: Option<String>,

    /// Must equal `ADMIN_INVITE_TOKEN` to register as an admin
    pub admin_invite_token: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub profile_image_url: Option<String>,
    pub token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl RegisterRequest {
    /// Trims and lowercases the email so validation sees the stored form
    fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_lowercase();
        self
    }
}

impl LoginRequest {
    fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_string();
        self
    }
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

/// Profile update request; empty strings are treated as absent
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Please enter a valid email"))]
    pub email: Option<String>,

    pub password: Option<String>,

    #[validate(length(max = 1024, message = "Profile image URL must be at most 1024 characters"))]
    pub profile_image_url: Option<String>,
}

impl UpdateProfileRequest {
    fn normalized(self) -> Self {
        let keep = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            name: keep(self.name),
            email: keep(self.email).map(|e| e.to_lowercase()),
            // Passwords are taken as typed
            password: self.password.filter(|p| !p.is_empty()),
            profile_image_url: keep(self.profile_image_url),
        }
    }
}

/// Updated profile; `token` is only issued when users edit themselves
#[derive(Debug, Serialize)]
pub struct ProfileWithToken {
    #[serde(flatten)]
    pub profile: UserProfile,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub user: ProfileWithToken,
}

/// Role granted at registration
///
/// `Admin` only when an invite token is configured and the caller supplied
/// exactly that token.
pub fn role_for_invite(provided: Option<&str>, configured: Option<&str>) -> UserRole {
    match (provided, configured) {
        (Some(provided), Some(configured)) if !configured.is_empty() && provided == configured => {
            UserRole::Admin
        }
        _ => UserRole::Member,
    }
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Jane Doe",
///   "email": "jane@example.com",
///   "password": "secret1",
///   "profileImageUrl": "http://localhost:5000/uploads/1700000000000-jane.png",
///   "adminInviteToken": "optional"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or email already registered
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let req = req.normalized();
    req.validate()?;

    password::validate_password_strength(&req.password)
        .map_err(|e| ApiError::invalid_field("password", e))?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::BadRequest("User already exists".to_string()));
    }

    let role = role_for_invite(
        req.admin_invite_token.as_deref(),
        state.config.auth.admin_invite_token.as_deref(),
    );

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name.trim().to_string(),
            email: req.email,
            password_hash,
            profile_image_url: req.profile_image_url.filter(|url| !url.is_empty()),
            role,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User registered");

    let token = state.issue_token(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully".to_string(),
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            profile_image_url: user.profile_image_url,
            token,
        }),
    ))
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// { "email": "jane@example.com", "password": "secret1" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let req = req.normalized();
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    let token = state.issue_token(user.id)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        message: "Logged in successfully".to_string(),
        token,
        user: user.into(),
    }))
}

/// Current user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserProfile>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// `PUT /api/auth/profile`
pub async fn update_own_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UpdateProfileResponse>> {
    apply_profile_update(&state, &auth, auth.user_id, req).await
}

/// `PUT /api/auth/profile/:id`
///
/// # Errors
///
/// - `403 Forbidden`: Members editing someone else
/// - `404 Not Found`: No such user
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UpdateProfileResponse>> {
    require_self_or_admin(&auth, user_id)?;
    apply_profile_update(&state, &auth, user_id, req).await
}

async fn apply_profile_update(
    state: &AppState,
    auth: &AuthContext,
    user_id: Uuid,
    req: UpdateProfileRequest,
) -> ApiResult<Json<UpdateProfileResponse>> {
    let req = req.normalized();
    req.validate()?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if let Some(email) = req.email.as_deref() {
        if email != user.email.to_lowercase() {
            if let Some(existing) = User::find_by_email(&state.db, email).await? {
                if existing.id != user.id {
                    return Err(ApiError::BadRequest("Email already in use".to_string()));
                }
            }
        }
    }

    let password_hash = match req.password.as_deref() {
        Some(new_password) => {
            password::validate_password_strength(new_password)
                .map_err(|e| ApiError::invalid_field("password", e))?;
            Some(password::hash_password(new_password)?)
        }
        None => None,
    };

    let changes = UpdateUser {
        name: req.name,
        email: req.email,
        password_hash,
        profile_image_url: req.profile_image_url,
    };

    let updated = if changes.is_empty() {
        user
    } else {
        User::update(&state.db, user.id, changes)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
    };

    tracing::info!(user_id = %updated.id, by = %auth.user_id, "Profile updated");

    let token = if updated.id == auth.user_id {
        Some(state.issue_token(updated.id)?)
    } else {
        None
    };

    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully".to_string(),
        user: ProfileWithToken {
            profile: updated.into(),
            token,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_for_invite() {
        assert_eq!(role_for_invite(None, None), UserRole::Member);
        assert_eq!(role_for_invite(Some("abc"), None), UserRole::Member);
        assert_eq!(role_for_invite(None, Some("abc")), UserRole::Member);
        assert_eq!(role_for_invite(Some("wrong"), Some("abc")), UserRole::Member);
        assert_eq!(role_for_invite(Some("abc"), Some("abc")), UserRole::Admin);
        assert_eq!(role_for_invite(Some(""), Some("")), UserRole::Member);
    }

    #[test]
    fn test_register_request_validation() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name": "Jane", "email": "jane@example.com", "password": "secret1"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
        assert!(req.admin_invite_token.is_none());

        let req: RegisterRequest = serde_json::from_str(r#"{"email": "nope"}"#).unwrap();
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("name"));
        assert!(err.field_errors().contains_key("email"));
    }

    #[test]
    fn test_padded_email_is_trimmed_before_validation() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name": "Jane", "email": " Jane@Example.com ", "password": "secret1"}"#,
        )
        .unwrap();
        let req = req.normalized();
        assert_eq!(req.email, "jane@example.com");
        assert!(req.validate().is_ok());

        let req: LoginRequest =
            serde_json::from_str(r#"{"email": "  jane@example.com\t", "password": "secret1"}"#)
                .unwrap();
        let req = req.normalized();
        assert_eq!(req.email, "jane@example.com");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_long_profile_image_url_is_rejected() {
        let url = format!("http://x/{}", "a".repeat(1100));

        let req = RegisterRequest {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password: "secret1".to_string(),
            profile_image_url: Some(url.clone()),
            admin_invite_token: None,
        };
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("profile_image_url"));
        assert!(matches!(ApiError::from(err), ApiError::ValidationError(_)));

        let req = UpdateProfileRequest {
            profile_image_url: Some(url),
            ..Default::default()
        }
        .normalized();
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("profile_image_url"));
    }

    #[test]
    fn test_register_request_reads_camel_case() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name": "Jane", "email": "jane@example.com", "password": "secret1",
                "profileImageUrl": "http://x/uploads/a.png", "adminInviteToken": "t"}"#,
        )
        .unwrap();

        assert_eq!(req.profile_image_url.as_deref(), Some("http://x/uploads/a.png"));
        assert_eq!(req.admin_invite_token.as_deref(), Some("t"));
    }

    #[test]
    fn test_update_request_ignores_empty_fields() {
        let req: UpdateProfileRequest = serde_json::from_str(
            r#"{"name": "", "email": "  ", "password": "", "profileImageUrl": "x"}"#,
        )
        .unwrap();
        let req = req.normalized();

        assert!(req.name.is_none());
        assert!(req.email.is_none());
        assert!(req.password.is_none());
        assert_eq!(req.profile_image_url.as_deref(), Some("x"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_lowercases_email() {
        let req = UpdateProfileRequest {
            email: Some(" Jane@Example.COM ".to_string()),
            ..Default::default()
        }
        .normalized();

        assert_eq!(req.email.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn test_profile_with_token_shape() {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            role: UserRole::Member,
            profile_image_url: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let json = serde_json::to_value(ProfileWithToken {
            profile: profile.clone(),
            token: Some("t".to_string()),
        })
        .unwrap();
        assert_eq!(json["token"], "t");
        assert_eq!(json["name"], "Jane");
        assert_eq!(json["role"], "Member");

        let json = serde_json::to_value(ProfileWithToken {
            profile,
            token: None,
        })
        .unwrap();
        assert!(json.get("token").is_none());
    }
}
