use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit,
    config::AppConfig,
    dto::auth::{AuthResponse, Claims, GoogleProfile, LoginRequest, RegisterRequest},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    models::{Role, User},
    response::{ApiResponse, Meta},
    services::user_service::load_user,
    state::AppState,
};

const MIN_NAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 8;

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let RegisterRequest {
        name,
        email,
        password,
        avatar_url,
    } = payload;
    let name = name.trim().to_string();
    let email = email.trim().to_lowercase();

    if name.chars().count() < MIN_NAME_LEN {
        return Err(AppError::bad_request("Name should have at least 3 characters."));
    }
    if !is_valid_email(&email) {
        return Err(AppError::bad_request("Enter a valid email."));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(
            "Password should have at least 8 characters.",
        ));
    }

    let exist = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::bad_request("Duplicate email Entered"));
    }

    let password_hash = hash_password(&password)?;

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        password_hash: Set(Some(password_hash)),
        avatar_public_id: Set(None),
        avatar_url: Set(avatar_url.filter(|url| !url.trim().is_empty())),
        google_id: Set(None),
        role: Set(Role::User.as_str().to_string()),
        default_address: Set(None),
        default_longitude: Set(None),
        default_latitude: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    let token = issue_token(&state.config, &user)?;
    Ok(ApiResponse::success(
        "User created",
        AuthResponse {
            token,
            user: User::from_entity(user, Vec::new()),
        },
        Some(Meta::empty()),
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::bad_request("Please enter email or password."));
    }

    let invalid = || AppError::unauthorized("Invalid email or password");

    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?
        .ok_or_else(invalid)?;

    // Accounts created through Google have no password to check against.
    let stored_hash = user.password_hash.as_deref().ok_or_else(invalid)?;
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(invalid());
    }

    let token = issue_token(&state.config, &user)?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    let user = load_user(state, user.id).await?;
    Ok(ApiResponse::success(
        "Logged in",
        AuthResponse { token, user },
        Some(Meta::empty()),
    ))
}

/// Signs in a user whose identity was verified by Google.
///
/// Looks the account up by Google id first, then links an existing account
/// registered with the same email, and only then creates a new one.
pub async fn sign_in_with_google(
    state: &AppState,
    profile: GoogleProfile,
) -> AppResult<ApiResponse<AuthResponse>> {
    let google_id = profile.google_id.trim().to_string();
    let email = profile.email.trim().to_lowercase();
    if google_id.is_empty() || !is_valid_email(&email) {
        return Err(AppError::bad_request("Authentication failed"));
    }

    let existing = Users::find()
        .filter(UserCol::GoogleId.eq(google_id.as_str()))
        .one(&state.orm)
        .await?;

    let (user, action) = match existing {
        Some(user) => (user, "user_login_google"),
        None => {
            let by_email = Users::find()
                .filter(UserCol::Email.eq(email.as_str()))
                .one(&state.orm)
                .await?;
            match by_email {
                Some(user) => (link_google_id(state, user, &google_id).await?, "user_link_google"),
                None => (create_google_user(state, &profile, google_id, email).await?, "user_register_google"),
            }
        }
    };

    audit::record(
        &state.pool,
        Some(user.id),
        action,
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    let token = issue_token(&state.config, &user)?;
    let user = load_user(state, user.id).await?;
    Ok(ApiResponse::success(
        "Logged in",
        AuthResponse { token, user },
        Some(Meta::empty()),
    ))
}

async fn link_google_id(state: &AppState, user: UserModel, google_id: &str) -> AppResult<UserModel> {
    if let Some(linked) = user.google_id.as_deref() {
        if linked != google_id {
            return Err(AppError::bad_request(
                "Email is already linked to another Google account",
            ));
        }
    }
    let mut active: UserActive = user.into();
    active.google_id = Set(Some(google_id.to_string()));
    Ok(active.update(&state.orm).await?)
}

async fn create_google_user(
    state: &AppState,
    profile: &GoogleProfile,
    google_id: String,
    email: String,
) -> AppResult<UserModel> {
    let name = match profile.name.trim() {
        "" => email.split('@').next().unwrap_or_default().to_string(),
        name => name.to_string(),
    };
    let photo = profile.photo_url.clone().filter(|url| !url.trim().is_empty());
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        password_hash: Set(None),
        avatar_public_id: Set(photo.as_ref().map(|_| "default".to_string())),
        avatar_url: Set(photo),
        google_id: Set(Some(google_id)),
        role: Set(Role::User.as_str().to_string()),
        default_address: Set(None),
        default_longitude: Set(None),
        default_latitude: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(user)
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn issue_token(config: &AppConfig, user: &UserModel) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_expire_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.clone(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}
