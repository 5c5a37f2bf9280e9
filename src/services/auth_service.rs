use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    error::{AppError, AppResult},
    models::User,
    repository::{NewUser, RoleRepository, UserRepository},
    response::{ApiResponse, Meta},
    services::role_service::assign_default_role,
    validation::{ValidationErrors, required_text},
};

const TOKEN_TTL_HOURS: i64 = 24;
const MIN_PASSWORD_LEN: usize = 8;

fn validate_registration<'a>(
    errors: &mut ValidationErrors,
    payload: &'a RegisterRequest,
) -> (&'a str, &'a str) {
    let name = payload.name.trim();
    required_text(errors, "name", name, 255, "The name field is required.");

    let email = payload.email.trim();
    if required_text(errors, "email", email, 255, "The email field is required.").is_some() {
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid {
            errors.add("email", "The email must be a valid email address.");
        }
    }

    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("The password must be at least {MIN_PASSWORD_LEN} characters."),
        );
    }
    (name, email)
}

/// Create an account and hand it the default role. A failing role hook is
/// logged and does not undo the registration.
pub async fn register_user<U: UserRepository, R: RoleRepository>(
    users: &U,
    roles: &R,
    default_role: &str,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let mut errors = ValidationErrors::new();
    let (name, email) = validate_registration(&mut errors, &payload);
    if !errors.has("email") && users.email_taken(email).await? {
        errors.add("email", "The email has already been taken.");
    }
    errors.into_result()?;

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let user = users
        .create(&NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await?;

    if let Err(err) = assign_default_role(roles, &user, default_role).await {
        tracing::warn!(user_id = %user.id, error = %err, "default role assignment failed");
    }

    tracing::info!(user_id = %user.id, "user registered");
    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user<U: UserRepository>(
    users: &U,
    jwt_secret: &str,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let account = match users.find_account_by_email(email.trim()).await? {
        Some(a) => a,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&account.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let token = issue_token(account.user.id, jwt_secret)?;
    let resp = LoginResponse {
        token: format!("Bearer {}", token),
    };

    tracing::info!(user_id = %account.user.id, "user logged in");
    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub fn issue_token(user_id: Uuid, secret: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// User id carried by a valid, unexpired token.
pub fn verify_token(token: &str, secret: &str) -> AppResult<Uuid> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)
}
