use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{LoginRequest, RegisterRequest, UpdateProfileRequest},
    jwt::JwtKeys,
    password,
    validation::{normalize_email, validate_registration, validate_update},
};
use crate::{
    error::{AppError, AppResult, InternalContext},
    users::{
        profile::{NewUser, User},
        repo::UserRepository,
    },
};

/// A freshly minted session.
#[derive(Debug)]
pub struct Issued {
    pub token: String,
    pub user: User,
}

/// Creates the account and signs the caller in.
pub async fn register(
    users: &dyn UserRepository,
    keys: &JwtKeys,
    mut req: RegisterRequest,
) -> AppResult<Issued> {
    req.email = normalize_email(&req.email);
    validate_registration(&req).map_err(AppError::Validation)?;

    let existing = users
        .find_by_email(&req.email)
        .await
        .or_internal("Internal server error during registration")?;
    if existing.is_some() {
        warn!(email = %req.email, "email already registered");
        return Err(AppError::EmailTaken);
    }

    let password_hash = password::hash(req.password)
        .await
        .or_internal("Internal server error during registration")?;

    // A concurrent registration can still win the race between the lookup
    // and the insert; the store reports that as DuplicateEmail.
    let user = users
        .insert(NewUser {
            email: req.email,
            password_hash,
            profile: req.profile,
        })
        .await?;

    let token = keys
        .sign(&user)
        .or_internal("Internal server error during registration")?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Issued { token, user })
}

pub async fn login(
    users: &dyn UserRepository,
    keys: &JwtKeys,
    req: LoginRequest,
) -> AppResult<Issued> {
    let email = req.email.as_deref().map(normalize_email).unwrap_or_default();
    let password = req.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("Email and password are required".into()));
    }

    let user = users
        .find_by_email(&email)
        .await
        .or_internal("Internal server error during login")?;
    let Some(user) = user else {
        warn!(%email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let ok = password::verify(password, user.password_hash.clone())
        .await
        .or_internal("Internal server error during login")?;
    if !ok {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = keys
        .sign(&user)
        .or_internal("Internal server error during login")?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Issued { token, user })
}

/// The caller's own record; 404 if it vanished after the token was issued.
pub async fn get_profile(users: &dyn UserRepository, user_id: Uuid) -> AppResult<User> {
    users
        .find_by_id(user_id)
        .await
        .or_internal("Internal server error while fetching profile")?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn update_profile(
    users: &dyn UserRepository,
    user_id: Uuid,
    req: UpdateProfileRequest,
) -> AppResult<User> {
    validate_update(&req).map_err(AppError::Validation)?;

    let password_hash = match req.password.clone().filter(|p| !p.is_empty()) {
        Some(p) => Some(
            password::hash(p)
                .await
                .or_internal("Internal server error while updating profile")?,
        ),
        None => None,
    };

    // Applied by the store in one step; `None` fields keep their stored value.
    let updated = users
        .update(user_id, req.into_update(password_hash))
        .await
        .or_internal("Internal server error while updating profile")?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    info!(user_id = %updated.id, "profile updated");
    Ok(updated)
}
