//! In-process doubles for client tests: the real auth services behind the
//! [`AuthApi`] trait, without a socket.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    api::AuthApi,
    error::ClientError,
    session::{Navigator, View},
};
use crate::auth::{
    dto::{
        AuthResponse, LoginRequest, ProfileResponse, RegisterRequest, UpdateProfileRequest,
        UsersResponse,
    },
    services,
};
use crate::error::AppError;
use crate::state::AppState;
use crate::users::profile::{FarmerProfile, PesticideUsage};

pub struct InProcessApi {
    state: AppState,
}

impl InProcessApi {
    pub fn new() -> Self {
        Self {
            state: AppState::fake(),
        }
    }

    fn authorize(&self, token: &str) -> Result<uuid::Uuid, ClientError> {
        self.state
            .jwt
            .verify(token)
            .map(|c| c.sub)
            .map_err(|_| ClientError::Server {
                status: 401,
                message: "Invalid or expired token".into(),
                errors: vec![],
            })
    }
}

fn to_client(e: AppError) -> ClientError {
    let status = e.status().as_u16();
    let errors = match &e {
        AppError::Validation(errors) => errors.clone(),
        _ => vec![],
    };
    ClientError::Server {
        status,
        message: e.to_string(),
        errors,
    }
}

#[async_trait]
impl AuthApi for InProcessApi {
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let issued = services::register(self.state.users.as_ref(), &self.state.jwt, req.clone())
            .await
            .map_err(to_client)?;
        Ok(AuthResponse {
            success: true,
            message: "User registered successfully".into(),
            token: issued.token,
            user: issued.user.into(),
        })
    }

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let issued = services::login(self.state.users.as_ref(), &self.state.jwt, req.clone())
            .await
            .map_err(to_client)?;
        Ok(AuthResponse {
            success: true,
            message: "Login successful".into(),
            token: issued.token,
            user: issued.user.into(),
        })
    }

    async fn profile(&self, token: &str) -> Result<ProfileResponse, ClientError> {
        let id = self.authorize(token)?;
        let user = services::get_profile(self.state.users.as_ref(), id)
            .await
            .map_err(to_client)?;
        Ok(ProfileResponse {
            success: true,
            message: "Profile fetched successfully".into(),
            user: user.into(),
        })
    }

    async fn update_profile(
        &self,
        token: &str,
        req: &UpdateProfileRequest,
    ) -> Result<ProfileResponse, ClientError> {
        let id = self.authorize(token)?;
        let user = services::update_profile(self.state.users.as_ref(), id, req.clone())
            .await
            .map_err(to_client)?;
        Ok(ProfileResponse {
            success: true,
            message: "Profile updated successfully".into(),
            user: user.into(),
        })
    }

    async fn list_users(&self, token: &str) -> Result<UsersResponse, ClientError> {
        self.authorize(token)?;
        let users: Vec<_> = self
            .state
            .users
            .list_newest_first()
            .await
            .map_err(|e| ClientError::Unexpected(e.to_string()))?
            .into_iter()
            .map(Into::into)
            .collect();
        Ok(UsersResponse {
            success: true,
            message: "Users fetched successfully".into(),
            count: users.len(),
            users,
        })
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<View>>,
}

impl RecordingNavigator {
    pub fn visited(&self) -> Vec<View> {
        self.visited.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, view: View) {
        self.visited.lock().unwrap().push(view);
    }
}

/// The registration used throughout the client tests.
pub fn scenario_request() -> RegisterRequest {
    RegisterRequest {
        email: "a@x.com".into(),
        password: "p".into(),
        profile: FarmerProfile {
            full_name: "A".into(),
            phone: "1".into(),
            language: Some("en".into()),
            farm_name: Some("F".into()),
            farm_location: Some("L".into()),
            farm_size: Some(5.0),
            primary_crops: vec!["Wheat".into()],
            sprayer_type: Some("Manual".into()),
            iot_devices: vec!["1".into()],
            machinery: vec!["Tractor".into()],
            pesticides: vec![PesticideUsage {
                name: "X".into(),
                frequency: String::new(),
            }],
            fertilizer_preference: Some("Organic".into()),
            monthly_expenditure: Some(100.0),
            ..Default::default()
        },
    }
}
