use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use super::{api::AuthApi, error::ClientError, token_store::TokenStore};
use crate::auth::dto::{LoginRequest, RegisterRequest, UpdateProfileRequest, UsersResponse};
use crate::users::profile::PublicUser;

/// Dashboard screens the session can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Dashboard,
    Home,
}

impl View {
    pub fn requires_auth(self) -> bool {
        matches!(self, View::Dashboard | View::Home)
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, view: View);
}

/// Token and user, always published together.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: PublicUser,
}

/// Process-wide holder of the signed-in user.
///
/// Observers get the current value on subscribe and every change after it.
/// The persisted token and the published session are updated together: a
/// token is written to the store before the session carrying it is
/// published, and logout clears both.
pub struct SessionHolder {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<Option<Session>>,
}

impl SessionHolder {
    pub fn new(
        api: Arc<dyn AuthApi>,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            api,
            store,
            navigator,
            state,
        }
    }

    /// Restores a persisted session by fetching the profile for the stored
    /// token. Any failure logs the user out.
    pub async fn start(&self) -> Option<PublicUser> {
        let token = self.store.load()?;
        match self.api.profile(&token).await {
            Ok(res) if res.success => {
                self.state.send_replace(Some(Session {
                    token,
                    user: res.user.clone(),
                }));
                info!(user_id = %res.user.id, "session restored");
                Some(res.user)
            }
            Ok(_) => {
                self.logout();
                None
            }
            Err(e) => {
                warn!(error = %e, "stored token rejected");
                self.logout();
                None
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<PublicUser, ClientError> {
        let res = self
            .api
            .login(&LoginRequest {
                email: Some(email.to_string()),
                password: Some(password.to_string()),
            })
            .await?;
        self.establish(res.token, res.user)
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<PublicUser, ClientError> {
        let res = self.api.register(req).await?;
        self.establish(res.token, res.user)
    }

    pub async fn update_profile(
        &self,
        req: &UpdateProfileRequest,
    ) -> Result<PublicUser, ClientError> {
        let token = self.token().ok_or(ClientError::NotAuthenticated)?;
        match self.api.update_profile(&token, req).await {
            Ok(res) => {
                self.state.send_modify(|s| {
                    if let Some(s) = s.as_mut().filter(|s| s.token == token) {
                        s.user = res.user.clone();
                    }
                });
                Ok(res.user)
            }
            Err(e) => Err(self.expire_on_unauthorized(e)),
        }
    }

    pub async fn list_users(&self) -> Result<UsersResponse, ClientError> {
        let token = self.token().ok_or(ClientError::NotAuthenticated)?;
        self.api
            .list_users(&token)
            .await
            .map_err(|e| self.expire_on_unauthorized(e))
    }

    /// Drops the token and the user, then sends the user to the login screen.
    pub fn logout(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = ?e, "failed to clear stored token");
        }
        self.state.send_replace(None);
        self.navigator.navigate(View::Login);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<PublicUser> {
        self.state.borrow().as_ref().map(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().as_ref().map(|s| s.token.clone())
    }

    /// True when a token is persisted, even before its profile has loaded.
    pub fn is_authenticated(&self) -> bool {
        self.store.load().is_some()
    }

    /// Route guard: protected views need a token; otherwise redirect to login.
    pub fn can_activate(&self, view: View) -> bool {
        if view.requires_auth() && !self.is_authenticated() {
            self.navigator.navigate(View::Login);
            return false;
        }
        true
    }

    fn establish(&self, token: String, user: PublicUser) -> Result<PublicUser, ClientError> {
        self.store.save(&token).map_err(ClientError::Storage)?;
        self.state.send_replace(Some(Session {
            token,
            user: user.clone(),
        }));
        info!(user_id = %user.id, "signed in");
        Ok(user)
    }

    fn expire_on_unauthorized(&self, e: ClientError) -> ClientError {
        if e.is_unauthorized() {
            self.logout();
        }
        e
    }
}
