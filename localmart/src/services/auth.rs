use crate::client::{ApiClient, RequestConfig};
use crate::domain::{AccessToken, User, UserRegistration};
use crate::error::RequestError;
use crate::session::SessionEvent;
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token, persist it, and load the user.
    ///
    /// Leaves no token behind when any step fails.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, RequestError> {
        let result = self.sign_in(username, password).await;

        if result.is_err() {
            if let Err(e) = self.client.tokens().clear() {
                warn!("Failed to clear session token after failed login: {}", e);
            }
        }

        result
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<User, RequestError> {
        let token: AccessToken = self
            .client
            .post_form(
                "/auth/login",
                &[("username", username), ("password", password)],
            )
            .await?;

        self.client
            .tokens()
            .set_token(&token.access_token)
            .map_err(|e| RequestError::setup(format!("Failed to store session token: {e}")))?;

        let user = self.current_user().await?;
        info!("Logged in as {}", user.username);
        Ok(user)
    }

    pub async fn signup(&self, registration: &UserRegistration) -> Result<User, RequestError> {
        self.client.post("/auth/signup", registration).await
    }

    pub async fn current_user(&self) -> Result<User, RequestError> {
        self.client
            .get_with("/auth/me", RequestConfig::no_cache())
            .await
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.tokens().token().is_some()
    }

    /// Forget the token and every cached response
    pub fn logout(&self) {
        if let Err(e) = self.client.tokens().clear() {
            warn!("Failed to clear session token on logout: {}", e);
        }
        self.client.cache().clear();
        self.client.emit(SessionEvent::SignedOut);
        info!("Logged out");
    }
}
