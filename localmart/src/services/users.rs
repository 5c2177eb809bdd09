use crate::client::ApiClient;
use crate::domain::{MessageResponse, PasswordUpdate, User, UserUpdate};
use crate::error::RequestError;
use crate::session::SessionEvent;
use serde::de::IgnoredAny;
use tracing::warn;

/// Profile maintenance for the signed-in user
#[derive(Clone, Debug)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn update_profile(&self, update: &UserUpdate) -> Result<User, RequestError> {
        self.client.put("/users/me", update).await
    }

    pub async fn change_password(&self, passwords: &PasswordUpdate) -> Result<MessageResponse, RequestError> {
        self.client.put("/users/me/password", passwords).await
    }

    /// Delete the account and drop the now useless session.
    ///
    /// Any 2xx body is accepted; the backend answers with a confirmation message.
    pub async fn delete_account(&self) -> Result<(), RequestError> {
        let _: IgnoredAny = self.client.delete("/users/me").await?;

        if let Err(e) = self.client.tokens().clear() {
            warn!("Failed to clear session token after account deletion: {}", e);
        }
        self.client.cache().clear();
        self.client.emit(SessionEvent::SignedOut);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;
    use crate::testing::MockTransport;
    use crate::transport::{HttpResponse, RequestBody};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use storage_engine::MemoryCache;

    fn service(transport: &Arc<MockTransport>) -> UserService {
        UserService::new(ApiClient::new(
            "http://shop.test",
            transport.clone(),
            Arc::new(MemoryCache::<Value>::new()),
            Arc::new(MemoryTokenStore::with_token("tok")),
        ))
    }

    #[tokio::test]
    async fn test_update_profile_sends_only_set_fields() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(
            200,
            json!({
                "id": 2,
                "email": "ana@example.test",
                "username": "ana",
                "role": "customer",
                "phone": "555-0100",
                "created_at": "2024-05-01T10:00:00"
            }),
        );
        let users = service(&transport);

        let update = UserUpdate {
            phone: Some("555-0100".to_string()),
            ..UserUpdate::default()
        };
        let user = users.update_profile(&update).await.unwrap();

        assert_eq!(user.phone.as_deref(), Some("555-0100"));
        assert_eq!(
            transport.requests()[0].body,
            RequestBody::Json(json!({"phone": "555-0100"}))
        );
    }

    #[tokio::test]
    async fn test_change_password() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"message": "Password updated successfully"}));
        let users = service(&transport);

        let response = users
            .change_password(&PasswordUpdate {
                current_password: "old".to_string(),
                new_password: "new".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.message, "Password updated successfully");
        assert_eq!(transport.requests()[0].url, "http://shop.test/users/me/password");
    }

    #[tokio::test]
    async fn test_delete_account_with_confirmation_body() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(200, json!({"message": "Account deleted successfully"}));
        let users = service(&transport);
        users.client.cache().set("/orders", json!([]), None);
        let mut events = users.client.subscribe_session();

        users.delete_account().await.unwrap();

        assert!(users.client.tokens().token().is_none());
        assert!(users.client.cache().is_empty());
        assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedOut);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_session() {
        let transport = Arc::new(MockTransport::new());
        transport.push_json(403, json!({"detail": "Not allowed"}));
        let users = service(&transport);

        assert_eq!(users.delete_account().await.unwrap_err().status, Some(403));
        assert_eq!(users.client.tokens().token().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_delete_account_signs_out() {
        let transport = Arc::new(MockTransport::new());
        transport.push(Ok(HttpResponse::new(204, "")));
        let users = service(&transport);
        users.client.cache().set("/shops", json!([]), None);
        let mut events = users.client.subscribe_session();

        users.delete_account().await.unwrap();

        assert!(users.client.tokens().token().is_none());
        assert!(users.client.cache().is_empty());
        assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedOut);
    }
}
