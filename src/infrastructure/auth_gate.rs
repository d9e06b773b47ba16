use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::domain::errors::DomainError;
use crate::domain::order::Identity;
use crate::domain::ports::AuthGate;

/// Authorization gate backed by the user service's token introspection
/// endpoint. Token verification internals live entirely on the remote
/// side; this client only relays the verdict.
#[derive(Debug, Clone)]
pub struct HttpAuthGate {
    base_url: String,
    http: Client,
}

impl HttpAuthGate {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build auth HTTP client");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityDto {
    user_id: i32,
    display_name: String,
}

#[async_trait]
impl AuthGate for HttpAuthGate {
    async fn authenticate(&self, token: &str) -> Result<Identity, DomainError> {
        let response = self
            .http
            .get(format!("{}/users/me", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| DomainError::Internal(format!("auth service request failed: {e}")))?;

        match response.status() {
            status if status.is_success() => {
                let dto: IdentityDto = response.json().await.map_err(|e| {
                    DomainError::Internal(format!("auth service response was malformed: {e}"))
                })?;
                Ok(Identity {
                    user_id: dto.user_id,
                    display_name: dto.display_name,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DomainError::Unauthorized),
            status => Err(DomainError::Internal(format!(
                "auth service answered with status {status}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use serde_json::json;

    use super::*;

    fn free_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .expect("bind failed")
            .local_addr()
            .expect("addr failed")
            .port()
    }

    async fn spawn_auth_service() -> String {
        let port = free_port();
        let server = HttpServer::new(|| {
            App::new().route(
                "/users/me",
                web::get().to(|req: HttpRequest| async move {
                    let header = req
                        .headers()
                        .get("Authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default();
                    if header == "Bearer valid-token" {
                        HttpResponse::Ok()
                            .json(json!({ "userId": 7, "displayName": "Test User" }))
                    } else {
                        HttpResponse::Unauthorized().finish()
                    }
                }),
            )
        })
        .bind(("127.0.0.1", port))
        .expect("bind failed")
        .workers(1)
        .run();
        tokio::spawn(server);

        let base_url = format!("http://127.0.0.1:{port}");
        let probe = Client::new();
        for _ in 0..100 {
            if probe.get(format!("{base_url}/users/me")).send().await.is_ok() {
                return base_url;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("mock auth service did not become ready");
    }

    #[tokio::test]
    async fn valid_token_yields_identity() {
        let base_url = spawn_auth_service().await;
        let gate = HttpAuthGate::new(&base_url, Duration::from_secs(2));

        let identity = gate
            .authenticate("valid-token")
            .await
            .expect("authenticate failed");

        assert_eq!(identity.user_id, 7);
        assert_eq!(identity.display_name, "Test User");
    }

    #[tokio::test]
    async fn rejected_token_is_unauthorized() {
        let base_url = spawn_auth_service().await;
        let gate = HttpAuthGate::new(&base_url, Duration::from_secs(2));

        let err = gate.authenticate("wrong-token").await.unwrap_err();

        assert!(matches!(err, DomainError::Unauthorized));
    }
}
