use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::errors::PriceError;
use crate::domain::order::ResolvedPrice;
use crate::domain::ports::PriceResolver;

/// Configuration for the remote product catalog.
#[derive(Debug, Clone)]
pub struct PriceClientConfig {
    /// Catalog base URL, e.g. `"http://localhost:8081"`.
    pub base_url: String,
    /// Per-request timeout; an elapsed timeout counts as an unavailable
    /// upstream.
    pub timeout: Duration,
}

/// HTTP client for the catalog's batched price endpoint.
///
/// Stateless; one shared instance (and its connection pool) serves all
/// requests concurrently.
#[derive(Debug, Clone)]
pub struct HttpPriceResolver {
    base_url: String,
    http: Client,
}

// Network failures without an HTTP status (connect refused, timeout)
// surface with this status.
const NO_STATUS: u16 = 500;

impl HttpPriceResolver {
    pub fn new(config: PriceClientConfig) -> Self {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to build catalog HTTP client");
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceDto {
    product_id: i32,
    name: String,
    price: f64,
}

#[async_trait]
impl PriceResolver for HttpPriceResolver {
    async fn resolve_prices(
        &self,
        ids: &BTreeSet<i32>,
    ) -> Result<HashMap<i32, ResolvedPrice>, PriceError> {
        debug_assert!(!ids.is_empty(), "callers must skip empty batches");

        let url = format!("{}/products/prices", self.base_url);
        let id_list: Vec<i32> = ids.iter().copied().collect();

        let response = self
            .http
            .post(&url)
            .json(&id_list)
            .send()
            .await
            .map_err(|e| PriceError::UpstreamUnavailable {
                status: e.status().map_or(NO_STATUS, |s| s.as_u16()),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PriceError::UpstreamUnavailable {
                status: status.as_u16(),
                message,
            });
        }

        let body: Vec<PriceDto> = response
            .json()
            .await
            .map_err(|e| PriceError::MalformedResponse(e.to_string()))?;

        if body.len() != ids.len() {
            return Err(PriceError::UnknownProduct(format!(
                "requested {} ids, catalog returned {}",
                ids.len(),
                body.len()
            )));
        }

        let mut resolved = HashMap::with_capacity(body.len());
        for dto in body {
            let unit_price = BigDecimal::try_from(dto.price).map_err(|e| {
                PriceError::MalformedResponse(format!(
                    "price for product {} is not a finite number: {}",
                    dto.product_id, e
                ))
            })?;
            resolved.insert(
                dto.product_id,
                ResolvedPrice {
                    product_id: dto.product_id,
                    name: dto.name,
                    unit_price,
                },
            );
        }

        let missing: Vec<i32> = ids
            .iter()
            .copied()
            .filter(|id| !resolved.contains_key(id))
            .collect();
        if !missing.is_empty() {
            return Err(PriceError::UnknownProduct(
                missing
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            ));
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use actix_web::{web, App, HttpResponse, HttpServer};
    use serde_json::json;

    use super::*;

    fn free_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .expect("bind failed")
            .local_addr()
            .expect("addr failed")
            .port()
    }

    fn client(base_url: &str) -> HttpPriceResolver {
        HttpPriceResolver::new(PriceClientConfig {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(2),
        })
    }

    fn ids(values: &[i32]) -> BTreeSet<i32> {
        values.iter().copied().collect()
    }

    async fn wait_until_ready(base_url: &str) {
        let probe = Client::new();
        for _ in 0..100 {
            if probe
                .post(format!("{base_url}/products/prices"))
                .json(&Vec::<i32>::new())
                .send()
                .await
                .is_ok()
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("mock catalog did not become ready");
    }

    /// Start a catalog stub answering every request with `responder`'s output.
    async fn spawn_catalog<F>(responder: F) -> String
    where
        F: Fn(Vec<i32>) -> HttpResponse + Clone + Send + 'static,
    {
        let port = free_port();
        let server = HttpServer::new(move || {
            let responder = responder.clone();
            App::new().route(
                "/products/prices",
                web::post().to(move |body: web::Json<Vec<i32>>| {
                    let responder = responder.clone();
                    async move { responder(body.into_inner()) }
                }),
            )
        })
        .bind(("127.0.0.1", port))
        .expect("bind failed")
        .workers(1)
        .run();
        tokio::spawn(server);

        let base_url = format!("http://127.0.0.1:{port}");
        wait_until_ready(&base_url).await;
        base_url
    }

    #[tokio::test]
    async fn resolves_all_requested_ids() {
        let base_url = spawn_catalog(|ids| {
            let body: Vec<_> = ids
                .iter()
                .map(|id| json!({ "productId": id, "name": format!("Product {id}"), "price": 2.5 }))
                .collect();
            HttpResponse::Ok().json(body)
        })
        .await;

        let resolved = client(&base_url)
            .resolve_prices(&ids(&[1, 2, 3]))
            .await
            .expect("resolve failed");

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[&2].name, "Product 2");
        assert_eq!(
            resolved[&2].unit_price,
            BigDecimal::from_str("2.5").expect("valid decimal")
        );
    }

    #[tokio::test]
    async fn non_2xx_is_upstream_unavailable_with_preserved_status() {
        let base_url =
            spawn_catalog(|_| HttpResponse::ServiceUnavailable().body("catalog down")).await;

        let err = client(&base_url)
            .resolve_prices(&ids(&[1]))
            .await
            .unwrap_err();

        match err {
            PriceError::UpstreamUnavailable { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "catalog down");
            }
            other => panic!("expected UpstreamUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undercovered_response_is_unknown_product() {
        // Catalog answers 2xx but only covers one of two requested ids.
        let base_url = spawn_catalog(|_| {
            HttpResponse::Ok().json(json!([
                { "productId": 1, "name": "Keyboard", "price": 10.0 }
            ]))
        })
        .await;

        let err = client(&base_url)
            .resolve_prices(&ids(&[1, 2]))
            .await
            .unwrap_err();

        assert!(matches!(err, PriceError::UnknownProduct(_)));
    }

    #[tokio::test]
    async fn response_with_unrequested_ids_is_unknown_product() {
        let base_url = spawn_catalog(|_| {
            HttpResponse::Ok().json(json!([
                { "productId": 8, "name": "Other", "price": 1.0 }
            ]))
        })
        .await;

        let err = client(&base_url)
            .resolve_prices(&ids(&[1]))
            .await
            .unwrap_err();

        assert!(matches!(err, PriceError::UnknownProduct(_)));
    }

    #[tokio::test]
    async fn invalid_body_is_malformed_response() {
        let base_url =
            spawn_catalog(|_| HttpResponse::Ok().body("not json at all")).await;

        let err = client(&base_url)
            .resolve_prices(&ids(&[1]))
            .await
            .unwrap_err();

        assert!(matches!(err, PriceError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_catalog_is_upstream_unavailable() {
        // Nothing listens on this port.
        let port = free_port();
        let err = client(&format!("http://127.0.0.1:{port}"))
            .resolve_prices(&ids(&[1]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PriceError::UpstreamUnavailable { status: 500, .. }
        ));
    }
}
