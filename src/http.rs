use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::Backend;
use crate::error::{AppError, Result};
use crate::types::{Order, OrderStatus, Page, PageMeta, PageQuery, Product};

/// Client for the POS REST API (`/api/v1`).
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, token: String) -> Result<Self> {
        if token.is_empty() {
            return Err(AppError::Auth("empty API token".to_string()));
        }
        Ok(Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Envelope<T>> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AppError::Api(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Api(e.to_string()))?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppError::Auth(error_message(&text, status)));
        }
        if !status.is_success() {
            return Err(AppError::Api(error_message(&text, status)));
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&text).map_err(|e| AppError::Api(e.to_string()))?;
        if !envelope.success {
            return Err(AppError::Api(envelope.failure_message()));
        }
        Ok(envelope)
    }

    fn page_request(
        &self,
        path: &str,
        query: PageQuery,
        filters: &[(&str, &str)],
    ) -> RequestBuilder {
        self.client
            .get(self.api_url(path))
            .query(&query)
            .query(filters)
    }

    /// GET one page of `path`. `filters` are extra query parameters.
    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: PageQuery,
        filters: &[(&str, &str)],
    ) -> Result<Page<T>> {
        let request = self.page_request(path, query, filters);
        debug!(path, page = query.page, per_page = query.per_page, ?filters, "GET page");

        let envelope: Envelope<Vec<T>> = self.send(request).await?;
        let meta = envelope
            .meta
            .ok_or_else(|| AppError::Api(format!("{}: response has no pagination meta", path)))?;
        Ok(Page {
            items: envelope.data.unwrap_or_default(),
            meta,
        })
    }
}

/// Response wrapper used by every endpoint
#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
    meta: Option<PageMeta>,
    error: Option<String>,
}

impl<T> Envelope<T> {
    fn failure_message(&self) -> String {
        match &self.error {
            Some(detail) if !self.message.is_empty() => format!("{}: {}", self.message, detail),
            Some(detail) => detail.clone(),
            None => self.message.clone(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    error: Option<String>,
}

fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { message, error }) if !message.is_empty() => match error {
            Some(detail) => format!("{} ({}): {}", message, status, detail),
            None => format!("{} ({})", message, status),
        },
        _ if !body.trim().is_empty() => format!("{}: {}", status, body.trim()),
        _ => status.to_string(),
    }
}

#[derive(Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn list_orders(
        &self,
        query: PageQuery,
        status: Option<OrderStatus>,
    ) -> Result<Page<Order>> {
        let filters: Vec<(&str, &str)> = status
            .map(|s| ("status", s.as_api_str()))
            .into_iter()
            .collect();
        self.get_page("/orders", query, &filters).await
    }

    async fn list_products(
        &self,
        query: PageQuery,
        search: Option<&str>,
    ) -> Result<Page<Product>> {
        let filters: Vec<(&str, &str)> = search
            .filter(|s| !s.is_empty())
            .map(|s| ("search", s))
            .into_iter()
            .collect();
        self.get_page("/products", query, &filters).await
    }

    async fn update_order_status(&self, id: &str, status: OrderStatus) -> Result<Order> {
        let request = self
            .client
            .patch(self.api_url(&format!("/orders/{}/status", id)))
            .json(&StatusUpdate {
                status: status.as_api_str(),
            });
        let envelope: Envelope<Order> = self.send(request).await?;
        envelope
            .data
            .ok_or_else(|| AppError::Api("status update returned no order".to_string()))
    }
}
