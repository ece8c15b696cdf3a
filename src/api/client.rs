//! Cloud controller HTTP client

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::api::types::{ErrorBody, PaginatedResources, Resource};
use crate::core::{ConfigReader, FoundryError, FoundryResult};

/// Thin gateway over the cloud controller REST API
pub struct CloudControllerClient {
    /// HTTP client
    client: reqwest::Client,
    /// Session configuration
    config: Arc<dyn ConfigReader>,
}

impl CloudControllerClient {
    /// Create a new client for the session in `config`
    pub fn new(config: Arc<dyn ConfigReader>) -> FoundryResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("foundry/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout())
            .danger_accept_invalid_certs(config.skip_ssl_validation())
            .gzip(true)
            .build()?;

        Ok(Self { client, config })
    }

    /// Resolve `path` (optionally carrying its own query) under the API endpoint.
    ///
    /// Paths keep any prefix the endpoint carries (`https://host/cf`); paths
    /// handed back by the server that already start with it are used as is.
    fn url(&self, path: &str, query: &[(&str, &str)]) -> FoundryResult<Url> {
        let endpoint = self.config.api_endpoint().ok_or(FoundryError::NoApiEndpoint)?;
        let base = Url::parse(endpoint)
            .map_err(|e| FoundryError::config(format!("Invalid API endpoint {}: {}", endpoint, e)))?;

        let prefix = base.path().trim_end_matches('/');
        let full_path = if prefix.is_empty() || path.starts_with(&format!("{}/", prefix)) {
            path.to_string()
        } else {
            format!("{}{}", prefix, path)
        };

        let mut url = base
            .join(&full_path)
            .map_err(|e| FoundryError::config(format!("Invalid API path {}: {}", path, e)))?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    /// Build an authenticated request
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!("{} {}", method, url);

        let mut builder = self.client.request(method, url);
        if let Some(token) = self.config.access_token() {
            builder = builder.header(reqwest::header::AUTHORIZATION, authorization_header(token));
        }
        builder
    }

    /// Fetch every resource of a listing, following `next_url`
    pub async fn list_resources<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> FoundryResult<Vec<Resource<T>>> {
        let mut resources = Vec::new();
        let mut url = self.url(path, query)?;

        loop {
            let response = self.send(self.request(Method::GET, url)).await?;
            let page: PaginatedResources<T> = response.json().await?;

            resources.extend(page.resources);

            match page.next_url {
                Some(next) if !next.is_empty() => url = self.url(&next, &[])?,
                _ => break,
            }
        }

        Ok(resources)
    }

    /// PUT a JSON body and decode the returned resource
    pub async fn update_resource<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> FoundryResult<Resource<T>> {
        let url = self.url(path, &[])?;
        let response = self.send(self.request(Method::PUT, url).json(body)).await?;

        Ok(response.json().await?)
    }

    /// PUT without a body
    pub async fn put(&self, path: &str) -> FoundryResult<()> {
        let url = self.url(path, &[])?;
        self.send(self.request(Method::PUT, url)).await?;
        Ok(())
    }

    /// DELETE a resource
    pub async fn delete(&self, path: &str) -> FoundryResult<()> {
        let url = self.url(path, &[])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    /// PUT a multipart form
    pub async fn upload(&self, path: &str, form: reqwest::multipart::Form) -> FoundryResult<()> {
        let url = self.url(path, &[])?;
        self.send(self.request(Method::PUT, url).multipart(form)).await?;
        Ok(())
    }

    /// Download an arbitrary URL without platform credentials
    pub async fn download(&self, url: &str) -> FoundryResult<Vec<u8>> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FoundryError::remote(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Send a request and turn non-success statuses into errors
    async fn send(&self, builder: RequestBuilder) -> FoundryResult<Response> {
        let response = builder.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        tracing::debug!("request failed with {}: {}", status, text);

        Err(error_from_body(status.as_u16(), &text))
    }
}

/// Format the access token as an `Authorization` header value
fn authorization_header(token: &str) -> String {
    if token.to_lowercase().starts_with("bearer ") {
        token.to_string()
    } else {
        format!("bearer {}", token)
    }
}

/// Map a failed response body to an error
fn error_from_body(status: u16, text: &str) -> FoundryError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) if !body.description.is_empty() => FoundryError::Http {
            status,
            code: if body.error_code.is_empty() {
                body.code.to_string()
            } else {
                body.error_code
            },
            description: body.description,
        },
        _ => FoundryError::Http {
            status,
            code: String::new(),
            description: text.trim().to_string(),
        },
    }
}
