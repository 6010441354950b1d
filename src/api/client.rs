//! Thin JSON-over-HTTP client for the image backend.
//!
//! Every request targets `base_url + path`, carries a JSON content type and,
//! when given, a JSON body. Non-2xx responses become
//! [`HttpError::Status`](super::HttpError::Status) with the mapped message and
//! the parsed body. There is no timeout, retry or cache here; the search
//! controller owns retry policy.

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::errors::{ErrorBody, HttpError};

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8000/api/v1`)
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if the base URL does not parse, and
    /// [`HttpError::Transport`] if the underlying client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| HttpError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = Client::builder()
            .user_agent(concat!("space-explorer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T>(&self, path: &str) -> Result<T, HttpError>
    where
        T: DeserializeOwned + Default,
    {
        self.request(Method::GET, path, &[], None).await
    }

    pub async fn get_with_query<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, HttpError>
    where
        T: DeserializeOwned + Default,
    {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        let body = encode_body(body)?;
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete<T>(&self, path: &str) -> Result<T, HttpError>
    where
        T: DeserializeOwned + Default,
    {
        self.request(Method::DELETE, path, &[], None).await
    }

    /// Send one request and decode the JSON response
    ///
    /// A 204 response yields `T::default()`.
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned + Default,
    {
        let url = self.url_for(path, query)?;
        debug!(%method, %url, "Sending request");

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%method, %url, status = status.as_u16(), "Received response");

        if !status.is_success() {
            let is_json = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.contains(JSON_CONTENT_TYPE));
            let text = response.text().await?;
            let body = if is_json {
                serde_json::from_str(&text).map(ErrorBody::Json).unwrap_or(ErrorBody::Text(text))
            } else {
                ErrorBody::Text(text)
            };
            let err = HttpError::from_response(status.as_u16(), body);
            debug!(%url, error = %err, "Request failed");
            return Err(err);
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(T::default());
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| HttpError::Decode(e.to_string()))
    }

    fn url_for(&self, path: &str, query: &[(&str, String)]) -> Result<Url, HttpError> {
        let full = format!("{}{}", self.base_url, path);
        let mut url = Url::parse(&full).map_err(|e| HttpError::InvalidUrl(format!("{}: {}", full, e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, HttpError> {
    serde_json::to_value(body).map_err(|e| HttpError::Decode(e.to_string()))
}
