//! Typed access to the image backend endpoints.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::client::HttpClient;
use super::errors::HttpError;
use crate::models::ImageItem;

/// Image backend as seen by the search controller and the views
///
/// Implemented over HTTP by [`ApiClient`]; tests substitute scripted backends.
pub trait ImageApi: Send + Sync + 'static {
    /// Unfiltered listing for the initial gallery
    fn list_sources(&self) -> impl Future<Output = Result<Vec<ImageItem>, HttpError>> + Send;

    /// Images matching `query`
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<ImageItem>, HttpError>> + Send;
}

/// Optional filters accepted by `GET /sources`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceFilter {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub keywords: Vec<String>,
}

impl SourceFilter {
    pub fn is_empty(&self) -> bool {
        self.from_date.is_none() && self.to_date.is_none() && self.keywords.is_empty()
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(from) = self.from_date {
            pairs.push(("from_date", format!("{}T00:00:00", from)));
        }
        if let Some(to) = self.to_date {
            pairs.push(("to_date", format!("{}T23:59:59", to)));
        }
        if !self.keywords.is_empty() {
            pairs.push(("keywords", self.keywords.join(",")));
        }
        pairs
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
}

/// `GET /ping` payload
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}

/// HTTP implementation of [`ImageApi`]
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        Ok(Self { http: HttpClient::new(base_url)? })
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// `GET /sources` with optional date and keyword filters
    pub async fn list_sources_filtered(&self, filter: &SourceFilter) -> Result<Vec<ImageItem>, HttpError> {
        let pairs = filter.query_pairs();
        self.http.get_with_query("/sources", &pairs).await
    }

    /// `GET /ping`
    pub async fn ping(&self) -> Result<HealthStatus, HttpError> {
        self.http.get("/ping").await
    }
}

impl ImageApi for ApiClient {
    async fn list_sources(&self) -> Result<Vec<ImageItem>, HttpError> {
        self.http.get("/sources").await
    }

    async fn search(&self, query: &str) -> Result<Vec<ImageItem>, HttpError> {
        self.http.post("/search", &SearchRequest { query }).await
    }
}
