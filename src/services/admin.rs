//! Voter management queries for the admin dashboard

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::{Envelope, Voter};
use url::form_urlencoded;

/// Page size used when the dashboard needs every voter at once
pub const ALL_VOTERS_PAGE_SIZE: u32 = 5000;

/// Search, status filter and pagination for the voter list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterQuery {
    /// Free-text search; omitted from the query when empty
    pub search: String,
    /// Status filter such as `all`, `voted` or `not_voted`; omitted when empty
    pub filter: String,
    pub page: u32,
    pub per_page: u32,
}

impl Default for VoterQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            filter: "all".to_string(),
            page: 1,
            per_page: 50,
        }
    }
}

impl VoterQuery {
    pub fn new(
        search: impl Into<String>,
        filter: impl Into<String>,
        page: u32,
        per_page: u32,
    ) -> Self {
        Self {
            search: search.into(),
            filter: filter.into(),
            page,
            per_page,
        }
    }

    /// Encodes as `search=..&filter=..&page=..&per_page=..`
    pub fn to_query_string(&self) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());
        if !self.search.is_empty() {
            params.append_pair("search", &self.search);
        }
        if !self.filter.is_empty() {
            params.append_pair("filter", &self.filter);
        }
        params.append_pair("page", &self.page.to_string());
        params.append_pair("per_page", &self.per_page.to_string());
        params.finish()
    }
}

#[derive(Clone)]
pub struct AdminService {
    client: ApiClient,
}

impl AdminService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /results/voters` with the given query
    pub async fn voters(&self, query: &VoterQuery) -> Result<Envelope<Vec<Voter>>> {
        let path = format!("/results/voters?{}", query.to_query_string());
        self.client.get(&path).await
    }

    /// Every voter in one page, for dashboard aggregation
    pub async fn all_voters(&self) -> Result<Vec<Voter>> {
        let query = VoterQuery {
            per_page: ALL_VOTERS_PAGE_SIZE,
            ..VoterQuery::default()
        };
        let page = self.voters(&query).await?;
        Ok(page.data.unwrap_or_default())
    }
}
