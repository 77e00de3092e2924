//! Results summary (admin only)

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::ResultsSummary;

#[derive(Clone)]
pub struct ResultsService {
    client: ApiClient,
}

impl ResultsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /results/summary`: per-candidate totals and turnout
    pub async fn summary(&self) -> Result<ResultsSummary> {
        self.client.get("/results/summary").await
    }
}
