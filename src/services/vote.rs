//! Vote submission and status

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::Envelope;
use serde_json::{json, Value};
use tracing::info;

#[derive(Clone)]
pub struct VoteService {
    client: ApiClient,
}

impl VoteService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Casts the current voter's ballot for `kandidat_id`
    pub async fn vote(&self, kandidat_id: u64) -> Result<Envelope<Value>> {
        let response: Envelope<Value> = self
            .client
            .post("/vote", json!({ "kandidat_id": kandidat_id }))
            .await?;
        info!("Vote submitted for kandidat {kandidat_id}");
        Ok(response)
    }

    /// Whether the current voter has already voted
    pub async fn status(&self) -> Result<Envelope<Value>> {
        self.client.get("/vote/status").await
    }
}
