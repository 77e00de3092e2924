//! Candidate listing

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::{Envelope, Kandidat};

#[derive(Clone)]
pub struct KandidatService {
    client: ApiClient,
}

impl KandidatService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /kandidat`
    pub async fn list(&self) -> Result<Envelope<Vec<Kandidat>>> {
        self.client.get("/kandidat").await
    }
}
