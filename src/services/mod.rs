//! Endpoint-shaped service operations over [`ApiClient`]

pub mod admin;
pub mod auth;
pub mod kandidat;
pub mod results;
pub mod vote;

pub use admin::{AdminService, VoterQuery};
pub use auth::AuthService;
pub use kandidat::KandidatService;
pub use results::ResultsService;
pub use vote::VoteService;

use crate::http::ApiClient;

/// All services sharing one client, session and cookie jar
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub kandidat: KandidatService,
    pub vote: VoteService,
    pub results: ResultsService,
    pub admin: AdminService,
}

impl Services {
    pub fn new(client: ApiClient) -> Self {
        Self {
            auth: AuthService::new(client.clone()),
            kandidat: KandidatService::new(client.clone()),
            vote: VoteService::new(client.clone()),
            results: ResultsService::new(client.clone()),
            admin: AdminService::new(client),
        }
    }
}
