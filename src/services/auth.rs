//! Login and logout for admins, super-admins and voters

use crate::error::Result;
use crate::http::{ApiClient, RequestOptions};
use crate::models::{id_to_string, AdminLoginResponse, PemilihLoginResponse};
use crate::session::{Role, Session, VoterIdentity};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Display name stored when the backend does not return one
const DEFAULT_VOTER_NAME: &str = "Pemilih";

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Logs in an admin and stores the returned token
    pub async fn login_admin(&self, username: &str, password: &str) -> Result<AdminLoginResponse> {
        self.staff_login("/auth/admin/login", Role::Admin, username, password)
            .await
    }

    /// Logs in a super-admin and stores the returned token
    pub async fn login_super_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminLoginResponse> {
        self.staff_login("/auth/super-admin/login", Role::SuperAdmin, username, password)
            .await
    }

    async fn staff_login(
        &self,
        path: &str,
        default_role: Role,
        username: &str,
        password: &str,
    ) -> Result<AdminLoginResponse> {
        let response: AdminLoginResponse = self
            .client
            .post(path, json!({ "username": username, "password": password }))
            .await?;

        if let Some(token) = response.token.as_deref().filter(|t| !t.is_empty()) {
            let role = match response.role.as_deref() {
                Some(raw) => raw.parse().unwrap_or_else(|_| {
                    warn!("Unknown role '{raw}' in login response, using '{default_role}'");
                    default_role
                }),
                None => default_role,
            };
            let user = response.user.clone().unwrap_or_else(|| json!({}));
            self.client
                .session()
                .set_session(&Session::new(token, role).with_user_data(user));
            info!("Logged in as {role} '{username}'");
        } else {
            warn!("Login response for '{username}' carried no token");
        }

        Ok(response)
    }

    /// Logs in a voter with their NIM and one-time token
    pub async fn login_pemilih(&self, nim: &str, token: &str) -> Result<PemilihLoginResponse> {
        let response: PemilihLoginResponse = self
            .client
            .post("/auth/pemilih/login", json!({ "nim": nim, "token": token }))
            .await?;

        if let Some(credential) = response.token.as_deref().filter(|t| !t.is_empty()) {
            let profile = response.pemilih.as_ref();
            let id = profile
                .and_then(|p| p.id.as_ref())
                .and_then(id_to_string)
                .or_else(|| response.voter_id.as_ref().and_then(id_to_string));
            let name = profile
                .and_then(|p| p.nama.clone())
                .or_else(|| response.voter_name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_VOTER_NAME.to_string());

            self.client.session().set_session(
                &Session::new(credential, Role::Pemilih).with_voter(VoterIdentity {
                    id,
                    nim: nim.to_string(),
                    name: name.clone(),
                }),
            );
            info!("Logged in as pemilih {nim} ({name})");
        } else {
            warn!("Login response for pemilih {nim} carried no token");
        }

        Ok(response)
    }

    /// Notifies the server (best effort) and always clears the local session
    pub async fn logout(&self) {
        if let Err(e) = self
            .client
            .request::<Value>("/auth/logout", RequestOptions::post())
            .await
        {
            warn!("Logout error: {e}");
        }
        self.client.session().clear();
        info!("Session cleared");
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.session().is_authenticated()
    }

    pub fn user_role(&self) -> Option<Role> {
        self.client.session().role()
    }
}
