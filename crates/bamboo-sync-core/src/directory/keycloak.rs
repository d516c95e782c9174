//! Keycloak admin API implementation of [`Directory`].
//!
//! The service account needs the `realm-management` roles `query-users`
//! and `view-users`.

use super::{Directory, DirectoryUser};
use crate::network::{join_url, HttpClient};
use crate::Result;
use async_trait::async_trait;

/// User directory backed by `GET {admin_url}/users?search=`.
pub struct KeycloakDirectory {
    http: HttpClient,
    admin_url: String,
}

impl KeycloakDirectory {
    /// `admin_url` is the realm admin base, e.g.
    /// `https://sso/auth/admin/realms/pandas`.
    pub fn new(http: HttpClient, admin_url: impl Into<String>) -> Self {
        Self {
            http: http.for_service("keycloak"),
            admin_url: admin_url.into(),
        }
    }

    fn users_url(&self) -> String {
        join_url(&self.admin_url, "users")
    }
}

#[async_trait]
impl Directory for KeycloakDirectory {
    async fn search_users(&self, query: &str) -> Result<Vec<DirectoryUser>> {
        self.http
            .get_json(&self.users_url(), &[("search", query)])
            .await
    }
}
