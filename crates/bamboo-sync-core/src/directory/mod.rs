//! Identity resolution: Webrecorder usernames to Bamboo agency ids.
//!
//! The directory's user search matches substrings, so results are filtered
//! locally for an exact username. A user that cannot be resolved is a skip
//! signal for its collections, not an error.

mod keycloak;

pub use keycloak::KeycloakDirectory;

use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// User attribute holding the Bamboo agency id.
pub const ORGANIZATION_ATTRIBUTE: &str = "agencyId";

/// A user as returned by a directory search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryUser {
    pub username: String,
    #[serde(default)]
    pub attributes: HashMap<String, Vec<String>>,
}

impl DirectoryUser {
    /// First value of the agency attribute, if set.
    pub fn organization_id(&self) -> Option<&str> {
        self.attributes
            .get(ORGANIZATION_ATTRIBUTE)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// Read-only user directory.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Search users whose username contains `query`.
    async fn search_users(&self, query: &str) -> Result<Vec<DirectoryUser>>;
}

/// Pick the exact username match from a substring search result.
///
/// When several users match exactly, the first in response order wins.
pub fn select_exact_match<'a>(
    users: &'a [DirectoryUser],
    username: &str,
) -> Option<&'a DirectoryUser> {
    let mut matches = users.iter().filter(|user| user.username == username);
    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        warn!(
            "Directory has {} users named '{}'; using the first",
            extra + 1,
            username
        );
    }
    Some(first)
}

/// Resolve `username` to an organization id.
///
/// Returns `Ok(None)` when the user does not exist or has no agency
/// attribute. Directory failures are returned as errors.
pub async fn resolve_organization(
    directory: &dyn Directory,
    username: &str,
) -> Result<Option<String>> {
    if username.is_empty() {
        return Ok(None);
    }

    let users = directory.search_users(username).await?;
    debug!(
        "Directory search for '{}' returned {} users",
        username,
        users.len()
    );

    Ok(select_exact_match(&users, username)
        .and_then(DirectoryUser::organization_id)
        .map(str::to_string))
}
