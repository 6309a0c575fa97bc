//! Driving port for user-facing listing and search.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, UserSummary};

/// Users with their count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListing {
    pub users: Vec<UserSummary>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// All users, newest first.
    async fn list_users(&self) -> Result<UserListing, Error>;

    /// Users matching `query` by login id or name.
    async fn search_users(&self, query: &str) -> Result<UserListing, Error>;
}
