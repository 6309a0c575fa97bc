//! User listing and search.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::accounts_service::map_user_error;
use crate::domain::ports::{UserListing, UserRepository, UsersQuery};

/// Longest accepted search term, in characters.
pub const SEARCH_QUERY_MAX: usize = 100;

#[derive(Clone)]
pub struct UsersService<U> {
    users: Arc<U>,
}

impl<U> UsersService<U> {
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<U> UsersQuery for UsersService<U>
where
    U: UserRepository,
{
    async fn list_users(&self) -> Result<UserListing, Error> {
        let users = self.users.list_summaries().await.map_err(map_user_error)?;
        Ok(UserListing {
            total: users.len(),
            users,
            search_query: None,
        })
    }

    async fn search_users(&self, query: &str) -> Result<UserListing, Error> {
        let term = query.trim();
        if term.is_empty() {
            return Err(Error::invalid_request("search query must not be empty"));
        }
        if term.chars().count() > SEARCH_QUERY_MAX {
            return Err(Error::invalid_request(format!(
                "search query must be at most {SEARCH_QUERY_MAX} characters"
            )));
        }
        let users = self
            .users
            .search_summaries(term)
            .await
            .map_err(map_user_error)?;
        Ok(UserListing {
            total: users.len(),
            users,
            search_query: Some(term.to_owned()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockUserRepository;
    use crate::domain::{ErrorCode, LoginId, UserSummary};
    use chrono::{DateTime, Utc};
    use mockall::predicate::eq;
    use rstest::rstest;

    fn summary(login: &str) -> UserSummary {
        UserSummary {
            user_id: LoginId::new(login).expect("valid"),
            name: login.to_uppercase(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn list_reports_total() {
        let mut repo = MockUserRepository::new();
        repo.expect_list_summaries()
            .return_once(|| Ok(vec![summary("a"), summary("b")]));

        let listing = UsersService::new(Arc::new(repo))
            .list_users()
            .await
            .expect("listing");
        assert_eq!(listing.total, 2);
        assert!(listing.search_query.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn search_trims_and_echoes_the_term() {
        let mut repo = MockUserRepository::new();
        repo.expect_search_summaries()
            .with(eq("test"))
            .return_once(|_| Ok(vec![summary("testuser1")]));

        let listing = UsersService::new(Arc::new(repo))
            .search_users("  test ")
            .await
            .expect("listing");
        assert_eq!(listing.search_query.as_deref(), Some("test"));
        assert_eq!(listing.total, 1);
    }

    #[rstest]
    #[case("   ".to_owned())]
    #[case("x".repeat(SEARCH_QUERY_MAX + 1))]
    #[tokio::test]
    async fn search_rejects_bad_terms(#[case] query: String) {
        let mut repo = MockUserRepository::new();
        repo.expect_search_summaries().never();

        let err = UsersService::new(Arc::new(repo))
            .search_users(&query)
            .await
            .expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
