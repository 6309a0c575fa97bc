//! Registration and login.
//!
//! Passwords are hashed through the [`PasswordHasher`] port before the user
//! row is written, and verified against the stored hash on login. Unknown
//! login ids and wrong passwords produce the same error.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountService, PasswordHasher, PasswordHasherError, UserPersistenceError, UserRepository,
};
use crate::domain::{Error, LoginCredentials, LoginId, NewUser, Registration, Role, User, UserId};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account service implementing [`AccountService`].
#[derive(Clone)]
pub struct AccountsService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> AccountsService<U, H> {
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateLoginId { login_id } => {
            Error::conflict(format!("login id {login_id} is already taken"))
        }
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

#[async_trait]
impl<U, H> AccountService for AccountsService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn login_id_available(&self, login_id: &LoginId) -> Result<bool, Error> {
        let taken = self
            .users
            .login_id_exists(login_id)
            .await
            .map_err(map_user_error)?;
        Ok(!taken)
    }

    async fn register(&self, registration: Registration) -> Result<User, Error> {
        if !self.login_id_available(registration.login_id()).await? {
            return Err(Error::conflict(format!(
                "login id {} is already taken",
                registration.login_id()
            )));
        }

        let password_hash = self
            .hasher
            .hash(registration.password())
            .map_err(map_hasher_error)?;
        let new_user = NewUser {
            login_id: registration.login_id().clone(),
            password_hash,
            contact: registration.contact().clone(),
            role: Role::User,
        };
        let user = self.users.insert(&new_user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, login_id = %user.login_id, "registered user");
        Ok(user)
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Some(stored) = self
            .users
            .find_credentials(credentials.login_id())
            .await
            .map_err(map_user_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(|err| {
                warn!(user_id = %stored.user_id, error = %err, "stored hash rejected");
                map_hasher_error(err)
            })?;
        if matches {
            Ok(stored.user_id)
        } else {
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockPasswordHasher, MockUserRepository, StoredCredentials};
    use crate::domain::{ErrorCode, PasswordHash};
    use chrono::{DateTime, Utc};
    use mockall::predicate::eq;
    use rstest::rstest;

    fn service(
        users: MockUserRepository,
        hasher: MockPasswordHasher,
    ) -> AccountsService<MockUserRepository, MockPasswordHasher> {
        AccountsService::new(Arc::new(users), Arc::new(hasher))
    }

    fn registration() -> Registration {
        Registration::try_from_parts("newbie", "s3cret!", "New Bie", "new@example.com", "010-9")
            .expect("valid registration")
    }

    fn stored_user(new_user: &NewUser) -> User {
        User {
            id: UserId::new(42),
            login_id: new_user.login_id.clone(),
            name: new_user.contact.name().to_owned(),
            email: new_user.contact.email().to_owned(),
            phone: new_user.contact.phone().to_owned(),
            role: new_user.role,
            reputation: 0,
            points: 0,
            image: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn register_hashes_before_insert() {
        let mut users = MockUserRepository::new();
        users.expect_login_id_exists().return_once(|_| Ok(false));
        users
            .expect_insert()
            .withf(|user| user.password_hash.as_str() == "argon2:s3cret!" && user.role == Role::User)
            .times(1)
            .returning(|user| Ok(stored_user(user)));
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .with(eq("s3cret!"))
            .return_once(|pw| Ok(PasswordHash::new(format!("argon2:{pw}"))));

        let user = service(users, hasher)
            .register(registration())
            .await
            .expect("registered");
        assert_eq!(user.login_id.as_ref(), "newbie");
    }

    #[rstest]
    #[tokio::test]
    async fn register_rejects_taken_login_id() {
        let mut users = MockUserRepository::new();
        users.expect_login_id_exists().return_once(|_| Ok(true));
        users.expect_insert().never();

        let err = service(users, MockPasswordHasher::new())
            .register(registration())
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some(false), false)]
    #[case(Some(true), true)]
    #[tokio::test]
    async fn authenticate_outcomes(#[case] verifies: Option<bool>, #[case] succeeds: bool) {
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().return_once(move |_| {
            Ok(verifies.map(|_| StoredCredentials {
                user_id: UserId::new(7),
                password_hash: PasswordHash::new("$argon2id$stub"),
            }))
        });
        let mut hasher = MockPasswordHasher::new();
        if let Some(result) = verifies {
            hasher.expect_verify().return_once(move |_, _| Ok(result));
        }
        let credentials = LoginCredentials::try_from_parts("admin", "pw").expect("valid");

        let result = service(users, hasher).authenticate(&credentials).await;
        match (succeeds, result) {
            (true, Ok(id)) => assert_eq!(id, UserId::new(7)),
            (false, Err(err)) => {
                assert_eq!(err.code(), ErrorCode::Unauthorized);
                assert_eq!(err.message(), "invalid credentials");
            }
            (expected, other) => panic!("expected success={expected}, got {other:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn connection_failures_are_unavailable() {
        let mut users = MockUserRepository::new();
        users
            .expect_login_id_exists()
            .return_once(|_| Err(UserPersistenceError::connection("refused")));
        let login = LoginId::new("anyone").expect("valid");

        let err = service(users, MockPasswordHasher::new())
            .login_id_available(&login)
            .await
            .expect_err("offline");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
