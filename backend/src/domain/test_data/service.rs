//! Seeder and validator for the reference data set.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::ports::{
    PasswordHasher, PasswordHasherError, SeedAnswer, SeedQuestion, TestDataCommand,
    TestDataRepository, TestDataRepositoryError,
};
use crate::domain::{
    ContactDetails, Error, LoginId, NewUser, Role, User, UserCounts, UserId,
    UserValidationError,
};

use super::catalogue::{
    EXPECTED_LOGIN_IDS, REQUIRED_AUTHORS, SEED_ACCOUNTS, SEED_QUESTIONS, SeedAccount,
};

/// Password given to users created without one.
pub const DEFAULT_PASSWORD: &str = "defaultPassword123!";
const DEFAULT_PHONE: &str = "010-0000-0000";

/// Errors raised while seeding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TestDataError {
    #[error(transparent)]
    Repository(#[from] TestDataRepositoryError),
    #[error(transparent)]
    Hashing(#[from] PasswordHasherError),
    #[error("invalid user data: {0}")]
    InvalidUser(#[from] UserValidationError),
}

impl From<TestDataError> for Error {
    fn from(value: TestDataError) -> Self {
        match value {
            TestDataError::Repository(TestDataRepositoryError::Connection { message }) => {
                Error::service_unavailable(format!("database unavailable: {message}"))
            }
            TestDataError::Repository(err @ TestDataRepositoryError::DuplicateLoginId { .. }) => {
                Error::conflict(err.to_string())
            }
            err @ TestDataError::InvalidUser(_) => Error::invalid_request(err.to_string()),
            err => Error::internal(err.to_string()),
        }
    }
}

/// What a seeding step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SeedStep {
    Applied,
    AlreadySeeded,
    /// Fewer users than question authors.
    InsufficientUsers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SeedOutcome {
    pub users: SeedStep,
    pub questions: SeedStep,
}

/// Single user to create; missing fields are derived from the login id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUserRequest {
    pub login_id: LoginId,
    pub password: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
}

impl TestUserRequest {
    pub fn new(login_id: LoginId) -> Self {
        Self {
            login_id,
            password: None,
            name: None,
            email: None,
            phone: None,
            role: None,
        }
    }
}

/// Result of checking the reference users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserValidationReport {
    pub total_users: u64,
    pub admin_users: u64,
    pub regular_users: u64,
    pub test_users: Vec<String>,
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl UserValidationReport {
    fn failed(message: impl std::fmt::Display) -> Self {
        Self {
            errors: vec![format!("Validation failed: {message}")],
            ..Self::default()
        }
    }
}

/// Seeder implementing [`TestDataCommand`].
#[derive(Clone)]
pub struct TestDataService<R, H> {
    repo: Arc<R>,
    hasher: Arc<H>,
}

impl<R, H> TestDataService<R, H> {
    pub fn new(repo: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repo, hasher }
    }
}

impl<R, H> TestDataService<R, H>
where
    R: TestDataRepository,
    H: PasswordHasher,
{
    fn account_to_new_user(&self, account: &SeedAccount) -> Result<NewUser, TestDataError> {
        Ok(NewUser {
            login_id: LoginId::new(account.login_id)?,
            password_hash: self.hasher.hash(account.password)?,
            contact: ContactDetails::new(account.name, account.email, account.phone)?,
            role: account.role,
        })
    }

    fn seed_questions(authors: &[UserId]) -> Vec<SeedQuestion> {
        let author = |index: usize| authors[index % authors.len()];
        SEED_QUESTIONS
            .iter()
            .enumerate()
            .map(|(index, question)| SeedQuestion {
                title: question.title.to_owned(),
                description: question.description.to_owned(),
                tags: question.tags.iter().map(|tag| (*tag).to_owned()).collect(),
                views: question.views,
                author: author(index),
                answers: question
                    .answers
                    .iter()
                    .map(|answer| SeedAnswer {
                        content: answer.content.to_owned(),
                        votes: answer.votes,
                        accepted: answer.accepted,
                        author: author(answer.author),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Seed users when the table is empty, then questions when possible.
    pub async fn seed(&self) -> Result<SeedOutcome, TestDataError> {
        let (users, seeded_ids) = if self.repo.user_count().await? > 0 {
            info!("users already exist; seeding questions only if needed");
            (SeedStep::AlreadySeeded, None)
        } else {
            let new_users = SEED_ACCOUNTS
                .iter()
                .map(|account| self.account_to_new_user(account))
                .collect::<Result<Vec<_>, _>>()?;
            let ids = self.repo.insert_users(new_users).await?;
            info!(count = ids.len(), "created reference users");
            (SeedStep::Applied, Some(ids))
        };

        if self.repo.question_count().await? > 0 {
            return Ok(SeedOutcome {
                users,
                questions: SeedStep::AlreadySeeded,
            });
        }

        let mut authors = match seeded_ids {
            Some(ids) => ids,
            None => self.repo.first_users(REQUIRED_AUTHORS as u32).await?,
        };
        authors.truncate(REQUIRED_AUTHORS);
        if authors.len() < REQUIRED_AUTHORS {
            warn!(found = authors.len(), "not enough users to author questions");
            return Ok(SeedOutcome {
                users,
                questions: SeedStep::InsufficientUsers,
            });
        }

        let written = self
            .repo
            .insert_questions(Self::seed_questions(&authors))
            .await?;
        info!(count = written, "created reference questions");
        Ok(SeedOutcome {
            users,
            questions: SeedStep::Applied,
        })
    }

    /// Remove all questions, then all users.
    pub async fn clear(&self) -> Result<(), TestDataError> {
        self.repo.clear().await?;
        info!("test data cleared");
        Ok(())
    }

    /// Persist one user with defaults filled in. The password is always hashed.
    pub async fn create_user(&self, request: TestUserRequest) -> Result<User, TestDataError> {
        let login = request.login_id.as_ref().to_owned();
        let password = request.password.as_deref().unwrap_or(DEFAULT_PASSWORD);
        let contact = ContactDetails::new(
            request.name.unwrap_or_else(|| login.clone()),
            request
                .email
                .unwrap_or_else(|| format!("{login}@example.com")),
            request.phone.unwrap_or_else(|| DEFAULT_PHONE.to_owned()),
        )?;
        let new_user = NewUser {
            password_hash: self.hasher.hash(password)?,
            login_id: request.login_id,
            contact,
            role: request.role.unwrap_or(Role::User),
        };
        let user = self.repo.insert_user(new_user).await?;
        info!(login_id = %user.login_id, "created test user");
        Ok(user)
    }

    pub async fn stats(&self) -> Result<UserCounts, TestDataError> {
        Ok(self.repo.user_counts().await?)
    }

    async fn collect_validation(&self) -> Result<UserValidationReport, TestDataError> {
        let counts = self.repo.user_counts().await?;
        let expected = EXPECTED_LOGIN_IDS
            .iter()
            .map(LoginId::new)
            .collect::<Result<Vec<_>, _>>()?;
        let found = self.repo.existing_login_ids(expected).await?;
        let found: Vec<String> = EXPECTED_LOGIN_IDS
            .iter()
            .filter(|id| found.iter().any(|login| login.as_ref() == **id))
            .map(|id| (*id).to_owned())
            .collect();

        let mut errors = Vec::new();
        if counts.total_users == 0 {
            errors.push("No users found in database".to_owned());
        }
        if counts.admin_users == 0 {
            errors.push("No admin users found".to_owned());
        }
        let missing: Vec<&str> = EXPECTED_LOGIN_IDS
            .iter()
            .copied()
            .filter(|id| !found.iter().any(|login| login == id))
            .collect();
        if !missing.is_empty() {
            errors.push(format!("Missing test users: {}", missing.join(", ")));
        }

        Ok(UserValidationReport {
            total_users: counts.total_users,
            admin_users: counts.admin_users,
            regular_users: counts.regular_users,
            test_users: found,
            is_valid: errors.is_empty(),
            errors,
        })
    }

    /// Validate the reference users; query failures become a failed report.
    pub async fn validate_user_data(&self) -> UserValidationReport {
        match self.collect_validation().await {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "user validation failed");
                UserValidationReport::failed(err)
            }
        }
    }
}

#[async_trait]
impl<R, H> TestDataCommand for TestDataService<R, H>
where
    R: TestDataRepository,
    H: PasswordHasher,
{
    async fn seed(&self) -> Result<SeedOutcome, Error> {
        Ok(TestDataService::seed(self).await?)
    }

    async fn clear(&self) -> Result<(), Error> {
        Ok(TestDataService::clear(self).await?)
    }

    async fn create_user(&self, request: TestUserRequest) -> Result<User, Error> {
        Ok(TestDataService::create_user(self, request).await?)
    }

    async fn stats(&self) -> Result<UserCounts, Error> {
        Ok(TestDataService::stats(self).await?)
    }

    async fn validate_users(&self) -> UserValidationReport {
        self.validate_user_data().await
    }
}
