//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, `MigrationStore`, `PasswordHasher`) are
//! implemented by outbound adapters. Driving ports (`SchemaMigrations`,
//! `TestDataCommand`, `AccountService`, `UsersQuery`, `QuestionBoard`,
//! `AnswerBoard`, `CouponWallet`) are implemented by domain services and
//! called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod answer_board;
mod answer_repository;
mod coupon_repository;
mod coupon_wallet;
mod migration_store;
mod password_hasher;
mod question_board;
mod question_repository;
mod schema_migrations;
mod test_data_command;
mod test_data_repository;
mod user_repository;
mod users_query;

pub use account_service::AccountService;
#[cfg(test)]
pub use account_service::MockAccountService;
pub use answer_board::AnswerBoard;
#[cfg(test)]
pub use answer_board::MockAnswerBoard;
#[cfg(test)]
pub use answer_repository::MockAnswerRepository;
pub use answer_repository::{AnswerRepository, AnswerRepositoryError};
#[cfg(test)]
pub use coupon_repository::MockCouponRepository;
pub use coupon_repository::{CouponRepository, CouponRepositoryError};
pub use coupon_wallet::CouponWallet;
#[cfg(test)]
pub use coupon_wallet::MockCouponWallet;
#[cfg(test)]
pub use migration_store::MockMigrationStore;
pub use migration_store::{ApplyOutcome, MigrationStore, MigrationStoreError, RevertOutcome};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use question_board::MockQuestionBoard;
pub use question_board::QuestionBoard;
#[cfg(test)]
pub use question_repository::MockQuestionRepository;
pub use question_repository::{QuestionRepository, QuestionRepositoryError};
#[cfg(test)]
pub use schema_migrations::MockSchemaMigrations;
pub use schema_migrations::SchemaMigrations;
#[cfg(test)]
pub use test_data_command::MockTestDataCommand;
pub use test_data_command::TestDataCommand;
#[cfg(test)]
pub use test_data_repository::MockTestDataRepository;
pub use test_data_repository::{
    SeedAnswer, SeedQuestion, TestDataRepository, TestDataRepositoryError,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::{UserListing, UsersQuery};
