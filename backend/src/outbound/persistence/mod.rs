//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain's driven ports, backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   types. Ownership checks, validation and reward rules live in the domain.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Atomic writes**: every multi-statement write (question plus reward,
//!   answer plus counter, coupon plus balance, migration plus log record) runs
//!   in one transaction.
//!
//! # Example
//!
//! ```ignore
//! use qna_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/qna")).await?;
//! let repo = DieselUserRepository::new(pool);
//! ```

mod diesel_answer_repository;
mod diesel_coupon_repository;
mod diesel_migration_store;
mod diesel_question_repository;
mod diesel_test_data_repository;
mod diesel_user_repository;
mod error_mapping;
pub mod migration_catalogue;
mod models;
mod pool;
mod schema;

pub use diesel_answer_repository::DieselAnswerRepository;
pub use diesel_coupon_repository::DieselCouponRepository;
pub use diesel_migration_store::DieselMigrationStore;
pub use diesel_question_repository::DieselQuestionRepository;
pub use diesel_test_data_repository::DieselTestDataRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
