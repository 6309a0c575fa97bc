//! Idempotent reference data: six accounts, three questions and two
//! answers, plus the validation report over them.
//!
//! State moves `EMPTY -> USERS_SEEDED -> QUESTIONS_SEEDED`; `clear` returns
//! to `EMPTY`.

mod catalogue;
mod service;

pub use catalogue::{EXPECTED_LOGIN_IDS, REQUIRED_AUTHORS, SEED_ACCOUNTS, SEED_QUESTIONS};
pub use service::{
    DEFAULT_PASSWORD, SeedOutcome, SeedStep, TestDataError, TestDataService, TestUserRequest,
    UserValidationReport,
};
