//! Shared HTTP adapter state.
//!
//! Handlers accept these bundles via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountService, AnswerBoard, CouponWallet, QuestionBoard, SchemaMigrations, TestDataCommand,
    UsersQuery,
};

/// Dependency bundle for the application handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub users: Arc<dyn UsersQuery>,
    pub questions: Arc<dyn QuestionBoard>,
    pub answers: Arc<dyn AnswerBoard>,
    pub coupons: Arc<dyn CouponWallet>,
}

/// Dependency bundle for the migration admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub migrations: Arc<dyn SchemaMigrations>,
    pub test_data: Arc<dyn TestDataCommand>,
}
