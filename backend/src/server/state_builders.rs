//! Builders wiring Diesel adapters into the HTTP state bundles.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use qna_backend::domain::migrations::{MigrationService, RegistryError};
use qna_backend::domain::test_data::TestDataService;
use qna_backend::domain::{
    AccountsService, AnswerService, CouponService, QuestionService, UsersService,
};
use qna_backend::inbound::http::state::{AdminState, HttpState};
use qna_backend::outbound::persistence::{
    DbPool, DieselAnswerRepository, DieselCouponRepository, DieselMigrationStore,
    DieselQuestionRepository, DieselTestDataRepository, DieselUserRepository,
    migration_catalogue,
};
use qna_backend::outbound::security::Argon2PasswordHasher;

/// Application services over repositories sharing `pool`.
pub(super) fn build_http_state(pool: &DbPool) -> web::Data<HttpState> {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let questions = Arc::new(DieselQuestionRepository::new(pool.clone()));
    let answers = Arc::new(DieselAnswerRepository::new(pool.clone()));
    let coupons = Arc::new(DieselCouponRepository::new(pool.clone()));
    let hasher = Arc::new(Argon2PasswordHasher::new());

    web::Data::new(HttpState {
        accounts: Arc::new(AccountsService::new(users.clone(), hasher)),
        users: Arc::new(UsersService::new(users)),
        questions: Arc::new(QuestionService::new(questions.clone(), answers.clone())),
        answers: Arc::new(AnswerService::new(answers, questions)),
        coupons: Arc::new(CouponService::new(coupons, Arc::new(DefaultClock))),
    })
}

/// Migration runner and seeder for the operator endpoints.
///
/// # Errors
/// Returns [`RegistryError`] when the migration catalogue is inconsistent.
pub(super) fn build_admin_state(pool: &DbPool) -> Result<web::Data<AdminState>, RegistryError> {
    let store = Arc::new(DieselMigrationStore::new(pool.clone()));
    let seeder = Arc::new(DieselTestDataRepository::new(pool.clone()));
    Ok(web::Data::new(AdminState {
        migrations: Arc::new(MigrationService::new(store, migration_catalogue::registry()?)),
        test_data: Arc::new(TestDataService::new(
            seeder,
            Arc::new(Argon2PasswordHasher::new()),
        )),
    }))
}
