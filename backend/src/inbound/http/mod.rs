//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod accounts;
pub mod admin;
pub mod answers;
pub mod coupons;
pub mod error;
pub mod health;
pub mod questions;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register the application handlers on a scope mounted at `/api/v1`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(accounts::check_id)
        .service(accounts::register)
        .service(accounts::login)
        .service(accounts::logout)
        // `/users/search` must precede any `/users/{..}` pattern.
        .service(users::search_users)
        .service(users::list_users)
        .service(questions::list_questions)
        .service(questions::create_question)
        .service(questions::get_question)
        .service(questions::update_question)
        .service(questions::delete_question)
        .service(questions::vote_question)
        .service(answers::list_answers)
        .service(answers::create_answer)
        .service(answers::get_answer)
        .service(answers::update_answer)
        .service(answers::delete_answer)
        .service(answers::vote_answer)
        .service(answers::accept_answer)
        .service(coupons::list_coupons)
        .service(coupons::redeem_coupon)
        .service(coupons::current_points);
}

/// Register the operator handlers on a scope mounted at `/api/v1/migration`.
pub fn configure_admin(cfg: &mut web::ServiceConfig) {
    cfg.service(admin::init_database)
        .service(admin::run_migrations)
        .service(admin::revert_migration)
        .service(admin::run_migrations_to)
        .service(admin::migration_status)
        .service(admin::database_status)
        .service(admin::validate_users)
        .service(admin::seed_test_data)
        .service(admin::clear_test_data)
        .service(admin::test_migrations)
        .service(admin::full_test);
}
