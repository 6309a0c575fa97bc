//! Q&A backend: accounts, questions, answers, coupons and the schema
//! migration tooling behind them.
//!
//! Layout follows ports and adapters: `domain` holds entities, services and
//! port traits; `inbound` exposes HTTP handlers; `outbound` implements the
//! ports against PostgreSQL and argon2.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
