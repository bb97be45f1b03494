/// Background scoring catalog fetch.
pub mod catalog_loader;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Operator-driven redelivery of saved scores.
pub mod resend_manager;
/// Saved scores routes logic.
pub mod resend_service;
/// Scoring session logic.
pub mod scoring_service;
/// Durable queue of reports awaiting delivery.
pub mod submission_queue;
