/// Central scoring server client.
pub mod central;
/// Persisted report and queue models.
pub mod models;
/// Saved scores file store.
pub mod queue_store;
/// Storage error types.
pub mod storage;
