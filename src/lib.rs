pub mod app;
pub mod dates;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod persistence;
pub mod stats;
pub mod storage;
pub mod store;
pub mod streak;
pub mod state;

pub use app::router;
pub use persistence::PersistedStore;
pub use state::AppState;
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, resolve_data_path};
pub use store::HabitStore;
