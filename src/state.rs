use crate::persistence::PersistedStore;
use crate::storage::JsonFileStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Mutex<PersistedStore<JsonFileStore>>>,
}

impl AppState {
    pub fn new(tracker: PersistedStore<JsonFileStore>) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
        }
    }
}
