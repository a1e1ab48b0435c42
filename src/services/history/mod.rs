pub mod store;

pub use store::{append, HistoryStore, StoreError, DEFAULT_HISTORY_FILE, DEFAULT_HISTORY_LIMIT};
