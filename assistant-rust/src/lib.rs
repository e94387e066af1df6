pub mod client;
pub mod config;
pub mod dashboard;
pub mod prompt;
pub mod server;
pub mod session;
pub mod store;

pub use client::{AssistantClient, ClientError};
pub use config::{Config, ConfigError};
pub use prompt::{CodeTask, ContentTask, HistoryKind, TaskType};
pub use store::{
    FavoriteEntry, HistoryEntry, HistoryStore, JsonFileStore, KeyValueStore, MemoryStore,
    StoreError,
};

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;
