//! quotesync-client library: exposes the daemon components for testing.
//!
//! This is a thin library layer over the sync client, allowing integration
//! tests to wire the scheduler to in-memory collaborators instead of the
//! real HTTP remote and file storage.

pub mod config;
pub mod error;
pub mod notify;
pub mod policy;
pub mod remote;
pub mod scheduler;
pub mod storage;

// Re-export key types for convenience
pub use config::{Config, ConfigError, PolicyMode};
pub use error::SyncError;
pub use notify::{LogNotifier, Notifier};
pub use policy::{ConflictPolicy, Interactive, OperatorPrompt, RemoteWins, StdinPrompt};
pub use remote::{HttpRemote, RemoteSource};
pub use scheduler::{CycleSummary, SyncScheduler};
pub use storage::{JsonFileStorage, MemoryStorage, Storage, StorageError, UuidMinter};
