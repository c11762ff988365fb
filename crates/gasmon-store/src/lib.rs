//! Durable key-value persistence for gasmon data tiers.
//!
//! The rollup engine treats storage as a narrow collaborator: a string-keyed
//! store with get/set/remove. This crate provides that trait and two
//! implementations.
//!
//! # Features
//!
//! - [`KeyValueStore`] trait, implemented for references, boxes and `Arc`s
//! - [`Store`]: SQLite-backed, with schema versioning
//! - [`MemoryStore`]: in-process, with failure injection for tests
//!
//! # Example
//!
//! ```no_run
//! use gasmon_store::{KeyValueStore, Store};
//!
//! let store = Store::open_default()?;
//! let history = store.get("data_history")?.unwrap_or_else(|| "[]".to_string());
//! println!("{history}");
//! # Ok::<(), gasmon_store::Error>(())
//! ```

mod error;
mod kv;
mod memory;
mod schema;
mod store;

pub use error::{Error, Result};
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/gasmon/data.db`
/// - macOS: `~/Library/Application Support/gasmon/data.db`
/// - Windows: `C:\Users\<user>\AppData\Local\gasmon\data.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("gasmon")
        .join("data.db")
}
