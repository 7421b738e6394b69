//! Repository access: the object-store seam and the queries built on it.
//!
//! - `store`: `ObjectStore` trait and the raw records it returns
//! - `backend`: libgit2-backed store
//! - `memory`: in-memory store
//! - `repository`: `Repository`, the typed lookup entry point
//! - `refs`: branch probing and default-branch discovery
//! - `aggregate`: all-references queries and last-updated time
//! - `history`, `process`: bounded history walk

pub mod aggregate;
pub mod backend;
pub mod history;
pub mod memory;
pub mod process;
pub mod refs;
pub mod repository;
pub mod store;

pub use backend::Git2Store;
pub use memory::MemoryStore;
pub use repository::Repository;
pub use store::ObjectStore;
