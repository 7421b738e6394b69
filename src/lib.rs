//! Typed, asynchronous access to the objects of a Git repository.
//!
//! ```no_run
//! # async fn demo() -> git_objects::Result<()> {
//! let repo = git_objects::Repository::open("/path/to/repo").await?;
//! let branch = repo.get_default_branch().await?;
//! let history = repo.get_history_commits(&branch.name, 10).await?;
//! for commit in history {
//!     println!("{} {}", commit.id.short(7), commit.summary());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod git;
pub mod models;

pub use config::{AccessorConfig, HistoryStrategy};
pub use error::{Error, Result, StoreError};
pub use git::{Git2Store, MemoryStore, ObjectStore, Repository};
