//! Typed, immutable views of repository objects.
//!
//! Every entity is built fresh from a store record on each lookup and keeps
//! a handle to the `Repository` it came from for further lookups.
//! - `object`: ObjectId, ObjectKind
//! - `commit`: Commit, Signature
//! - `tree`: Tree, TreeEntry, Blob, EntryTarget
//! - `refs`: Reference, ReferenceKind, Tag

pub mod commit;
pub mod object;
pub mod refs;
pub mod tree;

pub use commit::*;
pub use object::*;
pub use refs::*;
pub use tree::*;
