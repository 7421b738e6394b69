//! The object-store capability surface the accessor depends on.
//!
//! Stores hand back plain records; turning them into typed, repository-bound
//! models is the accessor's job. Implementations:
//! - `backend::Git2Store`: libgit2 repository on disk
//! - `memory::MemoryStore`: in-memory records

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::models::{ObjectId, ObjectKind, Signature};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    pub id: ObjectId,
    pub tree_id: ObjectId,
    pub parent_ids: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTree {
    pub id: ObjectId,
    pub entries: Vec<RawTreeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTreeEntry {
    pub name: String,
    pub id: ObjectId,
    pub mode: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlob {
    pub id: ObjectId,
    pub data: Vec<u8>,
}

/// A reference with symbolic indirection already followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReference {
    pub name: String,
    pub target: ObjectId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTag {
    pub id: ObjectId,
    pub name: String,
    pub message: String,
    pub target: ObjectId,
    pub target_kind: ObjectKind,
    pub tagger: Option<Signature>,
}

/// Read-only access to a content-addressed object store.
///
/// Lookups of an object under the wrong kind (a tree id passed to
/// `find_commit`, say) report `StoreError::NotFound`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn find_commit(&self, id: &ObjectId) -> StoreResult<RawCommit>;

    async fn find_tree(&self, id: &ObjectId) -> StoreResult<RawTree>;

    async fn find_blob(&self, id: &ObjectId) -> StoreResult<RawBlob>;

    async fn find_tag(&self, id: &ObjectId) -> StoreResult<RawTag>;

    async fn resolve_reference(&self, name: &str) -> StoreResult<RawReference>;

    /// Full names of every reference in the store.
    async fn reference_names(&self) -> StoreResult<Vec<String>>;

    /// Ancestors of `start` (a reference name or commit id), most recent
    /// committer time first, at most `limit` of them.
    async fn walk_history(&self, _start: &str, _limit: usize) -> StoreResult<Vec<ObjectId>> {
        Err(StoreError::Unsupported("revision walk"))
    }
}
