//! In-memory object store.
//!
//! Holds records directly instead of reading a repository from disk. Each
//! lookup can be given an artificial delay or a forced backend failure,
//! keyed by the object id or reference name it is asked for, so callers can
//! control completion order and failure placement in concurrent queries.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};
use std::time::Duration;

use crate::error::{StoreError, StoreResult};
use crate::git::store::{ObjectStore, RawBlob, RawCommit, RawReference, RawTag, RawTree};
use crate::models::ObjectId;
use crate::models::refs::MAX_TAG_DEPTH;

#[derive(Debug, Default)]
pub struct MemoryStore {
    commits: HashMap<ObjectId, RawCommit>,
    trees: HashMap<ObjectId, RawTree>,
    blobs: HashMap<ObjectId, RawBlob>,
    tags: HashMap<ObjectId, RawTag>,
    references: BTreeMap<String, ObjectId>,
    delays: HashMap<String, Duration>,
    failures: HashSet<String>,
    fail_listing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_commit(&mut self, commit: RawCommit) -> &mut Self {
        self.commits.insert(commit.id.clone(), commit);
        self
    }

    pub fn insert_tree(&mut self, tree: RawTree) -> &mut Self {
        self.trees.insert(tree.id.clone(), tree);
        self
    }

    pub fn insert_blob(&mut self, blob: RawBlob) -> &mut Self {
        self.blobs.insert(blob.id.clone(), blob);
        self
    }

    pub fn insert_tag(&mut self, tag: RawTag) -> &mut Self {
        self.tags.insert(tag.id.clone(), tag);
        self
    }

    pub fn set_reference(&mut self, name: impl Into<String>, target: ObjectId) -> &mut Self {
        self.references.insert(name.into(), target);
        self
    }

    /// Delay every lookup of `key` (an object id or reference name).
    pub fn delay(&mut self, key: impl Into<String>, delay: Duration) -> &mut Self {
        self.delays.insert(key.into(), delay);
        self
    }

    /// Make every lookup of `key` fail with a backend error.
    pub fn fail(&mut self, key: impl Into<String>) -> &mut Self {
        self.failures.insert(key.into());
        self
    }

    pub fn fail_listing(&mut self) -> &mut Self {
        self.fail_listing = true;
        self
    }

    async fn access(&self, key: &str) -> StoreResult<()> {
        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }
        if self.failures.contains(key) {
            return Err(StoreError::Backend(format!("injected failure for {}", key)));
        }
        Ok(())
    }

    fn lookup<T: Clone>(map: &HashMap<ObjectId, T>, id: &ObjectId) -> StoreResult<T> {
        map.get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn start_commit(&self, start: &str) -> StoreResult<ObjectId> {
        if let Some(target) = self.references.get(start) {
            return self.peel_to_commit(target.clone());
        }
        let id = ObjectId::new(start).map_err(|e| StoreError::NotFound(e.to_string()))?;
        self.peel_to_commit(id)
    }

    fn peel_to_commit(&self, mut id: ObjectId) -> StoreResult<ObjectId> {
        for _ in 0..MAX_TAG_DEPTH {
            match self.tags.get(&id) {
                Some(tag) => id = tag.target.clone(),
                None => return Ok(id),
            }
        }
        Err(StoreError::NotFound(format!("tag chain at {} is too deep", id)))
    }
}

/// Max-heap entry ordering commits by committer time.
struct Pending {
    when: i64,
    id: ObjectId,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.when
            .cmp(&other.when)
            .then_with(|| other.id.cmp(&self.id))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn find_commit(&self, id: &ObjectId) -> StoreResult<RawCommit> {
        self.access(id.as_str()).await?;
        Self::lookup(&self.commits, id)
    }

    async fn find_tree(&self, id: &ObjectId) -> StoreResult<RawTree> {
        self.access(id.as_str()).await?;
        Self::lookup(&self.trees, id)
    }

    async fn find_blob(&self, id: &ObjectId) -> StoreResult<RawBlob> {
        self.access(id.as_str()).await?;
        Self::lookup(&self.blobs, id)
    }

    async fn find_tag(&self, id: &ObjectId) -> StoreResult<RawTag> {
        self.access(id.as_str()).await?;
        Self::lookup(&self.tags, id)
    }

    async fn resolve_reference(&self, name: &str) -> StoreResult<RawReference> {
        self.access(name).await?;
        self.references
            .get(name)
            .map(|target| RawReference {
                name: name.to_string(),
                target: target.clone(),
            })
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn reference_names(&self) -> StoreResult<Vec<String>> {
        if self.fail_listing {
            return Err(StoreError::Backend("injected listing failure".to_string()));
        }
        Ok(self.references.keys().cloned().collect())
    }

    async fn walk_history(&self, start: &str, limit: usize) -> StoreResult<Vec<ObjectId>> {
        self.access(start).await?;
        let start = self.start_commit(start)?;
        let first = Self::lookup(&self.commits, &start)?;

        let mut seen = HashSet::from([first.id.clone()]);
        let mut queue = BinaryHeap::from([Pending {
            when: first.committer.when,
            id: first.id,
        }]);
        let mut walked = Vec::new();

        while walked.len() < limit {
            let Some(next) = queue.pop() else { break };
            self.access(next.id.as_str()).await?;
            let commit = Self::lookup(&self.commits, &next.id)?;
            for parent in &commit.parent_ids {
                if seen.insert(parent.clone()) {
                    let parent = Self::lookup(&self.commits, parent)?;
                    queue.push(Pending {
                        when: parent.committer.when,
                        id: parent.id,
                    });
                }
            }
            walked.push(next.id);
        }

        Ok(walked)
    }
}
