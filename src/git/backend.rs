use async_trait::async_trait;
use git2::{Repository, Sort};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::{StoreError, StoreResult};
use crate::git::store::{ObjectStore, RawBlob, RawCommit, RawReference, RawTag, RawTree, RawTreeEntry};
use crate::models::{ObjectId, ObjectKind, Signature};

/// `ObjectStore` over a libgit2 repository.
///
/// libgit2 calls are blocking, so every lookup runs on the blocking pool
/// against the shared handle.
pub struct Git2Store {
    repo: Arc<Mutex<Repository>>,
}

impl Git2Store {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let repo = Repository::discover(path.as_ref())?;
        Ok(Self {
            repo: Arc::new(Mutex::new(repo)),
        })
    }

    async fn with_repo<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Repository) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        tokio::task::spawn_blocking(move || {
            let repo = repo
                .lock()
                .map_err(|_| StoreError::Backend("Lock poisoned".to_string()))?;
            f(&repo)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("store task failed: {}", e)))?
    }
}

fn to_oid(id: &ObjectId) -> StoreResult<git2::Oid> {
    git2::Oid::from_str(id.as_str()).map_err(StoreError::from)
}

fn signature(sig: &git2::Signature) -> Signature {
    let when = sig.when();
    Signature {
        name: String::from_utf8_lossy(sig.name_bytes()).into_owned(),
        email: String::from_utf8_lossy(sig.email_bytes()).into_owned(),
        when: when.seconds(),
        offset_minutes: when.offset_minutes(),
    }
}

fn raw_commit(commit: &git2::Commit) -> RawCommit {
    RawCommit {
        id: commit.id().into(),
        tree_id: commit.tree_id().into(),
        parent_ids: commit.parent_ids().map(ObjectId::from).collect(),
        author: signature(&commit.author()),
        committer: signature(&commit.committer()),
        message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
    }
}

#[async_trait]
impl ObjectStore for Git2Store {
    async fn find_commit(&self, id: &ObjectId) -> StoreResult<RawCommit> {
        let oid = to_oid(id)?;
        self.with_repo(move |repo| Ok(raw_commit(&repo.find_commit(oid)?)))
            .await
    }

    async fn find_tree(&self, id: &ObjectId) -> StoreResult<RawTree> {
        let oid = to_oid(id)?;
        self.with_repo(move |repo| {
            let tree = repo.find_tree(oid)?;
            let entries = tree
                .iter()
                .map(|entry| RawTreeEntry {
                    name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
                    id: entry.id().into(),
                    mode: entry.filemode() as u32,
                })
                .collect();
            Ok(RawTree {
                id: tree.id().into(),
                entries,
            })
        })
        .await
    }

    async fn find_blob(&self, id: &ObjectId) -> StoreResult<RawBlob> {
        let oid = to_oid(id)?;
        self.with_repo(move |repo| {
            let blob = repo.find_blob(oid)?;
            Ok(RawBlob {
                id: blob.id().into(),
                data: blob.content().to_vec(),
            })
        })
        .await
    }

    async fn find_tag(&self, id: &ObjectId) -> StoreResult<RawTag> {
        let oid = to_oid(id)?;
        self.with_repo(move |repo| {
            let tag = repo.find_tag(oid)?;
            let target_kind = tag
                .target_type()
                .and_then(ObjectKind::from_git2)
                .ok_or_else(|| StoreError::Backend(format!("tag {} has an unknown target type", oid)))?;
            Ok(RawTag {
                id: tag.id().into(),
                name: String::from_utf8_lossy(tag.name_bytes()).into_owned(),
                message: tag
                    .message_bytes()
                    .map(|m| String::from_utf8_lossy(m).into_owned())
                    .unwrap_or_default(),
                target: tag.target_id().into(),
                target_kind,
                tagger: tag.tagger().as_ref().map(signature),
            })
        })
        .await
    }

    async fn resolve_reference(&self, name: &str) -> StoreResult<RawReference> {
        let name = name.to_string();
        self.with_repo(move |repo| {
            let reference = repo.find_reference(&name)?;
            let target = reference
                .resolve()?
                .target()
                .ok_or_else(|| StoreError::NotFound(format!("{} has no direct target", name)))?;
            Ok(RawReference {
                name,
                target: target.into(),
            })
        })
        .await
    }

    async fn reference_names(&self) -> StoreResult<Vec<String>> {
        self.with_repo(|repo| {
            let mut references = repo.references()?;
            let mut names = Vec::new();
            for name in references.names() {
                names.push(name?.to_string());
            }
            Ok(names)
        })
        .await
    }

    async fn walk_history(&self, start: &str, limit: usize) -> StoreResult<Vec<ObjectId>> {
        let start = start.to_string();
        self.with_repo(move |repo| {
            let start_commit = repo.revparse_single(&start)?.peel_to_commit()?;

            let mut revwalk = repo.revwalk()?;
            revwalk.set_sorting(Sort::TIME)?;
            revwalk.push(start_commit.id())?;

            revwalk
                .take(limit)
                .map(|oid| oid.map(ObjectId::from).map_err(StoreError::from))
                .collect()
        })
        .await
    }
}
