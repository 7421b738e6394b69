use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::{AccessorConfig, BRANCH_NAMESPACE, TAG_NAMESPACE, qualify};
use crate::error::{Error, Result, StoreError};
use crate::git::backend::Git2Store;
use crate::git::store::ObjectStore;
use crate::models::{Blob, Commit, ObjectId, Reference, Tag, Tree};

/// Entry point for all lookups against one repository.
///
/// Cheap to clone; every model handed out keeps a clone so it can resolve
/// related objects later. Nothing is cached: each lookup reads the store
/// again and builds a fresh value.
#[derive(Clone)]
pub struct Repository {
    inner: Arc<Inner>,
}

struct Inner {
    path: String,
    store: Arc<dyn ObjectStore>,
    config: AccessorConfig,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.inner.path)
            .finish_non_exhaustive()
    }
}

impl Repository {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, AccessorConfig::default()).await
    }

    pub async fn open_with_config<P: AsRef<Path>>(path: P, config: AccessorConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let path_str = path.to_string_lossy().to_string();

        let store = tokio::task::spawn_blocking(move || Git2Store::open(&path))
            .await
            .map_err(|e| Error::Open {
                path: path_str.clone(),
                message: e.to_string(),
            })?
            .map_err(|e| {
                tracing::debug!("failed to open repository {}: {}", path_str, e);
                Error::Open {
                    path: path_str.clone(),
                    message: e.to_string(),
                }
            })?;

        Ok(Self::with_store(path_str, Arc::new(store), config))
    }

    /// Wrap an already opened store.
    pub fn with_store(path: impl Into<String>, store: Arc<dyn ObjectStore>, config: AccessorConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                path: path.into(),
                store,
                config,
            }),
        }
    }

    pub fn path(&self) -> &str {
        &self.inner.path
    }

    pub fn config(&self) -> &AccessorConfig {
        &self.inner.config
    }

    pub(crate) fn store(&self) -> &dyn ObjectStore {
        self.inner.store.as_ref()
    }

    pub fn parse_id(&self, id: &str) -> Result<ObjectId> {
        ObjectId::new(id).map_err(|_| Error::InvalidId {
            id: id.to_string(),
            path: self.path().to_string(),
        })
    }

    fn store_error(&self, err: StoreError, operation: &'static str, target: &str) -> Error {
        tracing::debug!(
            "{} failed for {} in repository {}: {}",
            operation,
            target,
            self.path(),
            err
        );
        Error::from_store(err, operation, target, self.path())
    }

    pub async fn get_commit(&self, id: impl AsRef<str>) -> Result<Commit> {
        let id = self.parse_id(id.as_ref())?;
        self.find_commit(&id).await
    }

    pub async fn get_tree(&self, id: impl AsRef<str>) -> Result<Tree> {
        let id = self.parse_id(id.as_ref())?;
        self.find_tree(&id).await
    }

    pub async fn get_blob(&self, id: impl AsRef<str>) -> Result<Blob> {
        let id = self.parse_id(id.as_ref())?;
        self.find_blob(&id).await
    }

    /// Annotated tag object by id.
    pub async fn get_tag(&self, id: impl AsRef<str>) -> Result<Tag> {
        let id = self.parse_id(id.as_ref())?;
        self.find_tag(&id).await
    }

    /// Reference by full name, e.g. `refs/heads/master`.
    pub async fn get_reference(&self, name: &str) -> Result<Reference> {
        let raw = self
            .store()
            .resolve_reference(name)
            .await
            .map_err(|e| self.store_error(e, "get_reference", name))?;
        Ok(Reference::from_raw(self.clone(), raw))
    }

    /// Branch by short or full name.
    pub async fn get_branch(&self, name: &str) -> Result<Reference> {
        self.get_reference(&qualify(name, BRANCH_NAMESPACE)).await
    }

    /// Tag reference by short or full name.
    pub async fn get_tag_reference(&self, name: &str) -> Result<Reference> {
        self.get_reference(&qualify(name, TAG_NAMESPACE)).await
    }

    /// Full names of every reference in the repository.
    pub async fn list_reference_ids(&self) -> Result<Vec<String>> {
        self.store()
            .reference_names()
            .await
            .map_err(|e| self.store_error(e, "list_reference_ids", "*"))
    }

    pub(crate) async fn find_commit(&self, id: &ObjectId) -> Result<Commit> {
        let raw = self
            .store()
            .find_commit(id)
            .await
            .map_err(|e| self.store_error(e, "get_commit", id.as_str()))?;
        Ok(Commit::from_raw(self.clone(), raw))
    }

    pub(crate) async fn find_tree(&self, id: &ObjectId) -> Result<Tree> {
        let raw = self
            .store()
            .find_tree(id)
            .await
            .map_err(|e| self.store_error(e, "get_tree", id.as_str()))?;
        Ok(Tree::from_raw(self.clone(), raw))
    }

    pub(crate) async fn find_blob(&self, id: &ObjectId) -> Result<Blob> {
        let raw = self
            .store()
            .find_blob(id)
            .await
            .map_err(|e| self.store_error(e, "get_blob", id.as_str()))?;
        Ok(Blob::from_raw(self.clone(), raw))
    }

    pub(crate) async fn find_tag(&self, id: &ObjectId) -> Result<Tag> {
        let raw = self
            .store()
            .find_tag(id)
            .await
            .map_err(|e| self.store_error(e, "get_tag", id.as_str()))?;
        Ok(Tag::from_raw(self.clone(), raw))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small in-memory object graphs shared by the unit tests.

    use super::*;
    use crate::git::memory::MemoryStore;
    use crate::git::store::{RawBlob, RawCommit, RawTag, RawTree, RawTreeEntry};
    use crate::models::{ObjectKind, Signature};

    pub fn oid(n: u32) -> ObjectId {
        ObjectId::new(format!("{:040x}", n)).unwrap()
    }

    pub fn sig(when: i64) -> Signature {
        Signature {
            name: "Tester".into(),
            email: "tester@example.com".into(),
            when,
            offset_minutes: 0,
        }
    }

    pub fn commit(id: u32, when: i64, parents: &[u32]) -> RawCommit {
        RawCommit {
            id: oid(id),
            tree_id: oid(1000),
            parent_ids: parents.iter().map(|p| oid(*p)).collect(),
            // author time deliberately differs from committer time
            author: sig(when - 50),
            committer: sig(when),
            message: format!("commit {}\n\nbody", id),
        }
    }

    pub fn tag(id: u32, name: &str, target: u32, target_kind: ObjectKind) -> RawTag {
        RawTag {
            id: oid(id),
            name: name.to_string(),
            message: format!("release {}", name),
            target: oid(target),
            target_kind,
            tagger: Some(sig(0)),
        }
    }

    /// Root tree 1000 holding `README.md` (blob 2000) and `lib/` (tree 1001).
    pub fn with_tree(store: &mut MemoryStore) {
        store
            .insert_tree(RawTree {
                id: oid(1000),
                entries: vec![
                    RawTreeEntry {
                        name: "README.md".into(),
                        id: oid(2000),
                        mode: 0o100644,
                    },
                    RawTreeEntry {
                        name: "lib".into(),
                        id: oid(1001),
                        mode: 0o040000,
                    },
                ],
            })
            .insert_tree(RawTree {
                id: oid(1001),
                entries: vec![RawTreeEntry {
                    name: "main.rs".into(),
                    id: oid(2001),
                    mode: 0o100644,
                }],
            })
            .insert_blob(RawBlob {
                id: oid(2000),
                data: b"# readme\n".to_vec(),
            })
            .insert_blob(RawBlob {
                id: oid(2001),
                data: vec![0xff, 0x00, 0xfe],
            });
    }

    pub fn repo(store: MemoryStore) -> Repository {
        Repository::with_store("/tmp/memory-repo", Arc::new(store), AccessorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::git::memory::MemoryStore;
    use crate::models::EntryTarget;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .insert_commit(commit(1, 100, &[]))
            .insert_commit(commit(2, 200, &[1]))
            .set_reference("refs/heads/master", oid(2));
        with_tree(&mut store);
        store
    }

    #[tokio::test]
    async fn resolving_twice_gives_equal_values() {
        let repo = repo(store());
        let first = repo.get_commit(oid(2)).await.unwrap();
        let second = repo.get_commit(oid(2)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.summary(), "commit 2");
        assert_eq!(first.time().timestamp(), 200);
    }

    #[tokio::test]
    async fn commit_resolves_parents_and_tree() {
        let repo = repo(store());
        let commit = repo.get_commit(oid(2)).await.unwrap();

        let parents = commit.parents().await.unwrap();
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].id, oid(1));

        let tree = commit.tree().await.unwrap();
        let names: Vec<_> = tree.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["README.md", "lib"]);
    }

    #[tokio::test]
    async fn tree_entries_resolve_by_mode() {
        let repo = repo(store());
        let tree = repo.get_tree(oid(1000)).await.unwrap();

        let readme = tree.entry("README.md").unwrap();
        assert!(!readme.is_directory());
        let blob = readme.target_blob().await.unwrap();
        assert_eq!(blob.as_text(), Some("# readme\n"));

        let lib = tree.entry("lib").unwrap();
        assert!(lib.is_directory());
        match lib.resolve().await.unwrap() {
            EntryTarget::Tree(sub) => {
                let main = sub.entry("main.rs").unwrap();
                let blob = main.target_blob().await.unwrap();
                assert_eq!(blob.size(), 3);
                assert_eq!(blob.as_text(), None);
            }
            other => panic!("expected tree, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_objects_name_operation_and_path() {
        let repo = repo(store());
        let err = repo.get_commit(oid(99)).await.unwrap_err();
        match &err {
            Error::NotFound {
                operation,
                target,
                path,
            } => {
                assert_eq!(*operation, "get_commit");
                assert_eq!(target, oid(99).as_str());
                assert_eq!(path, "/tmp/memory-repo");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn wrong_kind_is_not_found() {
        let repo = repo(store());
        assert!(repo.get_commit(oid(1000)).await.unwrap_err().is_not_found());
        assert!(repo.get_tree(oid(1)).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn backend_failures_propagate_as_store_errors() {
        let mut store = store();
        store.fail(oid(1).to_string());
        let repo = repo(store);
        assert!(matches!(
            repo.get_commit(oid(1)).await,
            Err(Error::Store { .. })
        ));
    }

    #[tokio::test]
    async fn malformed_ids_are_rejected() {
        let repo = repo(store());
        assert!(matches!(
            repo.get_commit("HEAD").await,
            Err(Error::InvalidId { .. })
        ));
    }

    #[tokio::test]
    async fn branch_lookup_qualifies_short_names() {
        let repo = repo(store());
        let branch = repo.get_branch("master").await.unwrap();
        assert_eq!(branch.name, "refs/heads/master");
        assert_eq!(branch.short_name(), "master");
        assert!(branch.is_branch());
        assert!(repo.get_reference("master").await.is_err());
    }
}
