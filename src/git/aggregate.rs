//! Queries that fan out over every reference in the repository.
//!
//! - `get_all_references`: all-or-nothing
//! - `get_all_reference_tip_commits`: references whose target is not a
//!   reachable commit are dropped
//! - `get_last_updated_time`: newest committer time among the tips

use chrono::{DateTime, Utc};
use futures::future::{join_all, try_join_all};

use crate::error::Result;
use crate::git::repository::Repository;
use crate::models::commit::{unix_epoch, utc_from_seconds};
use crate::models::{Commit, Reference};

impl Repository {
    pub async fn get_all_references(&self) -> Result<Vec<Reference>> {
        let names = self.list_reference_ids().await?;
        try_join_all(names.iter().map(|name| self.get_reference(name))).await
    }

    /// Tip commit of every reference, in reference-listing order.
    pub async fn get_all_reference_tip_commits(&self) -> Result<Vec<Commit>> {
        let references = self.get_all_references().await?;
        let tips = join_all(references.iter().map(|r| r.target_commit())).await;

        Ok(references
            .iter()
            .zip(tips)
            .filter_map(|(reference, tip)| match tip {
                Ok(commit) => Some(commit),
                Err(err) => {
                    tracing::debug!("dropping {} from tip commits: {}", reference.name, err);
                    None
                }
            })
            .collect())
    }

    /// Latest committer time across all reference tips, or the Unix epoch
    /// when there are none.
    pub async fn get_last_updated_time(&self) -> Result<DateTime<Utc>> {
        let tips = self.get_all_reference_tip_commits().await?;
        Ok(tips
            .iter()
            .map(|commit| commit.committer.when)
            .max()
            .map(utc_from_seconds)
            .unwrap_or_else(unix_epoch))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::error::Error;
    use crate::git::memory::MemoryStore;
    use crate::git::repository::fixtures::*;
    use crate::git::store::{RawBlob, RawTree};
    use crate::models::ObjectKind;

    use super::*;

    /// master -> C1 (100), gh-pages -> C2 (200), tags/v1 -> T1 -> C1.
    fn scenario() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .insert_commit(commit(1, 100, &[]))
            .insert_commit(commit(2, 200, &[1]))
            .insert_tag(tag(10, "v1", 1, ObjectKind::Commit))
            .set_reference("refs/heads/master", oid(1))
            .set_reference("refs/heads/gh-pages", oid(2))
            .set_reference("refs/tags/v1", oid(10));
        store
    }

    #[tokio::test]
    async fn scenario_queries() {
        let repo = repo(scenario());

        let references = repo.get_all_references().await.unwrap();
        assert_eq!(references.len(), 3);

        let updated = repo.get_last_updated_time().await.unwrap();
        assert_eq!(updated.timestamp(), 200);

        let default = repo.get_default_branch().await.unwrap();
        assert_eq!(default.name, "refs/heads/master");
    }

    #[tokio::test]
    async fn annotated_tags_peel_to_commits() {
        let repo = repo(scenario());
        let tips = repo.get_all_reference_tip_commits().await.unwrap();
        let mut ids: Vec<_> = tips.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec![oid(1), oid(1), oid(2)]);
    }

    #[tokio::test]
    async fn non_commit_targets_are_dropped() {
        let mut store = scenario();
        store
            .insert_blob(RawBlob {
                id: oid(500),
                data: b"not a commit".to_vec(),
            })
            .insert_tree(RawTree {
                id: oid(501),
                entries: Vec::new(),
            })
            .set_reference("refs/heads/blob", oid(500))
            .set_reference("refs/tags/tree", oid(501))
            .set_reference("refs/heads/dangling", oid(999));
        let repo = repo(store);

        assert_eq!(repo.get_all_references().await.unwrap().len(), 6);
        let tips = repo.get_all_reference_tip_commits().await.unwrap();
        assert_eq!(tips.len(), 3);
    }

    #[tokio::test]
    async fn failing_tip_resolution_is_tolerated() {
        let mut store = scenario();
        store.fail(oid(2).to_string());
        let repo = repo(store);

        let tips = repo.get_all_reference_tip_commits().await.unwrap();
        assert!(tips.iter().all(|c| c.id == oid(1)));
        assert_eq!(repo.get_last_updated_time().await.unwrap().timestamp(), 100);
    }

    #[tokio::test]
    async fn any_reference_failure_fails_listing() {
        let mut store = scenario();
        store.fail("refs/heads/gh-pages");
        let repo = repo(store);
        assert!(matches!(
            repo.get_all_references().await,
            Err(Error::Store { .. })
        ));
    }

    #[tokio::test]
    async fn listing_failure_propagates() {
        let mut store = scenario();
        store.fail_listing();
        let repo = repo(store);
        assert!(repo.get_all_reference_tip_commits().await.is_err());
        assert!(repo.get_last_updated_time().await.is_err());
    }

    #[tokio::test]
    async fn empty_repository_is_epoch() {
        let repo = repo(MemoryStore::new());
        assert_eq!(repo.get_last_updated_time().await.unwrap(), unix_epoch());
    }

    #[tokio::test]
    async fn maximum_uses_committer_time() {
        let mut store = MemoryStore::new();
        for (id, when) in [(1, 300), (2, 100), (3, 200)] {
            store
                .insert_commit(commit(id, when, &[]))
                .set_reference(format!("refs/heads/b{}", id), oid(id));
        }
        store.delay(oid(1).to_string(), Duration::from_millis(50));
        let repo = repo(store);

        assert_eq!(repo.get_last_updated_time().await.unwrap().timestamp(), 300);
    }

    #[tokio::test]
    async fn tips_keep_listing_order_regardless_of_completion() {
        let mut store = MemoryStore::new();
        store
            .insert_commit(commit(1, 100, &[]))
            .insert_commit(commit(2, 200, &[]))
            .set_reference("refs/heads/a", oid(1))
            .set_reference("refs/heads/b", oid(2))
            .delay(oid(1).to_string(), Duration::from_millis(50));
        let repo = repo(store);

        let tips = repo.get_all_reference_tip_commits().await.unwrap();
        let ids: Vec<_> = tips.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![oid(1), oid(2)]);
    }
}
