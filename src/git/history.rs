use futures::future::try_join_all;
use std::path::Path;

use crate::config::HistoryStrategy;
use crate::error::{Error, Result};
use crate::git::process;
use crate::git::repository::Repository;
use crate::models::{Commit, ObjectId};

impl Repository {
    /// Up to `limit` commits reachable from `start`, newest committer time
    /// first, in the order the walk produced them.
    ///
    /// `start` may be a reference name or a commit id. A failed walk fails
    /// the whole call, as does failing to resolve any walked commit.
    pub async fn get_history_commits(&self, start: &str, limit: usize) -> Result<Vec<Commit>> {
        let mut ids = self.walk_ids(start, limit).await?;
        ids.truncate(limit);

        try_join_all(ids.iter().map(|id| self.find_commit(id))).await
    }

    async fn walk_ids(&self, start: &str, limit: usize) -> Result<Vec<ObjectId>> {
        let traversal = |message: String| {
            tracing::debug!("history walk from {} failed in {}: {}", start, self.path(), message);
            Error::Traversal {
                start: start.to_string(),
                path: self.path().to_string(),
                message,
            }
        };

        match self.config().history_strategy {
            HistoryStrategy::Revwalk => self
                .store()
                .walk_history(start, limit)
                .await
                .map_err(|e| traversal(e.to_string())),
            HistoryStrategy::GitLog => {
                process::log_ids(&self.config().git_program, Path::new(self.path()), start, limit)
                    .await
                    .map_err(|e| traversal(e.to_string()))
            }
        }
    }
}
