//! Trees, tree entries and blobs.
//!
//! - `Tree`: ordered directory listing, entries kept in store order
//! - `TreeEntry`: one named slot in a tree; directory-ness comes from the mode bits
//! - `Blob`: opaque file content
//! - `EntryTarget`: what a `TreeEntry` resolves to

use serde::Serialize;

use crate::error::Result;
use crate::git::Repository;
use crate::git::store::{RawBlob, RawTree, RawTreeEntry};
use crate::models::ObjectId;

/// Directory bit of a tree entry's file mode.
pub const S_IFDIR: u32 = 0x4000;

#[derive(Debug, Clone, Serialize)]
pub struct Tree {
    #[serde(skip)]
    repo: Repository,
    pub id: ObjectId,
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub(crate) fn from_raw(repo: Repository, raw: RawTree) -> Self {
        let entries = raw
            .entries
            .into_iter()
            .map(|entry| TreeEntry::from_raw(repo.clone(), entry))
            .collect();
        Self {
            repo,
            id: raw.id,
            entries,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn entry(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.entries == other.entries
    }
}

impl Eq for Tree {}

#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry {
    #[serde(skip)]
    repo: Repository,
    pub name: String,
    pub id: ObjectId,
    pub mode: u32,
}

impl TreeEntry {
    pub(crate) fn from_raw(repo: Repository, raw: RawTreeEntry) -> Self {
        Self {
            repo,
            name: raw.name,
            id: raw.id,
            mode: raw.mode,
        }
    }

    pub fn is_directory(&self) -> bool {
        is_directory_mode(self.mode)
    }

    pub async fn target_blob(&self) -> Result<Blob> {
        self.repo.find_blob(&self.id).await
    }

    pub async fn target_tree(&self) -> Result<Tree> {
        self.repo.find_tree(&self.id).await
    }

    /// Resolve to a nested tree or a blob depending on the directory bit.
    pub async fn resolve(&self) -> Result<EntryTarget> {
        if self.is_directory() {
            Ok(EntryTarget::Tree(self.target_tree().await?))
        } else {
            Ok(EntryTarget::Blob(self.target_blob().await?))
        }
    }
}

impl PartialEq for TreeEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.id == other.id && self.mode == other.mode
    }
}

impl Eq for TreeEntry {}

pub fn is_directory_mode(mode: u32) -> bool {
    mode & S_IFDIR != 0
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryTarget {
    Tree(Tree),
    Blob(Blob),
}

#[derive(Debug, Clone)]
pub struct Blob {
    repo: Repository,
    pub id: ObjectId,
    pub data: Vec<u8>,
}

impl Blob {
    pub(crate) fn from_raw(repo: Repository, raw: RawBlob) -> Self {
        Self {
            repo,
            id: raw.id,
            data: raw.data,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Content as UTF-8, if it is valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.data == other.data
    }
}

impl Eq for Blob {}
