// src/store.rs
//! Persistence collaborator: users, favorites, and saved articles behind a
//! mutex-protected in-memory table with an optional JSON snapshot on disk.
//!
//! The contract is deliberately narrow: store/retrieve a user record,
//! store/retrieve a favorite or saved-article record. Favorite and save
//! actions are idempotent toggles (insert-if-absent, delete-if-present).

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    pub password_hash: String,
}

/// A favorited (source, category) pair. At least one side is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteRecord {
    pub user_id: u64,
    pub source: Option<String>,
    pub category: Option<String>,
}

/// An article pinned to a user's reading list. `url` is its identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedArticle {
    pub user_id: u64,
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleStatus {
    Added,
    Removed,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    next_user_id: u64,
    users: Vec<UserRecord>,
    favorites: Vec<FavoriteRecord>,
    saved: Vec<SavedArticle>,
}

#[derive(Debug)]
pub struct Store {
    inner: Mutex<StoreData>,
    snapshot_path: Option<PathBuf>,
}

impl Store {
    /// Open a store, restoring the JSON snapshot at `path` when it exists.
    /// A corrupt snapshot logs a warning and starts empty rather than
    /// refusing to boot.
    pub fn open(path: Option<PathBuf>) -> Self {
        let data = match &path {
            Some(p) if p.exists() => match std::fs::read_to_string(p) {
                Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                    tracing::warn!(error = ?e, path = %p.display(), "corrupt store snapshot; starting empty");
                    StoreData::default()
                }),
                Err(e) => {
                    tracing::warn!(error = ?e, path = %p.display(), "unreadable store snapshot; starting empty");
                    StoreData::default()
                }
            },
            _ => StoreData::default(),
        };
        Self {
            inner: Mutex::new(data),
            snapshot_path: path,
        }
    }

    pub fn in_memory() -> Self {
        Self::open(None)
    }

    fn persist(&self, data: &StoreData) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(data).context("serializing store snapshot")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing store snapshot to {}", path.display()))
    }

    /// Create a user. Returns `Ok(None)` when the username is taken.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<UserRecord>> {
        let mut data = self.inner.lock().expect("store mutex poisoned");
        if data
            .users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(username))
        {
            return Ok(None);
        }
        data.next_user_id += 1;
        let user = UserRecord {
            id: data.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        data.users.push(user.clone());
        self.persist(&data)?;
        Ok(Some(user))
    }

    pub fn user_by_name(&self, username: &str) -> Option<UserRecord> {
        let data = self.inner.lock().expect("store mutex poisoned");
        data.users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned()
    }

    pub fn user_by_id(&self, id: u64) -> Option<UserRecord> {
        let data = self.inner.lock().expect("store mutex poisoned");
        data.users.iter().find(|u| u.id == id).cloned()
    }

    pub fn favorites_for(&self, user_id: u64) -> Vec<FavoriteRecord> {
        let data = self.inner.lock().expect("store mutex poisoned");
        data.favorites
            .iter()
            .filter(|f| f.user_id == user_id && (f.source.is_some() || f.category.is_some()))
            .cloned()
            .collect()
    }

    /// Insert-if-absent / delete-if-present on a (source, category) pair.
    pub fn toggle_favorite(
        &self,
        user_id: u64,
        source: Option<String>,
        category: Option<String>,
    ) -> Result<ToggleStatus> {
        let mut data = self.inner.lock().expect("store mutex poisoned");
        let existing = data
            .favorites
            .iter()
            .position(|f| f.user_id == user_id && f.source == source && f.category == category);
        let status = match existing {
            Some(idx) => {
                data.favorites.remove(idx);
                ToggleStatus::Removed
            }
            None => {
                data.favorites.push(FavoriteRecord {
                    user_id,
                    source,
                    category,
                });
                ToggleStatus::Added
            }
        };
        self.persist(&data)?;
        Ok(status)
    }

    pub fn saved_for(&self, user_id: u64) -> Vec<SavedArticle> {
        let data = self.inner.lock().expect("store mutex poisoned");
        data.saved
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Insert-if-absent / delete-if-present on the article URL.
    pub fn toggle_saved(
        &self,
        user_id: u64,
        title: String,
        url: String,
        image_url: Option<String>,
    ) -> Result<ToggleStatus> {
        let mut data = self.inner.lock().expect("store mutex poisoned");
        let existing = data
            .saved
            .iter()
            .position(|s| s.user_id == user_id && s.url == url);
        let status = match existing {
            Some(idx) => {
                data.saved.remove(idx);
                ToggleStatus::Removed
            }
            None => {
                data.saved.push(SavedArticle {
                    user_id,
                    title,
                    url,
                    image_url,
                });
                ToggleStatus::Added
            }
        };
        self.persist(&data)?;
        Ok(status)
    }
}
