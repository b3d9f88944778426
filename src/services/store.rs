use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use bcrypt::{hash, verify};
use chrono::Utc;
use serde::Serialize;
use tokio::fs;
use tokio::sync::Mutex;
use crate::config::Config;
use crate::errors::{StoreError, StoreResult};
use crate::models::{User, UserProgress, UserTable};
use crate::progress::edit;
use crate::progress::shared::{sharing_users, PeerProgress};

const USERS_FILE: &str = "users.json";
const MODULE_IDS_FILE: &str = "global_module_ids.json";
const PROGRESS_DIR: &str = "users";

/// Values a freshly created progress document starts with.
#[derive(Debug, Clone)]
pub struct ProgressDefaults {
    pub total_needed_credits: u32,
    pub semester_targets: Vec<u32>,
}

struct StoreInner {
    data_dir: PathBuf,
    defaults: ProgressDefaults,
    hash_cost: u32,
    // held by every operation that may write a file, including reads that
    // create or repair a document
    write_lock: Mutex<()>,
}

/// File backed storage: `users.json`, one `users/<userid>.json` per user
/// and the global module id registry.
#[derive(Clone)]
pub struct JsonStore {
    inner: Arc<StoreInner>,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>, defaults: ProgressDefaults, hash_cost: u32) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                data_dir: data_dir.into(),
                defaults,
                hash_cost,
                write_lock: Mutex::new(()),
            }),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.storage.data_dir,
            ProgressDefaults {
                total_needed_credits: config.user.default_total_credits,
                semester_targets: config.user.default_semester_targets.clone(),
            },
            config.user.password_cost,
        )
    }

    /// Creates the data directories.
    pub async fn init(&self) -> StoreResult<()> {
        fs::create_dir_all(self.inner.data_dir.join(PROGRESS_DIR)).await?;
        Ok(())
    }

    fn users_path(&self) -> PathBuf {
        self.inner.data_dir.join(USERS_FILE)
    }

    fn progress_path(&self, userid: &str) -> PathBuf {
        self.inner.data_dir.join(PROGRESS_DIR).join(format!("{}.json", userid))
    }

    fn module_ids_path(&self) -> PathBuf {
        self.inner.data_dir.join(MODULE_IDS_FILE)
    }

    fn default_progress(&self) -> UserProgress {
        UserProgress::new(
            self.inner.defaults.total_needed_credits,
            self.inner.defaults.semester_targets.clone(),
        )
    }

    async fn backup(&self, path: &Path, backup_name: String) -> StoreResult<()> {
        let target = self.inner.data_dir.join(&backup_name);
        fs::copy(path, &target).await?;
        tracing::warn!("Backed up unreadable {} to {}", path.display(), target.display());
        Ok(())
    }

    // ---- users ----

    /// Reads the user table. A missing file is created empty; an unreadable
    /// one is backed up and reset.
    pub async fn load_users(&self) -> StoreResult<UserTable> {
        let _guard = self.inner.write_lock.lock().await;
        self.read_users().await
    }

    // callers hold the write lock
    async fn read_users(&self) -> StoreResult<UserTable> {
        let path = self.users_path();
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("Creating empty user table at {}", path.display());
                write_json(&path, &UserTable::new()).await?;
                return Ok(UserTable::new());
            }
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(UserTable::new());
        }

        match serde_json::from_str::<UserTable>(&raw) {
            Ok(mut users) => {
                for (username, user) in users.iter_mut() {
                    user.username = username.clone();
                }
                Ok(users)
            }
            Err(e) => {
                tracing::error!("User table is corrupt: {}", e);
                self.backup(&path, format!("users_backup_{}.json", Utc::now().timestamp()))
                    .await?;
                write_json(&path, &UserTable::new()).await?;
                Ok(UserTable::new())
            }
        }
    }

    pub async fn get_user(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.load_users().await?.remove(username))
    }

    /// Creates a user with a hashed password and a fresh `user_<uuid>` id.
    pub async fn register_user(&self, username: &str, password: &str) -> StoreResult<User> {
        let _guard = self.inner.write_lock.lock().await;
        let mut users = self.read_users().await?;
        if users.contains_key(username) {
            return Err(StoreError::UserExists(username.to_string()));
        }

        let user = User {
            username: username.to_string(),
            password_hash: hash(password, self.inner.hash_cost)?,
            userid: format!("user_{}", uuid::Uuid::new_v4().simple()),
            share_usernames: Vec::new(),
        };
        users.insert(user.username.clone(), user.clone());
        write_json(&self.users_path(), &users).await?;

        tracing::info!("Registered user {} as {}", user.username, user.userid);
        Ok(user)
    }

    /// Returns the user when `password` matches their stored hash.
    pub async fn verify_password(&self, username: &str, password: &str) -> StoreResult<Option<User>> {
        let Some(user) = self.get_user(username).await? else {
            return Ok(None);
        };
        let matches = verify(password, &user.password_hash).unwrap_or_else(|e| {
            tracing::warn!("Stored hash for {} is unusable: {}", username, e);
            false
        });
        Ok(matches.then_some(user))
    }

    pub async fn set_password(&self, username: &str, password: &str) -> StoreResult<()> {
        let password_hash = hash(password, self.inner.hash_cost)?;
        self.update_user(username, |user| user.password_hash = password_hash).await
    }

    pub async fn set_share_usernames(&self, username: &str, share_usernames: Vec<String>) -> StoreResult<()> {
        self.update_user(username, |user| user.share_usernames = share_usernames).await
    }

    async fn update_user(&self, username: &str, change: impl FnOnce(&mut User)) -> StoreResult<()> {
        let _guard = self.inner.write_lock.lock().await;
        let mut users = self.read_users().await?;
        let user = users
            .get_mut(username)
            .ok_or_else(|| StoreError::UnknownUser(username.to_string()))?;
        change(user);
        write_json(&self.users_path(), &users).await
    }

    // ---- progress ----

    /// Reads a user's progress. Missing documents are created with the
    /// defaults, corrupt ones are backed up and reset. Derived fields are
    /// restored and written back when they changed.
    pub async fn load_progress(&self, userid: &str) -> StoreResult<UserProgress> {
        let _guard = self.inner.write_lock.lock().await;
        self.read_or_init_progress(userid).await
    }

    // callers hold the write lock
    async fn read_or_init_progress(&self, userid: &str) -> StoreResult<UserProgress> {
        let path = self.progress_path(userid);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let progress = self.default_progress();
                write_json(&path, &progress).await?;
                return Ok(progress);
            }
            Err(e) => return Err(e.into()),
        };

        let mut progress = match serde_json::from_str::<UserProgress>(&raw) {
            Ok(progress) => progress,
            Err(e) => {
                tracing::error!("Progress of {} is corrupt: {}", userid, e);
                self.backup(&path, format!("data_backup_{}{}.json", userid, Utc::now().timestamp()))
                    .await?;
                let progress = self.default_progress();
                write_json(&path, &progress).await?;
                return Ok(progress);
            }
        };

        if progress.normalize() {
            tracing::debug!("Restored derived fields in progress of {}", userid);
            write_json(&path, &progress).await?;
        }
        Ok(progress)
    }

    /// Reads another user's progress without creating or repairing anything.
    pub async fn try_load_progress(&self, userid: &str) -> Option<UserProgress> {
        let raw = fs::read_to_string(self.progress_path(userid)).await.ok()?;
        match serde_json::from_str::<UserProgress>(&raw) {
            Ok(mut progress) => {
                progress.normalize();
                Some(progress)
            }
            Err(e) => {
                tracing::debug!("Skipping unreadable progress of {}: {}", userid, e);
                None
            }
        }
    }

    /// Loads, edits and saves a user's progress under the write lock.
    /// Nothing is written when `change` fails.
    pub async fn update_progress<T, E>(
        &self,
        userid: &str,
        change: impl FnOnce(&mut UserProgress) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let _guard = self.inner.write_lock.lock().await;
        let mut progress = self.read_or_init_progress(userid).await?;
        let output = change(&mut progress)?;
        write_json(&self.progress_path(userid), &progress).await?;
        Ok(output)
    }

    /// Progress of every user sharing with `origin` whose document loads.
    pub async fn load_shared_peers(&self, origin: &str) -> StoreResult<Vec<PeerProgress>> {
        let users = self.load_users().await?;
        let mut peers = Vec::new();
        for user in sharing_users(origin, &users) {
            if let Some(progress) = self.try_load_progress(&user.userid).await {
                peers.push(PeerProgress {
                    username: user.username.clone(),
                    progress,
                });
            }
        }
        Ok(peers)
    }

    // ---- module id registry ----

    /// Module ids set on any module of any user. Callers hold the write lock.
    async fn all_used_module_ids(&self) -> StoreResult<HashSet<String>> {
        let users = self.read_users().await?;
        let mut used = HashSet::new();
        for user in users.values() {
            if let Some(progress) = self.try_load_progress(&user.userid).await {
                used.extend(progress.modules.iter().filter_map(|m| m.module_id()).map(str::to_string));
            }
        }
        Ok(used)
    }

    pub async fn load_module_ids(&self) -> StoreResult<Vec<String>> {
        let raw = match fs::read_to_string(self.module_ids_path()).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable module id registry: {}", e);
            Vec::new()
        }))
    }

    /// Adds `id` to the registry, pruning ids nobody uses anymore.
    /// Returns false when the id was already registered.
    pub async fn register_module_id(&self, id: &str) -> StoreResult<bool> {
        let _guard = self.inner.write_lock.lock().await;
        let used = self.all_used_module_ids().await?;
        let mut registry = self.load_module_ids().await?;
        let added = edit::register_module_id(&mut registry, id, &used);
        if added {
            write_json(&self.module_ids_path(), &registry).await?;
        }
        Ok(added)
    }
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).await?;
    Ok(())
}
