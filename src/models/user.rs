use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wildcard entry in `share_usernames` granting access to every user.
pub const SHARE_WITH_EVERYONE: &str = "*";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(skip)]
    pub username: String,             // Key in the user table, filled on load
    #[serde(rename = "password")]
    pub password_hash: String,
    pub userid: String,               // Names the user's progress file
    #[serde(default)]
    pub share_usernames: Vec<String>, // Users allowed to see this user's progress
}

impl User {
    /// Whether this user opted in to share their progress with `origin`.
    pub fn shares_with(&self, origin: &str) -> bool {
        self.username != origin
            && self
                .share_usernames
                .iter()
                .any(|name| name == origin || name == SHARE_WITH_EVERYONE)
    }
}

/// All users keyed by username, as stored in `users.json`.
pub type UserTable = BTreeMap<String, User>;
