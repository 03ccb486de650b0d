//! Credential store
//!
//! Loads `username:password` pairs from a flat file at startup and
//! answers validation queries. Credentials are compared in plaintext;
//! there is no hashing, rate limiting, or lockout. A known limitation
//! of this server.

use log::{error, info};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Read-only store of valid username/password pairs.
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    /// Loads credentials from a file where each line is `username:password`.
    ///
    /// Only the first `:` splits the pair, so passwords may contain colons.
    /// Lines without a separator are skipped; a duplicate username takes the
    /// value of its last occurrence. An unreadable file logs an error and
    /// yields an empty store, after which every authentication attempt fails.
    pub fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                error!("Unable to open credentials file \"{}\": {}", path.display(), e);
                return Self {
                    users: HashMap::new(),
                };
            }
        };

        let mut users = HashMap::new();
        for line in contents.lines() {
            if let Some((username, password)) = line.split_once(':') {
                users.insert(username.to_string(), password.to_string());
            }
        }

        info!("Loaded {} credential(s) from {}", users.len(), path.display());
        Self { users }
    }

    /// Returns true when the username exists and the password matches.
    pub fn validate(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|stored| stored == password)
    }

    /// Number of stored credentials.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
