//! Flat-file user credential store
//!
//! A small `username,role,password-hash` line store for the application's
//! login records. It shares no invariants with the crypto core; a user's
//! role only becomes meaningful once it resolves to key material through a
//! [`KeyStore`](crate::KeyStore).

use crate::error::{Error, Result};
use crate::role::Role;
use log::debug;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::PathBuf;

/// One stored user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    /// Login name, unique within the store
    pub username: String,

    /// The role the user reads records as
    pub role: Role,
}

/// Hashes a password for storage
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// A credential store backed by a single flat file
///
/// Lines are `username,role,sha256-hex`. Writes rewrite or append the whole
/// file; the store is not safe for concurrent writers.
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    /// Creates a store over the given file path
    ///
    /// The file is created on the first `add_user` call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Adds a user with a hashed password
    ///
    /// Fails with [`Error::InvalidArgument`] for an empty or unstorable
    /// username or an already-taken one.
    pub fn add_user(&self, username: &str, role: &Role, password: &str) -> Result<()> {
        if username.is_empty() || username.contains(',') || username.contains('\n') {
            return Err(Error::InvalidArgument(format!("unstorable username {:?}", username)));
        }
        if password.is_empty() {
            return Err(Error::InvalidArgument("password must not be empty".to_string()));
        }
        if self.find_line(username)?.is_some() {
            return Err(Error::InvalidArgument(format!("user {} already exists", username)));
        }

        let mut lines = self.read_lines()?;
        lines.push(format!("{},{},{}", username, role, hash_password(password)));
        self.write_lines(&lines)
    }

    /// Lists the stored users
    ///
    /// A missing file is an empty store, not an error.
    pub fn list_users(&self) -> Result<Vec<UserEntry>> {
        let entries = self
            .read_lines()?
            .iter()
            .filter_map(|line| parse_line(line))
            .map(|(username, role, _)| UserEntry { username, role })
            .collect();
        Ok(entries)
    }

    /// Deletes a user; returns true if one was removed
    pub fn delete_user(&self, username: &str) -> Result<bool> {
        let lines = self.read_lines()?;
        let kept: Vec<String> = lines
            .iter()
            .filter(|line| {
                parse_line(line).map_or(true, |(name, _, _)| name != username)
            })
            .cloned()
            .collect();

        if kept.len() == lines.len() {
            return Ok(false);
        }
        self.write_lines(&kept)?;
        Ok(true)
    }

    /// Checks a password and returns the matching user on success
    ///
    /// An unknown username and a wrong password both yield `None`.
    pub fn verify_password(&self, username: &str, password: &str) -> Result<Option<UserEntry>> {
        let candidate = hash_password(password);
        match self.find_line(username)? {
            Some((name, role, hash)) if hash == candidate => {
                Ok(Some(UserEntry { username: name, role }))
            }
            _ => Ok(None),
        }
    }

    fn find_line(&self, username: &str) -> Result<Option<(String, Role, String)>> {
        Ok(self
            .read_lines()?
            .iter()
            .filter_map(|line| parse_line(line))
            .find(|(name, _, _)| name == username))
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn write_lines(&self, lines: &[String]) -> Result<()> {
        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

fn parse_line(line: &str) -> Option<(String, Role, String)> {
    let mut parts = line.splitn(3, ',');
    let username = parts.next()?.trim();
    let role = parts.next()?.trim();
    let hash = parts.next()?.trim();
    if username.is_empty() || role.is_empty() || hash.is_empty() {
        debug!("skipping malformed user line");
        return None;
    }
    Some((username.to_string(), Role::new(role), hash.to_string()))
}
