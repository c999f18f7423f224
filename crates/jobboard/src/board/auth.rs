use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::domain::Role;

const HASH_SCHEME: &str = "sha256";
const HASH_ROUNDS: u32 = 10_000;

/// Hash a password as `sha256$<rounds>$<salt>$<hex digest>` with a random salt.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = stretch(password, &salt, HASH_ROUNDS);
    format!("{HASH_SCHEME}${HASH_ROUNDS}${salt}${digest}")
}

/// Check `password` against a hash produced by [`hash_password`].
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(4, '$');
    let (Some(scheme), Some(rounds), Some(salt), Some(expected)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != HASH_SCHEME {
        return false;
    }
    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };

    let actual = stretch(password, salt, rounds);
    constant_time_eq(actual.as_bytes(), expected.as_bytes())
}

fn stretch(password: &str, salt: &str, rounds: u32) -> String {
    let mut digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..rounds {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(salt.as_bytes())
            .finalize();
    }
    hex::encode(digest)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// A signed-in user, identified to the API by its bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub role: Role,
}

/// Process-lifetime session table.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn open(&self, username: &str, role: Role) -> Result<Session, AuthError> {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            username: username.to_string(),
            role,
        };
        self.sessions
            .lock()
            .map_err(|_| AuthError::SessionsUnavailable)?
            .insert(session.token.clone(), session.clone());
        Ok(session)
    }

    pub fn get(&self, token: &str) -> Result<Option<Session>, AuthError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|_| AuthError::SessionsUnavailable)?;
        Ok(guard.get(token).cloned())
    }

    /// Returns whether a session was removed.
    pub fn close(&self, token: &str) -> Result<bool, AuthError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|_| AuthError::SessionsUnavailable)?;
        Ok(guard.remove(token).is_some())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid role")]
    InvalidRole(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing or unknown session token")]
    Unauthenticated,
    #[error("access denied: {required} role required")]
    Forbidden { required: Role },
    #[error("session store unavailable")]
    SessionsUnavailable,
}
