//! Session token holder shared by the repository and its callers.
//!
//! # Design
//! The token is the only shared mutable state in the client. It is read by
//! every authenticated call and written only by login, register and logout,
//! so a plain `RwLock` is enough; writes are last-writer-wins. Clones share
//! the same slot.

use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bearer token, if logged in.
    pub fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
        tracing::debug!("session token set");
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        tracing::debug!("session token cleared");
    }

    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let session = Session::new();
        assert!(session.get().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn set_then_clear() {
        let session = Session::new();
        session.set("abc");
        assert_eq!(session.get().as_deref(), Some("abc"));
        assert!(session.is_authenticated());
        session.clear();
        assert!(session.get().is_none());
    }

    #[test]
    fn clones_share_the_token() {
        let session = Session::new();
        let other = session.clone();
        session.set("first");
        assert_eq!(other.get().as_deref(), Some("first"));
        other.set("second");
        assert_eq!(session.get().as_deref(), Some("second"));
    }
}
