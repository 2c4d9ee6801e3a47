//! Authenticated session passed explicitly to the controllers that need it.
//!
//! ```text
//! Absent ──resolve()──> Resolved(identity) ──sign_out()──> Cleared
//!                              ▲                             │
//!                              └─────────resolve()───────────┘
//! ```

use tokio::sync::watch;

/// The authenticated user's unique reference (their email address).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn new(identity: impl Into<String>) -> Self {
        Identity(identity.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Authentication has not resolved yet.
    Absent,
    /// A user is signed in.
    Resolved(Identity),
    /// The user signed out.
    Cleared,
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Resolved(identity) => Some(identity),
            SessionState::Absent | SessionState::Cleared => None,
        }
    }
}

/// Owner of the session state. Controllers observe it through [`Session::subscribe`].
#[derive(Debug)]
pub struct Session {
    state: watch::Sender<SessionState>,
}

impl Session {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Absent);
        Self { state }
    }

    /// Sign `identity` in, notifying subscribers.
    pub fn resolve(&self, identity: Identity) {
        tracing::info!(identity = %identity, "Session resolved");
        self.state.send_replace(SessionState::Resolved(identity));
    }

    /// Sign the current user out, notifying subscribers.
    pub fn sign_out(&self) {
        tracing::info!("Session cleared");
        self.state.send_replace(SessionState::Cleared);
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Absent);
        assert_eq!(session.identity(), None);

        session.resolve(Identity::new("donor@example.com"));
        assert_eq!(
            session.identity(),
            Some(Identity::new("donor@example.com"))
        );

        session.sign_out();
        assert_eq!(session.state(), SessionState::Cleared);
        assert_eq!(session.identity(), None);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let session = Session::new();
        let mut rx = session.subscribe();

        session.resolve(Identity::new("a@example.com"));
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().identity(),
            Some(&Identity::new("a@example.com"))
        );
    }
}
