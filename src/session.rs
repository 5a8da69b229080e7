use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cart::Cart;
use crate::checkout::CheckoutFlow;

/// Everything owned by one browsing session: its cart and its checkout
/// flow. Created on first touch, dropped with the map entry.
#[derive(Debug, Default)]
pub struct SessionState {
    pub cart: Cart,
    pub flow: CheckoutFlow,
}

/// Session registry keyed by the opaque id the client sends in
/// `x-session-id`. One writer per session by construction (a session is a
/// single browser); the lock only guards the map across sessions.
#[derive(Clone, Default)]
pub struct Sessions {
    inner: Arc<RwLock<HashMap<String, SessionState>>>,
}

impl Sessions {
    /// Run `f` against the session's state, creating it if this is the
    /// session's first request.
    pub async fn with<T>(&self, session_id: &str, f: impl FnOnce(&mut SessionState) -> T) -> T {
        let mut map = self.inner.write().await;
        let state = map.entry(session_id.to_string()).or_default();
        f(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[tokio::test]
    async fn sessions_are_isolated_from_each_other() {
        let sessions = Sessions::default();
        let tee = Catalog::seeded().get("optimus-prime").cloned().unwrap();

        sessions
            .with("session-a", |s| s.cart.add_item(tee.clone(), "L"))
            .await;

        let a_items = sessions.with("session-a", |s| s.cart.total_items()).await;
        let b_items = sessions.with("session-b", |s| s.cart.total_items()).await;
        assert_eq!(a_items, 1);
        assert_eq!(b_items, 0);
    }
}
