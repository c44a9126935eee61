//! Active workspace credential. One instance per process, shared via `Arc`.
//!
//! Reactive consumers subscribe; guards and adapters read the synchronous snapshot.

use crate::ports::TokenSource;
use crate::usecases::view::View;
use tokio::sync::watch;
use tracing::debug;

pub struct TokenStore {
    state: watch::Sender<Option<String>>,
}

impl TokenStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self { state }
    }

    pub fn set_token(&self, token: Option<String>) {
        debug!(present = token.is_some(), "workspace token updated");
        self.state.send_replace(token);
    }

    pub fn clear(&self) {
        self.set_token(None);
    }

    pub fn snapshot(&self) -> Option<String> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> View<Option<String>> {
        View::new(self.state.subscribe())
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSource for TokenStore {
    fn current_token(&self) -> Option<String> {
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_see_overwrites() {
        let store = TokenStore::new();
        let mut view = store.subscribe();
        assert_eq!(view.snapshot(), None);

        store.set_token(Some("abc".into()));
        assert_eq!(view.changed().await, Some(Some("abc".into())));
        assert_eq!(store.snapshot().as_deref(), Some("abc"));

        store.clear();
        assert_eq!(view.changed().await, Some(None));
        assert_eq!(store.current_token(), None);
    }
}
