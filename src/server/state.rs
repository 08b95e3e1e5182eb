use tokio::sync::{watch, Mutex};

/// Shared outcome of one authorization flow.
///
/// The token is written at most once, by the auth handler. `completed` flips
/// to true exactly once, from a terminal page, and never reverts.
///
/// `stopping` is the server-wide shutdown signal. Completion raises it, and so
/// does the server deadline, which leaves `completed` false.
#[derive(Debug)]
pub struct ExchangeState {
    access_token: Mutex<String>,
    completed: watch::Sender<bool>,
    stopping: watch::Sender<bool>,
}

fn raise(flag: &mut bool) -> bool {
    if *flag {
        false
    } else {
        *flag = true;
        true
    }
}

impl ExchangeState {
    pub fn new() -> Self {
        let (completed, _) = watch::channel(false);
        let (stopping, _) = watch::channel(false);
        Self {
            access_token: Mutex::new(String::new()),
            completed,
            stopping,
        }
    }

    /// Store the exchanged token. Returns false if a token was already set,
    /// in which case the stored one is kept.
    pub async fn store_token(&self, token: String) -> bool {
        let mut current = self.access_token.lock().await;
        if !current.is_empty() {
            return false;
        }
        *current = token;
        true
    }

    pub async fn access_token(&self) -> String {
        self.access_token.lock().await.clone()
    }

    /// Mark the flow as finished. Returns true only for the call that
    /// actually flipped the flag.
    pub fn complete(&self) -> bool {
        let flipped = self.completed.send_if_modified(raise);
        self.stop();
        flipped
    }

    /// Ask every connection still waiting for a request to close. Returns true
    /// only for the call that raised the signal.
    pub fn stop(&self) -> bool {
        self.stopping.send_if_modified(raise)
    }

    pub fn is_stopping(&self) -> bool {
        *self.stopping.borrow()
    }

    pub fn is_completed(&self) -> bool {
        *self.completed.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.completed.subscribe()
    }

    /// resolves once `complete` has been called (immediately if it already was)
    pub async fn wait_completed(&self) {
        let mut rx = self.subscribe();
        // the sender lives in `self`, so the channel cannot close under us
        let _ = rx.wait_for(|done| *done).await;
    }

    /// resolves once the server is shutting down, for whatever reason
    pub async fn wait_stopping(&self) {
        let mut rx = self.stopping.subscribe();
        let _ = rx.wait_for(|stopping| *stopping).await;
    }
}

impl Default for ExchangeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_new_state_is_empty() {
        let state = ExchangeState::new();
        assert_eq!(state.access_token().await, "");
        assert!(!state.is_completed());
        assert!(!state.is_stopping());
    }

    #[tokio::test]
    async fn test_token_is_written_once() {
        let state = ExchangeState::new();

        assert!(state.store_token("first".to_string()).await);
        assert!(!state.store_token("second".to_string()).await);
        assert_eq!(state.access_token().await, "first");
    }

    #[test]
    fn test_complete_flips_exactly_once() {
        let state = ExchangeState::new();

        assert!(state.complete());
        assert!(!state.complete());
        assert!(state.is_completed());
    }

    #[tokio::test]
    async fn test_wait_completed_wakes_waiter() {
        let state = Arc::new(ExchangeState::new());

        let waiter = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.wait_completed().await })
        };

        tokio::task::yield_now().await;
        state.complete();

        timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_completed_returns_if_already_done() {
        let state = ExchangeState::new();
        state.complete();

        timeout(Duration::from_millis(100), state.wait_completed())
            .await
            .unwrap();
    }

    #[test]
    fn test_complete_also_stops() {
        let state = ExchangeState::new();

        state.complete();

        assert!(state.is_stopping());
        assert!(!state.stop());
    }

    #[tokio::test]
    async fn test_stop_without_completion() {
        let state = Arc::new(ExchangeState::new());

        let waiter = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.wait_stopping().await })
        };

        tokio::task::yield_now().await;
        assert!(state.stop());
        assert!(!state.stop());

        timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(!state.is_completed());
    }
}
