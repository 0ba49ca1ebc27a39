//! Single-form submission state with auto-expiring success.
//!
//! A successful submit shows as "saved" for a short while and then reverts
//! on its own. The revert is driven by a [`SuccessExpiry`] the caller runs on
//! its runtime; any later state change supersedes it, both by cancelling its
//! token and by bumping the tracker's generation so a timer that already
//! fired is ignored when it is finally applied.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const DEFAULT_SUCCESS_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitState {
    pub is_submitting: bool,
    pub error: Option<String>,
    pub success: bool,
}

#[derive(Debug)]
pub struct SubmitTracker {
    state: SubmitState,
    generation: u64,
    pending: Option<CancellationToken>,
    success_ttl: Duration,
}

impl Default for SubmitTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_TTL)
    }
}

impl SubmitTracker {
    pub fn new(success_ttl: Duration) -> Self {
        Self {
            state: SubmitState::default(),
            generation: 0,
            pending: None,
            success_ttl,
        }
    }

    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.state.success
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Invalidate whatever expiry is outstanding.
    fn supersede(&mut self) {
        self.generation += 1;
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    pub fn start_submitting(&mut self) {
        self.supersede();
        self.state = SubmitState {
            is_submitting: true,
            error: None,
            success: false,
        };
    }

    /// Finish the current submit. Without an error the form is marked
    /// successful and the returned expiry should be driven to clear it.
    #[must_use = "the success flag only expires if the returned expiry is awaited"]
    pub fn stop_submitting(&mut self, error: Option<String>) -> Option<SuccessExpiry> {
        self.supersede();
        self.state.is_submitting = false;
        match error {
            Some(message) => {
                self.state.error = Some(message);
                self.state.success = false;
                None
            }
            None => {
                self.state.error = None;
                self.state.success = true;
                let token = CancellationToken::new();
                self.pending = Some(token.clone());
                Some(SuccessExpiry {
                    generation: self.generation,
                    after: self.success_ttl,
                    cancel: token,
                })
            }
        }
    }

    pub fn clear(&mut self) {
        self.supersede();
        self.state = SubmitState::default();
    }

    /// Apply a fired expiry. Returns false and changes nothing when a newer
    /// call has superseded the expiry's generation.
    pub fn expire(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "discarding stale success expiry"
            );
            return false;
        }
        self.pending = None;
        self.state.success = false;
        true
    }
}

/// Pending auto-expiry of a submit success.
#[derive(Debug)]
pub struct SuccessExpiry {
    generation: u64,
    after: Duration,
    cancel: CancellationToken,
}

impl SuccessExpiry {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn after(&self) -> Duration {
        self.after
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Sleep for the expiry delay. Resolves to the generation to pass to
    /// [`SubmitTracker::expire`], or `None` if superseded meanwhile.
    pub async fn wait(self) -> Option<u64> {
        tokio::select! {
            _ = self.cancel.cancelled() => None,
            _ = tokio::time::sleep(self.after) => Some(self.generation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_resets_state() {
        let mut t = SubmitTracker::default();
        let _ = t.stop_submitting(Some("nope".to_string()));
        t.start_submitting();
        assert_eq!(
            t.state(),
            &SubmitState {
                is_submitting: true,
                error: None,
                success: false,
            }
        );
    }

    #[test]
    fn stop_with_error_has_no_expiry() {
        let mut t = SubmitTracker::default();
        t.start_submitting();
        let expiry = t.stop_submitting(Some("server said no".to_string()));
        assert!(expiry.is_none());
        assert!(!t.is_submitting());
        assert!(!t.is_success());
        assert_eq!(t.error(), Some("server said no"));
    }

    #[test]
    fn expire_clears_success() {
        let mut t = SubmitTracker::default();
        t.start_submitting();
        let expiry = t.stop_submitting(None).unwrap();
        assert!(t.is_success());
        assert_eq!(expiry.after(), DEFAULT_SUCCESS_TTL);
        assert!(t.expire(expiry.generation()));
        assert!(!t.is_success());
    }

    #[test]
    fn restart_supersedes_pending_expiry() {
        let mut t = SubmitTracker::default();
        t.start_submitting();
        let expiry = t.stop_submitting(None).unwrap();
        t.start_submitting();
        assert!(expiry.is_cancelled());

        let second = t.stop_submitting(None).unwrap();
        assert!(!t.expire(expiry.generation()));
        assert!(t.is_success());
        assert!(t.expire(second.generation()));
    }

    #[test]
    fn clear_supersedes_pending_expiry() {
        let mut t = SubmitTracker::default();
        let expiry = t.stop_submitting(None).unwrap();
        t.clear();
        assert!(expiry.is_cancelled());
        assert_eq!(t.state(), &SubmitState::default());
        assert!(!t.expire(expiry.generation()));
    }

    #[test]
    fn stale_expiry_does_not_touch_later_error() {
        let mut t = SubmitTracker::default();
        let expiry = t.stop_submitting(None).unwrap();
        t.start_submitting();
        let _ = t.stop_submitting(Some("failed".to_string()));
        assert!(!t.expire(expiry.generation()));
        assert_eq!(t.error(), Some("failed"));
    }

    #[test]
    fn error_after_success_drops_success() {
        let mut t = SubmitTracker::default();
        t.start_submitting();
        let expiry = t.stop_submitting(None).unwrap();
        let _ = t.stop_submitting(Some("boom".to_string()));

        assert!(expiry.is_cancelled());
        assert!(!t.expire(expiry.generation()));
        assert_eq!(
            t.state(),
            &SubmitState {
                is_submitting: false,
                error: Some("boom".to_string()),
                success: false,
            }
        );
    }

    #[test]
    fn success_after_error_drops_error() {
        let mut t = SubmitTracker::default();
        let _ = t.stop_submitting(Some("boom".to_string()));
        let _expiry = t.stop_submitting(None).unwrap();
        assert!(t.is_success());
        assert_eq!(t.error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_fires_after_ttl() {
        let mut t = SubmitTracker::new(Duration::from_millis(3000));
        t.start_submitting();
        let expiry = t.stop_submitting(None).unwrap();

        let started = tokio::time::Instant::now();
        let generation = expiry.wait().await;
        assert!(started.elapsed() >= Duration::from_millis(3000));

        assert!(t.expire(generation.unwrap()));
        assert!(!t.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_expiry_resolves_to_none() {
        let mut t = SubmitTracker::default();
        let expiry = t.stop_submitting(None).unwrap();
        let handle = tokio::spawn(expiry.wait());

        tokio::time::sleep(Duration::from_millis(1000)).await;
        t.start_submitting();

        assert_eq!(handle.await.unwrap(), None);
        assert!(t.is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_then_start_leaves_no_residual_expiry() {
        let mut t = SubmitTracker::default();
        t.start_submitting();
        let first = t.stop_submitting(None).unwrap();
        t.start_submitting();

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(first.wait().await, None);

        let second = t.stop_submitting(None).unwrap();
        assert!(t.is_success());
        let generation = second.wait().await.unwrap();
        assert!(t.expire(generation));
        assert!(!t.is_success());
    }
}
