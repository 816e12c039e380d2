//! Start/stop bookkeeping for the poll loop.
//!
//! At most one loop runs per client. Each start hands the loop a fresh
//! [`CancellationToken`]; stop cancels it exactly once. The running flag and
//! token live behind their own lock, separate from the handler registry.

use async_lock::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

/// Whether a poll loop is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No loop running.
    Idle,

    /// A loop has been started and not yet stopped.
    Running,
}

#[derive(Debug)]
struct State {
    running: bool,
    cancel: CancellationToken,
    generation: u64,
}

/// Mediates connect/disconnect so only one loop instance exists at a time.
#[derive(Debug)]
pub struct Lifecycle {
    state: Mutex<State>,
}

/// Handed to a freshly started loop.
#[derive(Debug, Clone)]
pub struct Cycle {
    /// Cancelled when the loop should exit.
    pub cancel: CancellationToken,

    /// Identifies this start, so a loop that gives up on its own can only
    /// reset the cycle it belongs to.
    pub generation: u64,
}

impl Lifecycle {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                running: false,
                cancel: CancellationToken::new(),
                generation: 0,
            }),
        }
    }

    /// Transition `Idle` → `Running`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AlreadyRunning`] without changing state if a
    /// loop is already active.
    pub async fn start(&self) -> Result<Cycle, ClientError> {
        let mut state = self.state.lock().await;
        if state.running {
            return Err(ClientError::AlreadyRunning);
        }

        state.running = true;
        state.generation += 1;
        state.cancel = CancellationToken::new();

        Ok(Cycle {
            cancel: state.cancel.clone(),
            generation: state.generation,
        })
    }

    /// Transition `Running` → `Idle`, signalling cancellation once.
    ///
    /// Returns whether a loop was running. Calling this while idle does
    /// nothing.
    pub async fn stop(&self) -> bool {
        let mut state = self.state.lock().await;
        if !state.running {
            return false;
        }

        state.cancel.cancel();
        state.running = false;
        true
    }

    /// Called by a loop that exits without being stopped.
    ///
    /// Only resets state if `generation` is still the current cycle.
    pub async fn finish(&self, generation: u64) {
        let mut state = self.state.lock().await;
        if state.running && state.generation == generation {
            state.cancel.cancel();
            state.running = false;
        }
    }

    /// Current state.
    pub async fn state(&self) -> LoopState {
        if self.state.lock().await.running {
            LoopState::Running
        } else {
            LoopState::Idle
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_idle() {
        assert_eq!(Lifecycle::new().state().await, LoopState::Idle);
    }

    #[tokio::test]
    async fn second_start_is_rejected_without_side_effects() {
        let lifecycle = Lifecycle::new();
        let cycle = lifecycle.start().await;
        assert!(cycle.is_ok());

        let again = lifecycle.start().await;
        assert!(matches!(again, Err(ClientError::AlreadyRunning)));
        assert_eq!(lifecycle.state().await, LoopState::Running);
        assert!(cycle.is_ok_and(|c| !c.cancel.is_cancelled()));
    }

    #[tokio::test]
    async fn stop_cancels_once() {
        let lifecycle = Lifecycle::new();
        let Ok(cycle) = lifecycle.start().await else {
            unreachable!("idle controller must start");
        };

        assert!(lifecycle.stop().await);
        assert!(cycle.cancel.is_cancelled());
        assert!(!lifecycle.stop().await);
        assert_eq!(lifecycle.state().await, LoopState::Idle);
    }

    #[tokio::test]
    async fn stop_while_idle_is_a_no_op() {
        let lifecycle = Lifecycle::new();
        assert!(!lifecycle.stop().await);
        assert_eq!(lifecycle.state().await, LoopState::Idle);
    }

    #[tokio::test]
    async fn restart_gets_a_fresh_token() {
        let lifecycle = Lifecycle::new();
        let Ok(first) = lifecycle.start().await else {
            unreachable!("idle controller must start");
        };
        lifecycle.stop().await;

        let Ok(second) = lifecycle.start().await else {
            unreachable!("stopped controller must restart");
        };
        assert!(first.cancel.is_cancelled());
        assert!(!second.cancel.is_cancelled());
        assert_ne!(first.generation, second.generation);
    }

    #[tokio::test]
    async fn stale_finish_does_not_stop_newer_cycle() {
        let lifecycle = Lifecycle::new();
        let Ok(first) = lifecycle.start().await else {
            unreachable!("idle controller must start");
        };
        lifecycle.stop().await;
        let Ok(second) = lifecycle.start().await else {
            unreachable!("stopped controller must restart");
        };

        lifecycle.finish(first.generation).await;
        assert_eq!(lifecycle.state().await, LoopState::Running);

        lifecycle.finish(second.generation).await;
        assert_eq!(lifecycle.state().await, LoopState::Idle);
        assert!(second.cancel.is_cancelled());
    }
}
