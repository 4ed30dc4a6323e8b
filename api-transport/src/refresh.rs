// api-transport/src/refresh.rs
use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::TransportError;
use crate::types::{CallRequest, ResponseEnvelope};

pub type CallOutcome = Result<ResponseEnvelope, TransportError>;

/// Call parked behind an in-flight refresh
#[derive(Debug)]
pub struct PendingCall {
    pub request: CallRequest,
    pub reply: oneshot::Sender<CallOutcome>,
}

#[derive(Debug, Default)]
enum RefreshState {
    #[default]
    Idle,
    Refreshing { queue: VecDeque<PendingCall> },
}

/// Outcome of parking a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First call of the cycle; must start the refresh task that drains the queue
    Leader,
    /// A refresh is already in flight
    Queued,
}

/// Idle/Refreshing state machine with its FIFO queue.
///
/// The queue only exists inside `Refreshing`, so it is empty whenever the
/// coordinator is idle. The lock is never held across an await.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, call: PendingCall) -> Admission {
        let mut state = self.state.lock();
        match &mut *state {
            RefreshState::Idle => {
                *state = RefreshState::Refreshing {
                    queue: VecDeque::from([call]),
                };
                Admission::Leader
            }
            RefreshState::Refreshing { queue } => {
                queue.push_back(call);
                Admission::Queued
            }
        }
    }

    /// End the cycle: back to idle, handing over every parked call in arrival order
    pub fn finish(&self) -> VecDeque<PendingCall> {
        match std::mem::take(&mut *self.state.lock()) {
            RefreshState::Idle => VecDeque::new(),
            RefreshState::Refreshing { queue } => queue,
        }
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock(), RefreshState::Refreshing { .. })
    }

    pub fn pending(&self) -> usize {
        match &*self.state.lock() {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { queue } => queue.len(),
        }
    }
}
