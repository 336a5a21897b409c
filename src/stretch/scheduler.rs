use std::collections::VecDeque;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// What caused a stretch pass to be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    MOUNT,
    VISIBILITY,
    SORT,
    FILTER,
    PAGE,
}

/// A stretch pass waiting for its tick.
#[derive(Debug, Clone)]
pub struct PendingPass {
    pub id: u64,
    pub trigger: Trigger,
    /// Ticks this pass already waited for rows.
    pub attempts: usize,
    cancel: CancellationToken,
}

impl PendingPass {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Decision for a pass whose tick has come.
#[derive(Debug, PartialEq, Eq)]
pub enum Readiness {
    /// Rows are there, or the data source is declared empty.
    READY,
    /// Nothing rendered yet, try again next tick.
    WAIT,
    /// Waited `poll_limit` ticks without rows.
    EXHAUSTED,
}

pub fn readiness(rendered_rows: usize, row_count: Option<usize>, attempts: usize, poll_limit: usize) -> Readiness {
    if rendered_rows > 0 || row_count == Some(0) {
        Readiness::READY
    } else if attempts + 1 >= poll_limit {
        Readiness::EXHAUSTED
    } else {
        Readiness::WAIT
    }
}

/// Zero-delay deferral queue driven by the host's draw loop.
///
/// Work queued while handling an event runs on the next `take_due`, which the
/// host calls after it finished drawing. Passes keep their arrival order,
/// also when they are requeued to wait for rows.
#[derive(Debug)]
pub struct TickQueue {
    pending: VecDeque<PendingPass>,
    lifetime: CancellationToken,
    next_id: u64,
}

impl Default for TickQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TickQueue {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            lifetime: CancellationToken::new(),
            next_id: 0,
        }
    }

    pub fn defer(&mut self, trigger: Trigger) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        trace!("Deferring stretch pass {id} ({trigger:?})");
        self.pending.push_back(PendingPass {
            id,
            trigger,
            attempts: 0,
            cancel: self.lifetime.child_token(),
        });
        id
    }

    /// Puts a pass back for the next tick.
    pub fn requeue(&mut self, mut pass: PendingPass) {
        pass.attempts += 1;
        self.pending.push_back(pass);
    }

    /// Everything queued before this tick, oldest first. Cancelled passes are
    /// dropped here.
    pub fn take_due(&mut self) -> Vec<PendingPass> {
        self.pending
            .drain(..)
            .filter(|pass| {
                if pass.is_cancelled() {
                    debug!("Dropping cancelled stretch pass {}", pass.id);
                    false
                } else {
                    true
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Cancels every queued pass. Later `defer` calls are cancelled right
    /// away as well.
    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            warn!("Cancelling {} outstanding stretch passes", self.pending.len());
        }
        self.lifetime.cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.lifetime.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness_rules() {
        assert_eq!(readiness(3, None, 0, 10), Readiness::READY);
        assert_eq!(readiness(0, Some(0), 0, 10), Readiness::READY);
        assert_eq!(readiness(0, Some(5), 0, 10), Readiness::WAIT);
        assert_eq!(readiness(0, None, 8, 10), Readiness::WAIT);
        assert_eq!(readiness(0, None, 9, 10), Readiness::EXHAUSTED);
    }

    #[test]
    fn take_due_keeps_arrival_order() {
        let mut queue = TickQueue::new();
        queue.defer(Trigger::MOUNT);
        queue.defer(Trigger::SORT);
        let due = queue.take_due();
        assert!(queue.is_empty());
        let triggers: Vec<_> = due.iter().map(|p| p.trigger).collect();
        assert_eq!(triggers, vec![Trigger::MOUNT, Trigger::SORT]);

        for pass in due {
            queue.requeue(pass);
        }
        queue.defer(Trigger::PAGE);
        let ids: Vec<_> = queue.take_due().iter().map(|p| (p.id, p.attempts)).collect();
        assert_eq!(ids, vec![(0, 1), (1, 1), (2, 0)]);
    }

    #[test]
    fn cancel_all_drops_pending_and_future_passes() {
        let mut queue = TickQueue::new();
        queue.defer(Trigger::FILTER);
        queue.cancel_all();
        queue.defer(Trigger::PAGE);
        assert_eq!(queue.len(), 2);
        assert!(queue.take_due().is_empty());
        assert!(queue.is_torn_down());
    }
}
