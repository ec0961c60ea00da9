//! Recording observer.

use std::cell::RefCell;
use std::rc::Rc;

use armtable_kinematics::{ArmEvent, ArmObserver};

/// Observer that appends every event to a shared log.
///
/// Clones share the same log, so keep one clone and hand the other to
/// [`ArmController::subscribe`](armtable_kinematics::ArmController::subscribe).
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Rc<RefCell<Vec<ArmEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<ArmEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Number of `JointTurned` events.
    pub fn turned_count(&self) -> usize {
        self.count(|e| matches!(e, ArmEvent::JointTurned { .. }))
    }

    /// Number of `Moved` events.
    pub fn moved_count(&self) -> usize {
        self.count(|e| matches!(e, ArmEvent::Moved { .. }))
    }

    /// Number of `Initialized` events.
    pub fn initialized_count(&self) -> usize {
        self.count(|e| matches!(e, ArmEvent::Initialized { .. }))
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn count(&self, pred: impl Fn(&ArmEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }
}

impl ArmObserver for RecordingObserver {
    fn notify(&mut self, event: &ArmEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armtable_kinematics::ArmController;

    #[test]
    fn clones_share_the_log() {
        let recorder = RecordingObserver::new();
        let mut controller = ArmController::with_defaults();
        controller.subscribe(recorder.clone());
        controller.initialize_arm().unwrap();

        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.initialized_count(), 1);
        recorder.clear();
        assert!(recorder.is_empty());
    }
}
