// ==============================================================================
// timers.rs — DEFERRED ONE-SHOT ACTIONS KEYED BY SLOT
// ------------------------------------------------------------------------------
// - schedule(slot, delay): arms the slot, no-op if it is already pending
// - cancel(slot)          : drops it
// - advance(dt)           : counts every pending slot down and returns the
//                           ones that fired, in the order they were scheduled
//
// Nothing here runs callbacks; the owner matches on the fired slots.
// ==============================================================================

/// Debounce slots used by the grounded / airborne controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    EnterAir,
    FloorReset,
}

#[derive(Debug, Clone)]
pub struct DeferredActions<S> {
    pending: Vec<(S, f32)>,
}

impl<S> Default for DeferredActions<S> {
    fn default() -> Self {
        Self { pending: Vec::new() }
    }
}

impl<S: Copy + PartialEq> DeferredActions<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the slot was newly armed.
    pub fn schedule(&mut self, slot: S, delay: f32) -> bool {
        if self.exists(slot) {
            return false;
        }
        self.pending.push((slot, delay.max(0.0)));
        true
    }

    /// Returns true when a pending slot was dropped.
    pub fn cancel(&mut self, slot: S) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(s, _)| *s != slot);
        before != self.pending.len()
    }

    pub fn exists(&self, slot: S) -> bool {
        self.pending.iter().any(|(s, _)| *s == slot)
    }

    pub fn remaining(&self, slot: S) -> Option<f32> {
        self.pending.iter().find(|(s, _)| *s == slot).map(|(_, t)| *t)
    }

    pub fn advance(&mut self, dt: f32) -> Vec<S> {
        let mut fired = Vec::new();
        self.pending.retain_mut(|(slot, left)| {
            *left -= dt;
            if *left <= 0.0 {
                fired.push(*slot);
                false
            } else {
                true
            }
        });
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduling_a_pending_slot_keeps_the_first_deadline() {
        let mut timers = DeferredActions::new();
        assert!(timers.schedule(TimerSlot::EnterAir, 0.9));
        timers.advance(0.5);
        assert!(!timers.schedule(TimerSlot::EnterAir, 0.9));
        assert!((timers.remaining(TimerSlot::EnterAir).unwrap() - 0.4).abs() < 1e-5);
    }

    #[test]
    fn fires_once_then_forgets() {
        let mut timers = DeferredActions::new();
        timers.schedule(TimerSlot::FloorReset, 1.0);
        assert!(timers.advance(0.6).is_empty());
        assert_eq!(timers.advance(0.6), vec![TimerSlot::FloorReset]);
        assert!(timers.advance(5.0).is_empty());
        assert!(!timers.exists(TimerSlot::FloorReset));
    }

    #[test]
    fn cancel_drops_only_that_slot() {
        let mut timers = DeferredActions::new();
        timers.schedule(TimerSlot::EnterAir, 0.9);
        timers.schedule(TimerSlot::FloorReset, 1.0);
        assert!(timers.cancel(TimerSlot::EnterAir));
        assert!(!timers.cancel(TimerSlot::EnterAir));
        assert!(timers.exists(TimerSlot::FloorReset));
    }
}
