// src/feed/trigger.rs
// =============================================================================
// Infinite scroll for a terminal.
//
// A browser would watch the last feed entry and refill when it scrolls into
// view. Here the reader "scrolls" by asking for more (pressing Enter), and
// the trigger applies the same rule: refill when the last entry is the one
// in view and no refill is already running. An empty feed shows a
// placeholder line instead, which counts as the last entry.
// =============================================================================

#[derive(Debug, Default)]
pub struct ScrollTrigger {
    fired: usize,
}

impl ScrollTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called whenever entry `visible_index` comes into view. Returns true
    /// when a refill should start.
    pub fn observe(&mut self, visible_index: usize, feed_len: usize, loading: bool) -> bool {
        if loading {
            return false;
        }

        let last = feed_len.saturating_sub(1);
        if visible_index != last {
            return false;
        }

        self.fired += 1;
        true
    }

    /// How many refills this trigger has started.
    pub fn fired(&self) -> usize {
        self.fired
    }
}
