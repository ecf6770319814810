/// Consumption frontier of a topic: the lowest sequence number not yet
/// acknowledged.
///
/// The frontier only moves forward. Acknowledging anything at or past it sets
/// it to one past the acknowledged sequence number, so out-of-order
/// acknowledgments resolve to the highest one seen.
#[derive(Debug, Default)]
pub(crate) struct ConsumptionTracker {
    frontier: u64,
}

impl ConsumptionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frontier(&self) -> u64 {
        self.frontier
    }

    /// Returns how many sequence numbers the frontier advanced by.
    pub fn acknowledge(&mut self, sqn: u64) -> u64 {
        if sqn < self.frontier {
            return 0;
        }
        let advanced = sqn - self.frontier + 1;
        self.frontier = sqn + 1;
        advanced
    }

    /// Acknowledge `start..=end`. Only the upper bound moves the frontier.
    pub fn acknowledge_range(&mut self, start: u64, end: u64) -> u64 {
        debug_assert!(start <= end);
        self.acknowledge(end)
    }
}
