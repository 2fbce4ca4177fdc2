use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// Time source for the single-threaded capture loop.
///
/// Times are offsets from the clock's origin.
pub trait Clock {
    /// Current offset from the origin.
    fn now(&self) -> Duration;

    /// Block the loop until `deadline` (no-op if already past).
    fn wait_until(&mut self, deadline: Duration);
}

/// Wall-clock time.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wait_until(&mut self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Virtual time that jumps straight to each deadline.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    /// Clock at offset zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `by`.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn wait_until(&mut self, deadline: Duration) {
        if deadline > self.now {
            self.now = deadline;
        }
    }
}

/// Handle returned when scheduling a timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Deadline-ordered queue of one-shot timers.
///
/// Timers with equal deadlines fire in scheduling order.
#[derive(Debug)]
pub(crate) struct TimerQueue<K> {
    next_id: u64,
    heap: BinaryHeap<Reverse<(Duration, TimerId, K)>>,
}

impl<K: Ord> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            next_id: 0,
            heap: BinaryHeap::new(),
        }
    }
}

impl<K: Ord + Copy> TimerQueue<K> {
    pub(crate) fn schedule(&mut self, deadline: Duration, kind: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.heap.push(Reverse((deadline, id, kind)));
        id
    }

    pub(crate) fn pop(&mut self) -> Option<(Duration, TimerId, K)> {
        self.heap.pop().map(|Reverse(entry)| entry)
    }

    pub(crate) fn clear(&mut self) -> usize {
        let n = self.heap.len();
        self.heap.clear();
        n
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/clock.rs"]
mod tests;
