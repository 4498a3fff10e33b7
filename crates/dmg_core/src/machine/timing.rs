use std::time::{Duration, Instant};

/// DMG master clock in T-cycles per second.
pub const CPU_HZ: u64 = 4_194_304;

/// Cycle bookkeeping for the step loop.
///
/// `target` is the total cost of everything executed so far; `counter` is
/// how far the tick source has caught up. The run loop only fetches the
/// next instruction once a scheduler has settled the difference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    counter: u64,
    target: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    /// Record the cost of an executed instruction.
    pub fn charge(&mut self, cycles: u32) {
        self.target += cycles as u64;
    }

    /// Move the tick counter forward, never past `target`.
    pub fn advance(&mut self, cycles: u64) {
        self.counter = (self.counter + cycles).min(self.target);
    }

    /// Cycles executed but not yet covered by the tick source.
    pub fn owed(&self) -> u64 {
        self.target.saturating_sub(self.counter)
    }
}

/// Settles the cycles an instruction owes before the next one may run.
pub trait Scheduler {
    fn settle(&mut self, clock: &mut Clock);
}

/// Runs as fast as the host allows; owed cycles are settled at once.
#[derive(Clone, Copy, Debug, Default)]
pub struct VirtualClock;

impl Scheduler for VirtualClock {
    fn settle(&mut self, clock: &mut Clock) {
        clock.advance(clock.owed());
    }
}

/// Paces execution against the wall clock at `CPU_HZ`.
///
/// Sleeps are batched: the thread only sleeps once at least `quantum`
/// cycles of lead have built up, since a single instruction is far below
/// sleep granularity.
#[derive(Clone, Debug)]
pub struct RealtimeClock {
    quantum: u64,
    origin: Option<(Instant, u64)>,
    unslept: u64,
}

impl Default for RealtimeClock {
    fn default() -> Self {
        // About one scanline.
        Self::new(456)
    }
}

impl RealtimeClock {
    pub fn new(quantum: u64) -> Self {
        Self {
            quantum: quantum.max(1),
            origin: None,
            unslept: 0,
        }
    }

    /// Forget the wall-clock anchor, e.g. after the run loop was paused.
    pub fn rebase(&mut self) {
        self.origin = None;
        self.unslept = 0;
    }
}

pub(crate) fn cycles_to_duration(cycles: u64) -> Duration {
    Duration::from_nanos(cycles.saturating_mul(1_000_000_000) / CPU_HZ)
}

impl Scheduler for RealtimeClock {
    fn settle(&mut self, clock: &mut Clock) {
        let owed = clock.owed();
        let (origin, base) = *self
            .origin
            .get_or_insert_with(|| (Instant::now(), clock.counter()));
        clock.advance(owed);

        self.unslept += owed;
        if self.unslept < self.quantum {
            return;
        }
        self.unslept = 0;

        let due = origin + cycles_to_duration(clock.counter() - base);
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }
    }
}
