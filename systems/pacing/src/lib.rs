#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Converts a continuous speed multiplier into per-tick operation counts.
//!
//! The outer loop ticks at a fixed rate. A speed of `2.5` means two and a half
//! algorithm steps per tick on average, so the schedule alternates between
//! two and three operations and the fractional part is spread evenly across
//! the cycle. Index the schedule with `tick % schedule.len()`.

use std::ops::RangeInclusive;

/// Default number of ticks in one schedule cycle.
pub const TICKS_PER_SECOND: usize = 60;

/// Speeds offered to the user, in steps per tick.
pub const SPEED_RANGE: RangeInclusive<f64> = 0.01..=30.0;

/// Distributes `speed` across a cycle of [`TICKS_PER_SECOND`] ticks.
#[must_use]
pub fn schedule(speed: f64) -> [u32; TICKS_PER_SECOND] {
    let mut slots = [0; TICKS_PER_SECOND];
    fill(speed, &mut slots);
    slots
}

/// Distributes `speed` across a cycle of `ticks` ticks.
#[must_use]
pub fn schedule_with(speed: f64, ticks: usize) -> Vec<u32> {
    let mut slots = vec![0; ticks];
    fill(speed, &mut slots);
    slots
}

/// Clamps a requested speed into [`SPEED_RANGE`].
///
/// Non-finite requests fall back to the slowest speed.
#[must_use]
pub fn clamp_speed(speed: f64) -> f64 {
    if speed.is_finite() {
        speed.clamp(*SPEED_RANGE.start(), *SPEED_RANGE.end())
    } else {
        *SPEED_RANGE.start()
    }
}

fn fill(speed: f64, slots: &mut [u32]) {
    let speed = if speed.is_finite() && speed > 0.0 {
        speed.min(f64::from(u32::MAX - 1))
    } else {
        0.0
    };

    let whole = speed.floor();
    // Saturating float-to-int cast; `whole` is non-negative and bounded above.
    let base = whole as u32;
    let step_up = base.saturating_add(1);
    let slope = speed - whole;

    let mut accumulated = 0.0_f64;
    let mut previous = 0.0_f64;
    for slot in slots.iter_mut() {
        let level = accumulated.ceil();
        *slot = if level == previous { base } else { step_up };
        previous = level;
        accumulated += slope;
    }
}

/// Schedule paired with a running tick counter.
#[derive(Clone, Debug, PartialEq)]
pub struct TickClock {
    speed: f64,
    schedule: Vec<u32>,
    tick: u64,
}

impl TickClock {
    /// Creates a clock for `speed` over a cycle of `ticks_per_second` ticks.
    #[must_use]
    pub fn new(speed: f64, ticks_per_second: usize) -> Self {
        Self {
            speed,
            schedule: schedule_with(speed, ticks_per_second),
            tick: 0,
        }
    }

    /// Recomputes the schedule for a new speed without rewinding the clock.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
        self.schedule = schedule_with(speed, self.schedule.len());
    }

    /// Number of operations to perform on the next tick, advancing the clock.
    pub fn operations_for_next_tick(&mut self) -> u32 {
        let operations = if self.schedule.is_empty() {
            0
        } else {
            let slot = self.tick % self.schedule.len() as u64;
            self.schedule[slot as usize]
        };
        self.tick += 1;
        operations
    }

    /// Speed the current schedule was built for.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Ticks elapsed since the clock was created.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Operation counts for one full cycle.
    #[must_use]
    pub fn schedule(&self) -> &[u32] {
        &self.schedule
    }
}
