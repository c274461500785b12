//! Identifier generation for delegate table keys
//!
//! Identifiers have the shape `{timestamp_ms}-{counter}-{suffix}`:
//!
//! ```text
//! 1760601234567-1000042-aZ09bY18cX27dW36eV45fU54t
//! ^ wall clock  ^ bounded counter ^ 25 random alphanumerics
//! ```
//!
//! The timestamp partitions identifiers by millisecond, the counter separates
//! calls inside the same millisecond, and the random suffix covers counter
//! wraparound and independent generators running side by side.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Tuning knobs for [`IdGenerator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdOptions {
    /// First counter value, and the value the counter wraps back to
    pub counter_floor: u64,

    /// Last counter value before wrapping
    pub counter_ceiling: u64,

    /// Length of the random alphanumeric suffix
    pub suffix_len: usize,
}

impl Default for IdOptions {
    fn default() -> Self {
        Self {
            counter_floor: 1_000_000,
            counter_ceiling: 9_999_999,
            suffix_len: 25,
        }
    }
}

impl IdOptions {
    /// Options with a custom counter range, keeping the default suffix length
    pub fn with_counter_range(counter_floor: u64, counter_ceiling: u64) -> Self {
        Self {
            counter_floor,
            counter_ceiling,
            ..Default::default()
        }
    }
}

/// Collision-resistant identifier generator
#[derive(Debug)]
pub struct IdGenerator {
    options: IdOptions,

    /// Next counter value to hand out
    counter: u64,

    /// Largest timestamp observed so far
    last_millis: u64,

    rng: StdRng,
}

impl IdGenerator {
    /// Create a generator with default options and an entropy-seeded RNG
    pub fn new() -> Self {
        Self::with_options(IdOptions::default())
    }

    /// Create a generator with custom options
    pub fn with_options(options: IdOptions) -> Self {
        Self::build(options, StdRng::from_entropy())
    }

    /// Create a generator whose random suffixes are reproducible
    pub fn with_seed(options: IdOptions, seed: u64) -> Self {
        Self::build(options, StdRng::seed_from_u64(seed))
    }

    fn build(mut options: IdOptions, rng: StdRng) -> Self {
        if options.counter_floor > options.counter_ceiling {
            std::mem::swap(&mut options.counter_floor, &mut options.counter_ceiling);
        }
        Self {
            counter: options.counter_floor,
            options,
            last_millis: 0,
            rng,
        }
    }

    /// Options this generator was built with
    pub fn options(&self) -> &IdOptions {
        &self.options
    }

    /// Produce the next identifier
    pub fn next_id(&mut self) -> String {
        let millis = self.next_millis();
        let count = self.next_count();
        let suffix: String = (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(self.options.suffix_len)
            .map(char::from)
            .collect();

        let id = format!("{}-{}-{}", millis, count, suffix);
        tracing::trace!(%id, "generated identifier");
        id
    }

    /// Wall-clock milliseconds, never smaller than a previously returned value
    fn next_millis(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.last_millis = self.last_millis.max(now);
        self.last_millis
    }

    fn next_count(&mut self) -> u64 {
        let count = self.counter;
        self.counter = if count >= self.options.counter_ceiling {
            self.options.counter_floor
        } else {
            count + 1
        };
        count
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
