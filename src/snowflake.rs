//! Node-scoped snowflake identifier generation.
//!
//! Identifiers pack `timestamp_ms (44 bits) | node_id (10 bits) | sequence
//! (10 bits)` into a 64-bit integer, rendered as a decimal string. Each
//! generator is an explicit owned object constructed once at startup and
//! passed by reference to creation paths; there is no process-wide global.
//!
//! Guarantee: strictly increasing identifiers per node in call order.
//! Global uniqueness requires distinct node IDs across deployed instances —
//! no coordination protocol is provided.

use parking_lot::Mutex;
use rand::Rng;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{Result, SecurityError};

/// Bits reserved for the node ID.
const NODE_BITS: u8 = 10;

/// Bits reserved for the per-millisecond sequence.
const SEQUENCE_BITS: u8 = 10;

/// Highest valid node ID (1023).
pub const MAX_NODE_ID: u16 = (1 << NODE_BITS) - 1;

/// Sequence values per millisecond (1024).
const SEQUENCE_SPAN: u64 = 1 << SEQUENCE_BITS;

/// Pause between clock polls while waiting out a sequence overflow.
const OVERFLOW_POLL: Duration = Duration::from_micros(100);

/// Millisecond clock source, injectable for deterministic tests.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// Wall clock backed by `SystemTime`.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Mutable generator state, advanced only under the generator's lock.
struct GeneratorState {
    last_timestamp_ms: u64,
    sequence: u64,
}

/// Snowflake-style identifier generator for one node.
pub struct SnowflakeGenerator {
    node_id: u64,
    clock: Box<dyn Clock>,
    state: Mutex<GeneratorState>,
}

impl SnowflakeGenerator {
    /// Create a generator with an explicitly configured node ID.
    pub fn new(node_id: u16) -> Result<Self> {
        Self::with_clock(node_id, Box::new(SystemClock))
    }

    /// Create a generator with a random node ID in `[0, 1023]`.
    ///
    /// Suitable only when colliding node IDs across instances are an
    /// accepted risk; production fleets should configure IDs explicitly.
    pub fn with_random_node_id() -> Self {
        let node_id = rand::thread_rng().gen_range(0..=MAX_NODE_ID);
        Self::with_clock(node_id, Box::new(SystemClock))
            .expect("random node id is within range")
    }

    /// Create a generator with an injected clock source.
    pub fn with_clock(node_id: u16, clock: Box<dyn Clock>) -> Result<Self> {
        if node_id > MAX_NODE_ID {
            return Err(SecurityError::Config(format!(
                "node id {node_id} exceeds maximum {MAX_NODE_ID}"
            )));
        }
        Ok(Self {
            node_id: u64::from(node_id),
            clock,
            state: Mutex::new(GeneratorState {
                last_timestamp_ms: 0,
                sequence: 0,
            }),
        })
    }

    /// The node ID this generator stamps into every identifier.
    pub fn node_id(&self) -> u16 {
        self.node_id as u16
    }

    /// Produce the next identifier as a decimal string.
    ///
    /// Every call serializes on one critical section. A backward-moving
    /// clock yields [`SecurityError::ClockRegression`] and no identifier;
    /// continuing would risk silent collisions, so the hosting process
    /// decides the shutdown policy.
    pub fn next(&self) -> Result<String> {
        self.next_id().map(|id| id.to_string())
    }

    /// Produce the next identifier as a raw 64-bit integer.
    pub fn next_id(&self) -> Result<u64> {
        let mut state = self.state.lock();

        let mut timestamp = self.clock.now_millis();
        if timestamp < state.last_timestamp_ms {
            let drift_ms = state.last_timestamp_ms - timestamp;
            tracing::warn!(drift_ms, "clock regression detected; refusing to generate");
            return Err(SecurityError::ClockRegression { drift_ms });
        }

        if timestamp == state.last_timestamp_ms {
            state.sequence = (state.sequence + 1) % SEQUENCE_SPAN;
            if state.sequence == 0 {
                // Sequence exhausted for this millisecond; hold the lock and
                // poll until the clock ticks over.
                timestamp = self.wait_for_next_millis(state.last_timestamp_ms);
            }
        } else {
            state.sequence = 0;
        }

        state.last_timestamp_ms = timestamp;

        Ok((timestamp << (NODE_BITS + SEQUENCE_BITS))
            | (self.node_id << SEQUENCE_BITS)
            | state.sequence)
    }

    fn wait_for_next_millis(&self, last_timestamp_ms: u64) -> u64 {
        let mut timestamp = self.clock.now_millis();
        while timestamp <= last_timestamp_ms {
            std::thread::sleep(OVERFLOW_POLL);
            timestamp = self.clock.now_millis();
        }
        timestamp
    }
}
