//! Simulation configuration and state types.
//!
//! A run is measured in days of `minutes` ticks each. Every line is ticked
//! once per minute; all day-boundary work (conveyor flush, inventory drain)
//! happens after the last minute of the day.

// ---------------------------------------------------------------------------
// Simulation configuration
// ---------------------------------------------------------------------------

/// How long to run and which seed to draw weights from.
///
/// Deserializable from factory manifests; omitted fields take the defaults
/// below.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of simulated days. Must be positive.
    pub days: u32,
    /// Minutes (ticks) per simulated day. Must be positive.
    pub minutes: u32,
    /// Base seed; each line derives its own stream from it.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: 1,
            minutes: 480,
            seed: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// Progress counters tracked by the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimState {
    /// Days fully completed (ticked, flushed, and drained).
    pub days_run: u64,
    /// Total minute ticks executed across all days.
    pub ticks: u64,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic hash of factory state for reproducibility checks.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    /// Start a new hash.
    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    /// Feed bytes into the hash.
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    /// Feed a u64 into the hash.
    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    /// Feed a u32 into the hash.
    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    /// Feed an f64 into the hash by its exact bit pattern.
    pub fn write_f64(&mut self, v: f64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    /// Feed a bool into the hash.
    pub fn write_bool(&mut self, v: bool) {
        self.write(&[v as u8]);
    }

    /// Finalize and return the hash value.
    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_state_starts_at_zero() {
        let state = SimState::new();
        assert_eq!(state.days_run, 0);
        assert_eq!(state.ticks, 0);
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: SimulationConfig = serde_json::from_str(r#"{"days": 3}"#).unwrap();
        assert_eq!(config.days, 3);
        assert_eq!(config.minutes, 480);
        assert_eq!(config.seed, 0);
    }

    #[test]
    fn state_hash_deterministic() {
        let mut h1 = StateHash::new();
        h1.write_u64(42);
        h1.write_f64(10.25);

        let mut h2 = StateHash::new();
        h2.write_u64(42);
        h2.write_f64(10.25);

        assert_eq!(h1.finish(), h2.finish());
    }

    #[test]
    fn state_hash_differs_for_different_inputs() {
        let mut h1 = StateHash::new();
        h1.write_bool(true);

        let mut h2 = StateHash::new();
        h2.write_bool(false);

        assert_ne!(h1.finish(), h2.finish());
    }

    #[test]
    fn state_hash_order_matters() {
        let mut h1 = StateHash::new();
        h1.write_u32(1);
        h1.write_u32(2);

        let mut h2 = StateHash::new();
        h2.write_u32(2);
        h2.write_u32(1);

        assert_ne!(h1.finish(), h2.finish());
    }
}
