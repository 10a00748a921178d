//! Production lines: a countdown timer feeding a fixed-length conveyor.
//!
//! Each line produces one part type. Every tick the countdown advances by one
//! step; when it reads zero a new unit is stamped from the line's template and
//! placed at the back of the conveyor. Independently, the conveyor shifts one
//! slot per tick, so whatever sits at its front leaves the line. A unit
//! therefore spends [`CONVEYOR_SLOTS`] ticks in transit before it is returned
//! from [`ProductionLine::tick`].
//!
//! Both the timer and the conveyor are rings with a head index. Nothing is
//! allocated after construction.

use crate::id::LineId;
use crate::part::{Part, PartTemplate};
use crate::rng::SimRng;
use std::fmt;

/// Number of transit slots on every conveyor.
pub const CONVEYOR_SLOTS: usize = 10;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while building a production line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("invalid configuration for line {line}: {reason}")]
    InvalidConfiguration { line: LineId, reason: String },
}

// ---------------------------------------------------------------------------
// Line configuration (immutable after creation)
// ---------------------------------------------------------------------------

/// Everything needed to build a line, as read from a machine table row.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LineConfig {
    pub id: LineId,
    pub template: PartTemplate,
    /// Ticks per production cycle. One unit is produced per cycle.
    pub period: u32,
    /// Maximum deviation of a unit's weight from the template weight.
    pub weight_error: f64,
    /// Every unit whose production index is a multiple of this is defective.
    pub defect_interval: u32,
}

impl LineConfig {
    /// Check the invariants a running line relies on.
    pub fn validate(&self) -> Result<(), LineError> {
        let invalid = |reason: String| LineError::InvalidConfiguration {
            line: self.id,
            reason,
        };

        if self.period == 0 {
            return Err(invalid("period must be greater than 0".to_string()));
        }
        if self.defect_interval == 0 {
            return Err(invalid("defect interval must be greater than 0".to_string()));
        }
        if !self.template.base_weight.is_finite() {
            return Err(invalid(format!(
                "base weight must be finite, got {}",
                self.template.base_weight
            )));
        }
        if !self.weight_error.is_finite() || self.weight_error < 0.0 {
            return Err(invalid(format!(
                "weight error must be a finite non-negative number, got {}",
                self.weight_error
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Countdown timer
// ---------------------------------------------------------------------------

/// Circular countdown cycling `period-1, period-2, ..., 0, period-1, ...`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Countdown {
    period: u32,
    /// Offset into the cycle; the value at the front is `period - 1 - position`.
    position: u32,
}

impl Countdown {
    /// A fresh cycle. `period` must be non-zero.
    pub fn new(period: u32) -> Self {
        debug_assert!(period > 0, "countdown period must be non-zero");
        Self {
            period,
            position: 0,
        }
    }

    /// The value at the front of the cycle, without advancing.
    pub fn peek(&self) -> u32 {
        self.period - 1 - self.position
    }

    /// Read the front value and rotate it to the back. Returns the value read;
    /// zero means "produce now".
    pub fn tick(&mut self) -> u32 {
        let front = self.peek();
        self.position = (self.position + 1) % self.period;
        front
    }

    pub fn period(&self) -> u32 {
        self.period
    }
}

// ---------------------------------------------------------------------------
// Conveyor
// ---------------------------------------------------------------------------

/// Fixed-length FIFO of optional parts.
///
/// Slots are pre-allocated at creation. `head` points at the front slot; the
/// back slot is the one just before it, so advancing the ring is a take and a
/// write at the same index.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Conveyor {
    slots: Vec<Option<Part>>,
    head: usize,
    occupied: usize,
}

impl Conveyor {
    /// An empty conveyor with `len` slots. `len` must be non-zero.
    pub fn new(len: usize) -> Self {
        debug_assert!(len > 0, "conveyor needs at least one slot");
        Self {
            slots: vec![None; len],
            head: 0,
            occupied: 0,
        }
    }

    /// Remove the front slot and push `incoming` onto the back.
    /// Returns whatever was in the front slot.
    pub fn advance(&mut self, incoming: Option<Part>) -> Option<Part> {
        let outgoing = self.slots[self.head].take();
        if outgoing.is_some() {
            self.occupied -= 1;
        }
        if incoming.is_some() {
            self.occupied += 1;
        }
        self.slots[self.head] = incoming;
        self.head = (self.head + 1) % self.slots.len();
        outgoing
    }

    /// Take every part off the conveyor, front first. Slots stay in place
    /// and are left empty.
    pub fn drain(&mut self) -> Vec<Part> {
        let len = self.slots.len();
        let mut parts = Vec::with_capacity(self.occupied);
        for offset in 0..len {
            if let Some(part) = self.slots[(self.head + offset) % len].take() {
                parts.push(part);
            }
        }
        self.occupied = 0;
        parts
    }

    /// Empty every slot and rewind the head.
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.occupied = 0;
    }

    /// Number of slots (constant for the conveyor's lifetime).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots holding a part.
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// True when no slot holds a part.
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Slots in FIFO order, front first.
    pub fn iter(&self) -> impl Iterator<Item = Option<&Part>> + '_ {
        let len = self.slots.len();
        (0..len).map(move |offset| self.slots[(self.head + offset) % len].as_ref())
    }
}

/// Renders the belt back first: `_` for an empty slot, `|P|` for a part.
impl fmt::Display for Conveyor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.slots.len();
        for offset in (0..len).rev() {
            match self.slots[(self.head + offset) % len] {
                Some(_) => f.write_str("|P|")?,
                None => f.write_str("_")?,
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Production line
// ---------------------------------------------------------------------------

/// A machine: countdown timer, conveyor, produced-unit counter, and its own
/// weight sampling stream.
#[derive(Debug, Clone)]
pub struct ProductionLine {
    config: LineConfig,
    timer: Countdown,
    conveyor: Conveyor,
    produced: u64,
    rng: SimRng,
}

impl ProductionLine {
    /// Build a line from a validated config. Fails with
    /// [`LineError::InvalidConfiguration`] before any state is created.
    pub fn new(config: LineConfig, rng: SimRng) -> Result<Self, LineError> {
        config.validate()?;
        Ok(Self {
            timer: Countdown::new(config.period),
            conveyor: Conveyor::new(CONVEYOR_SLOTS),
            produced: 0,
            rng,
            config,
        })
    }

    /// Advance the line by one minute.
    ///
    /// Returns the unit leaving the conveyor this tick, if any. When the timer
    /// reads zero a new unit enters the back of the conveyor.
    pub fn tick(&mut self) -> Option<Part> {
        if self.conveyor.is_empty() {
            self.reset_conveyor();
        }

        let remaining = self.timer.tick();
        let incoming = if remaining == 0 {
            Some(self.produce())
        } else {
            None
        };
        self.conveyor.advance(incoming)
    }

    /// Stamp the next unit. Defect status depends only on the production index.
    fn produce(&mut self) -> Part {
        let template = &self.config.template;
        let error = self.config.weight_error;
        let weight = template.base_weight - error + 2.0 * error * self.rng.next_f64();
        let defective = self.produced % u64::from(self.config.defect_interval) == 0;
        self.produced += 1;
        Part::from_template(template, weight, defective)
    }

    /// Empty the conveyor, discarding anything on it.
    pub fn reset_conveyor(&mut self) {
        self.conveyor.reset();
    }

    /// Take every unit still in transit, front first.
    pub fn flush_conveyor(&mut self) -> Vec<Part> {
        self.conveyor.drain()
    }

    /// One-line picture of the conveyor, e.g. `|Machine 1||P|_|P|_______`.
    pub fn render_conveyor(&self) -> String {
        format!("|Machine {}|{}", self.id(), self.conveyor)
    }

    pub fn id(&self) -> LineId {
        self.config.id
    }

    pub fn config(&self) -> &LineConfig {
        &self.config
    }

    pub fn template(&self) -> &PartTemplate {
        &self.config.template
    }

    pub fn period(&self) -> u32 {
        self.config.period
    }

    pub fn weight_error(&self) -> f64 {
        self.config.weight_error
    }

    pub fn defect_interval(&self) -> u32 {
        self.config.defect_interval
    }

    /// Units produced so far (entered the conveyor, not necessarily exited).
    pub fn produced_count(&self) -> u64 {
        self.produced
    }

    /// The countdown value the next tick will read.
    pub fn next_countdown(&self) -> u32 {
        self.timer.peek()
    }

    pub fn conveyor(&self) -> &Conveyor {
        &self.conveyor
    }

    pub(crate) fn rng_state(&self) -> u64 {
        self.rng.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::PartTypeId;

    fn config(period: u32, weight_error: f64, defect_interval: u32) -> LineConfig {
        LineConfig {
            id: LineId(1),
            template: PartTemplate::new(PartTypeId(1), "Bolt", 10.0),
            period,
            weight_error,
            defect_interval,
        }
    }

    fn line(period: u32, defect_interval: u32) -> ProductionLine {
        ProductionLine::new(config(period, 0.5, defect_interval), SimRng::new(1)).unwrap()
    }

    fn part(n: u32) -> Part {
        Part::new(PartTypeId(n), "P", 1.0, false)
    }

    // -----------------------------------------------------------------------
    // Config validation
    // -----------------------------------------------------------------------

    #[test]
    fn zero_defect_interval_rejected() {
        let err = ProductionLine::new(config(2, 0.5, 0), SimRng::new(0)).unwrap_err();
        assert!(matches!(
            err,
            LineError::InvalidConfiguration { line: LineId(1), .. }
        ));
        assert!(err.to_string().contains("defect interval"));
    }

    #[test]
    fn zero_period_rejected() {
        let err = ProductionLine::new(config(0, 0.5, 5), SimRng::new(0)).unwrap_err();
        assert!(err.to_string().contains("period"));
    }

    #[test]
    fn negative_weight_error_rejected() {
        assert!(config(2, -0.1, 5).validate().is_err());
        assert!(config(2, f64::NAN, 5).validate().is_err());
        assert!(config(2, 0.0, 5).validate().is_ok());
    }

    // -----------------------------------------------------------------------
    // Countdown
    // -----------------------------------------------------------------------

    #[test]
    fn countdown_cycles_descending() {
        let mut timer = Countdown::new(3);
        let reads: Vec<u32> = (0..7).map(|_| timer.tick()).collect();
        assert_eq!(reads, vec![2, 1, 0, 2, 1, 0, 2]);
    }

    #[test]
    fn countdown_period_one_always_zero() {
        let mut timer = Countdown::new(1);
        assert!((0..5).all(|_| timer.tick() == 0));
    }

    // -----------------------------------------------------------------------
    // Conveyor
    // -----------------------------------------------------------------------

    #[test]
    fn conveyor_is_fifo_with_fixed_latency() {
        let mut belt = Conveyor::new(3);
        assert_eq!(belt.advance(Some(part(1))), None);
        assert_eq!(belt.advance(Some(part(2))), None);
        assert_eq!(belt.advance(None), None);
        assert_eq!(belt.advance(None).map(|p| p.type_id()), Some(PartTypeId(1)));
        assert_eq!(belt.advance(None).map(|p| p.type_id()), Some(PartTypeId(2)));
        assert_eq!(belt.len(), 3);
        assert!(belt.is_empty());
    }

    #[test]
    fn conveyor_drain_is_front_first() {
        let mut belt = Conveyor::new(4);
        belt.advance(None);
        belt.advance(Some(part(1)));
        belt.advance(None);
        belt.advance(Some(part(2)));
        belt.advance(Some(part(3)));
        assert_eq!(belt.occupied(), 3);

        let ids: Vec<u32> = belt.drain().iter().map(|p| p.type_id().0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(belt.is_empty());
        assert_eq!(belt.len(), 4);
        assert!(belt.iter().all(|slot| slot.is_none()));
    }

    #[test]
    fn conveyor_reset_empties_every_slot() {
        let mut belt = Conveyor::new(2);
        belt.advance(Some(part(1)));
        belt.reset();
        assert!(belt.is_empty());
        assert_eq!(belt.len(), 2);
        assert_eq!(belt.advance(None), None);
        assert_eq!(belt.advance(None), None);
    }

    // -----------------------------------------------------------------------
    // Production line
    // -----------------------------------------------------------------------

    #[test]
    fn first_unit_exits_after_transit() {
        let mut line = line(1, 5);
        // Period 1 produces every tick; nothing exits until the belt is full.
        for _ in 0..CONVEYOR_SLOTS {
            assert!(line.tick().is_none());
        }
        let first = line.tick().expect("unit should exit after ten ticks in transit");
        assert!(first.is_defective(), "production index 0 is always defective");
        assert_eq!(line.produced_count(), CONVEYOR_SLOTS as u64 + 1);
    }

    #[test]
    fn produces_once_per_period() {
        let mut line = line(2, 5);
        for _ in 0..10 {
            line.tick();
        }
        assert_eq!(line.produced_count(), 5);
        assert_eq!(line.conveyor().occupied(), 5);
    }

    #[test]
    fn conveyor_length_constant_across_ticks() {
        let mut line = line(3, 2);
        for _ in 0..50 {
            line.tick();
            assert_eq!(line.conveyor().len(), CONVEYOR_SLOTS);
        }
        line.flush_conveyor();
        line.tick();
        assert_eq!(line.conveyor().len(), CONVEYOR_SLOTS);
    }

    #[test]
    fn defect_cycle_follows_production_index() {
        let mut line = line(1, 3);
        let mut units = Vec::new();
        for _ in 0..30 {
            units.extend(line.tick());
        }
        units.extend(line.flush_conveyor());
        assert_eq!(units.len(), 30);
        for (index, unit) in units.iter().enumerate() {
            assert_eq!(unit.is_defective(), index % 3 == 0, "unit {index}");
        }
    }

    #[test]
    fn weights_within_error_band() {
        let mut line = line(1, 4);
        for _ in 0..200 {
            line.tick();
        }
        for unit in line.flush_conveyor() {
            assert!(unit.weight() >= 9.5 && unit.weight() < 10.5, "{}", unit.weight());
        }
    }

    #[test]
    fn zero_weight_error_gives_exact_weight() {
        let mut line = ProductionLine::new(config(1, 0.0, 4), SimRng::new(3)).unwrap();
        line.tick();
        let units = line.flush_conveyor();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].weight(), 10.0);
    }

    #[test]
    fn flush_then_tick_rearms_conveyor() {
        let mut line = line(1, 5);
        for _ in 0..4 {
            line.tick();
        }
        assert_eq!(line.flush_conveyor().len(), 4);
        // After a flush the next unit again needs a full transit.
        for _ in 0..CONVEYOR_SLOTS {
            assert!(line.tick().is_none());
        }
        assert!(line.tick().is_some());
    }

    #[test]
    fn next_countdown_tracks_timer() {
        let mut line = line(4, 5);
        assert_eq!(line.next_countdown(), 3);
        line.tick();
        assert_eq!(line.next_countdown(), 2);
    }

    #[test]
    fn render_conveyor_back_first() {
        let mut line = line(2, 5);
        assert_eq!(line.render_conveyor(), "|Machine 1|__________");

        // Units enter on ticks 2 and 4; the newest sits at the back.
        for _ in 0..4 {
            line.tick();
        }
        assert_eq!(line.render_conveyor(), "|Machine 1||P|_|P|_______");
        assert_eq!(line.conveyor().to_string(), "|P|_|P|_______");
    }
}
