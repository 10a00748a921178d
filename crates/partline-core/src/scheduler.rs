//! The factory scheduler: owns every line, the production buffer, the
//! stockroom, and the order book, and drives the day/minute loop.
//!
//! # Day pipeline
//!
//! Each simulated day runs:
//! 1. **Minutes** -- every line is ticked once per minute, in line order;
//!    units leaving a conveyor go into the production buffer.
//! 2. **Flush** -- every conveyor is emptied into the buffer, so work in
//!    progress is accounted for at the day boundary.
//! 3. **Drain** -- the buffer is emptied into the stockroom: defective units
//!    bump the defect ledger, the rest join inventory.
//!
//! After the last day of a [`FactoryScheduler::run`], order matching runs once.
//!
//! A day is the unit of atomicity: callers that need to stop early should
//! drive [`FactoryScheduler::run_day`] themselves and check between days.

use crate::buffer::ProductionBuffer;
use crate::id::LineId;
use crate::inventory::{DefectLedger, Disposition, Inventory, Stockroom};
use crate::line::{LineConfig, LineError, ProductionLine};
use crate::order::{MatchOutcome, Order, OrderBook, match_orders};
use crate::part::PartCatalog;
use crate::query::{FactoryReport, LineSnapshot, OrderSnapshot};
use crate::rng::SimRng;
use crate::sim::{SimState, StateHash};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while setting up or running the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("invalid argument: {name} must be greater than 0, got {value}")]
    InvalidArgument { name: &'static str, value: u32 },
    #[error("duplicate line id {0}")]
    DuplicateLine(LineId),
    #[error(transparent)]
    Line(#[from] LineError),
}

fn require_positive(name: &'static str, value: u32) -> Result<(), SchedulerError> {
    if value == 0 {
        return Err(SchedulerError::InvalidArgument { name, value });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Totals from one end-of-day drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainTotals {
    pub accepted: u64,
    pub discarded: u64,
}

/// What happened during one simulated day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DaySummary {
    /// 1-based day number.
    pub day: u64,
    /// Units that completed transit during the minute loop.
    pub exited: u64,
    /// Units taken off conveyors by the end-of-day flush.
    pub flushed: u64,
    pub drained: DrainTotals,
}

/// What happened during a full [`FactoryScheduler::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub days: Vec<DaySummary>,
    pub matching: MatchOutcome,
}

impl RunSummary {
    pub fn accepted(&self) -> u64 {
        self.days.iter().map(|d| d.drained.accepted).sum()
    }

    pub fn discarded(&self) -> u64 {
        self.days.iter().map(|d| d.drained.discarded).sum()
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct FactoryScheduler {
    lines: Vec<ProductionLine>,
    buffer: ProductionBuffer,
    stockroom: Stockroom,
    orders: OrderBook,
    catalog: PartCatalog,
    sim_state: SimState,
}

impl FactoryScheduler {
    /// Take ownership of `lines` (ticked in the given order) and `orders`.
    ///
    /// Every line's part type is registered in the catalog, inventory, and
    /// defect ledger with zero stock.
    pub fn new(lines: Vec<ProductionLine>, orders: OrderBook) -> Result<Self, SchedulerError> {
        let mut seen = HashSet::new();
        let mut catalog = PartCatalog::new();
        let mut stockroom = Stockroom::new();

        for line in &lines {
            if !seen.insert(line.id()) {
                return Err(SchedulerError::DuplicateLine(line.id()));
            }
            catalog.register(line.template());
            stockroom.register(line.template().type_id);
        }

        Ok(Self {
            lines,
            buffer: ProductionBuffer::new(),
            stockroom,
            orders,
            catalog,
            sim_state: SimState::new(),
        })
    }

    /// Build lines from configs, giving each its own RNG stream derived from
    /// `seed` and the line id.
    pub fn from_configs(
        configs: impl IntoIterator<Item = LineConfig>,
        orders: OrderBook,
        seed: u64,
    ) -> Result<Self, SchedulerError> {
        let lines = configs
            .into_iter()
            .map(|config| {
                let rng = SimRng::derive(seed, u64::from(config.id.0));
                ProductionLine::new(config, rng)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(lines, orders)
    }

    // -----------------------------------------------------------------------
    // Running
    // -----------------------------------------------------------------------

    /// Run `days` days of `minutes` minutes each, then match orders once.
    ///
    /// Both arguments are checked before any state changes.
    pub fn run(&mut self, days: u32, minutes: u32) -> Result<RunSummary, SchedulerError> {
        require_positive("days", days)?;
        require_positive("minutes", minutes)?;

        let mut summary = RunSummary::default();
        for _ in 0..days {
            summary.days.push(self.run_day_unchecked(minutes));
        }
        summary.matching = self.process_orders();

        tracing::info!(
            days,
            minutes,
            accepted = summary.accepted(),
            discarded = summary.discarded(),
            fulfilled = summary.matching.fulfilled.len(),
            pending = summary.matching.pending.len(),
            "factory run complete"
        );
        Ok(summary)
    }

    /// Run a single day (minute loop, flush, drain) without matching orders.
    pub fn run_day(&mut self, minutes: u32) -> Result<DaySummary, SchedulerError> {
        require_positive("minutes", minutes)?;
        Ok(self.run_day_unchecked(minutes))
    }

    fn run_day_unchecked(&mut self, minutes: u32) -> DaySummary {
        let mut exited = 0;
        for _ in 0..minutes {
            exited += self.tick_minute() as u64;
        }
        if tracing::enabled!(tracing::Level::TRACE) {
            for line in &self.lines {
                tracing::trace!(belt = %line.render_conveyor(), "end of day");
            }
        }
        let flushed = self.flush_conveyors() as u64;
        let drained = self.store_in_inventory();
        self.sim_state.days_run += 1;

        let day = DaySummary {
            day: self.sim_state.days_run,
            exited,
            flushed,
            drained,
        };
        tracing::debug!(
            day = day.day,
            exited,
            flushed,
            accepted = drained.accepted,
            discarded = drained.discarded,
            "day complete"
        );
        day
    }

    /// Tick every line once. Returns the number of units that left a
    /// conveyor and were added to the buffer.
    pub fn tick_minute(&mut self) -> usize {
        let before = self.buffer.len();

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let exits: Vec<_> = self
                .lines
                .par_iter_mut()
                .map(ProductionLine::tick)
                .collect();
            // Merge in line order so the buffer matches the sequential path.
            for part in exits.into_iter().flatten() {
                self.buffer.push(part);
            }
        }

        #[cfg(not(feature = "parallel"))]
        for line in &mut self.lines {
            if let Some(part) = line.tick() {
                self.buffer.push(part);
            }
        }

        self.sim_state.ticks += 1;
        self.buffer.len() - before
    }

    /// Move everything still on a conveyor into the buffer. Returns the
    /// number of units moved.
    pub fn flush_conveyors(&mut self) -> usize {
        let mut moved = 0;
        for line in &mut self.lines {
            for part in line.flush_conveyor() {
                self.buffer.push(part);
                moved += 1;
            }
        }
        moved
    }

    /// Empty the buffer into the stockroom.
    pub fn store_in_inventory(&mut self) -> DrainTotals {
        let mut totals = DrainTotals::default();
        for part in self.buffer.drain() {
            match self.stockroom.store(part) {
                Disposition::Accepted => totals.accepted += 1,
                Disposition::Discarded => totals.discarded += 1,
            }
        }
        totals
    }

    /// One matching pass over the order book.
    pub fn process_orders(&mut self) -> MatchOutcome {
        match_orders(&mut self.orders, &mut self.stockroom.inventory)
    }

    /// Append an order to the book; it is considered on the next matching pass.
    pub fn add_order(&mut self, order: Order) {
        self.orders.push(order);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn lines(&self) -> &[ProductionLine] {
        &self.lines
    }

    pub fn line(&self, id: LineId) -> Option<&ProductionLine> {
        self.lines.iter().find(|l| l.id() == id)
    }

    pub fn buffer(&self) -> &ProductionBuffer {
        &self.buffer
    }

    pub fn inventory(&self) -> &Inventory {
        &self.stockroom.inventory
    }

    pub fn defects(&self) -> &DefectLedger {
        &self.stockroom.defects
    }

    pub fn orders(&self) -> &OrderBook {
        &self.orders
    }

    pub fn catalog(&self) -> &PartCatalog {
        &self.catalog
    }

    pub fn sim_state(&self) -> &SimState {
        &self.sim_state
    }

    /// Deterministic hash over line, stock, defect, and order state.
    pub fn state_hash(&self) -> u64 {
        let mut hash = StateHash::new();
        hash.write_u64(self.sim_state.days_run);
        hash.write_u64(self.sim_state.ticks);

        for line in &self.lines {
            hash.write_u32(line.id().0);
            hash.write_u64(line.produced_count());
            hash.write_u32(line.next_countdown());
            hash.write_u64(line.rng_state());
            for slot in line.conveyor().iter() {
                match slot {
                    Some(part) => {
                        hash.write_f64(part.weight());
                        hash.write_bool(part.is_defective());
                    }
                    None => hash.write(&[0xff]),
                }
            }
        }

        let inventory = self.inventory();
        for type_id in inventory.types() {
            hash.write_u32(type_id.0);
            hash.write_u64(self.defects().count(type_id));
            for part in inventory.parts(type_id) {
                hash.write_f64(part.weight());
            }
        }

        for order in self.orders.iter() {
            hash.write_u32(order.id().0);
            hash.write_bool(order.is_fulfilled());
        }

        hash.finish()
    }

    /// Snapshot of per-line production and per-order status.
    pub fn report(&self) -> FactoryReport {
        let lines = self
            .lines
            .iter()
            .map(|line| {
                let part_type = line.template().type_id;
                LineSnapshot {
                    id: line.id(),
                    part_type,
                    part_name: line.template().name.clone(),
                    produced: line.produced_count(),
                    defective: self.defects().count(part_type),
                    in_inventory: self.inventory().available(part_type),
                    in_transit: line.conveyor().occupied(),
                }
            })
            .collect();

        let orders = self
            .orders
            .iter()
            .map(|order| OrderSnapshot {
                id: order.id(),
                customer: order.customer().to_string(),
                part_count: order.part_count(),
                status: order.status(),
            })
            .collect();

        FactoryReport { lines, orders }
    }
}
