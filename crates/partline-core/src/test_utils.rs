//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::id::*;
use crate::line::{LineConfig, ProductionLine};
use crate::order::{Order, OrderBook, RequestedParts};
use crate::part::PartTemplate;
use crate::rng::SimRng;
use crate::scheduler::FactoryScheduler;

// ===========================================================================
// Part types
// ===========================================================================

pub fn bolt() -> PartTypeId {
    PartTypeId(1)
}
pub fn nut() -> PartTypeId {
    PartTypeId(2)
}
pub fn washer() -> PartTypeId {
    PartTypeId(3)
}

// ===========================================================================
// Line configs
// ===========================================================================

/// Line 1: Bolt, 10.0 +/- 0.5, one unit every 2 minutes, every 5th defective.
pub fn bolt_line_config() -> LineConfig {
    make_line_config(1, bolt(), "Bolt", 10.0, 0.5, 2, 5)
}

/// Line 2: Nut, 2.0 +/- 0.1, one unit every 5 minutes, every 3rd defective.
pub fn nut_line_config() -> LineConfig {
    make_line_config(2, nut(), "Nut", 2.0, 0.1, 5, 3)
}

/// Line 3: Washer, 0.5 +/- 0.05, one unit every minute, every 10th defective.
pub fn washer_line_config() -> LineConfig {
    make_line_config(3, washer(), "Washer", 0.5, 0.05, 1, 10)
}

pub fn make_line_config(
    id: u32,
    part: PartTypeId,
    name: &str,
    base_weight: f64,
    weight_error: f64,
    period: u32,
    defect_interval: u32,
) -> LineConfig {
    LineConfig {
        id: LineId(id),
        template: PartTemplate::new(part, name, base_weight),
        period,
        weight_error,
        defect_interval,
    }
}

pub fn make_line(config: LineConfig, seed: u64) -> ProductionLine {
    ProductionLine::new(config, SimRng::new(seed)).unwrap()
}

// ===========================================================================
// Orders
// ===========================================================================

/// A pending order from `(part type, quantity)` pairs.
pub fn make_order(id: u32, customer: &str, pairs: &[(u32, u32)]) -> Order {
    Order::new(
        OrderId(id),
        customer,
        RequestedParts::from_pairs(pairs.iter().map(|&(t, q)| (PartTypeId(t), q))),
    )
}

// ===========================================================================
// Scheduler helpers
// ===========================================================================

pub fn single_line_scheduler(config: LineConfig, seed: u64) -> FactoryScheduler {
    FactoryScheduler::from_configs([config], OrderBook::new(), seed).unwrap()
}

/// Bolt, nut, and washer lines with the given orders.
pub fn three_line_scheduler(orders: Vec<Order>, seed: u64) -> FactoryScheduler {
    FactoryScheduler::from_configs(
        [bolt_line_config(), nut_line_config(), washer_line_config()],
        orders.into_iter().collect(),
        seed,
    )
    .unwrap()
}

/// `count` lines with periods cycling 1..=7 and distinct part types.
pub fn build_large_factory(count: u32, seed: u64) -> FactoryScheduler {
    let configs = (0..count).map(|i| {
        make_line_config(
            i + 1,
            PartTypeId(i + 1),
            "Widget",
            5.0,
            0.25,
            i % 7 + 1,
            i % 5 + 2,
        )
    });
    FactoryScheduler::from_configs(configs, OrderBook::new(), seed).unwrap()
}
