//! Partline Core -- the production scheduling engine for a parts factory.
//!
//! A factory is a set of independent production lines, each making one part
//! type on a fixed cadence. Units ride a ten-slot conveyor before they count
//! as complete, every Nth unit comes out defective, and accepted units pile
//! up in a shared inventory that customer orders draw from.
//!
//! # Day Pipeline
//!
//! [`scheduler::FactoryScheduler::run`] advances the factory day by day:
//!
//! 1. **Minutes** -- every line ticks once per minute; units leaving a
//!    conveyor go to the production buffer.
//! 2. **Flush** -- at the end of the day every conveyor is emptied into the
//!    buffer.
//! 3. **Drain** -- the buffer is emptied into inventory (accepted units) and
//!    the defect ledger (defective units).
//!
//! Once all days are done, orders are matched against inventory in the order
//! they were placed, all or nothing.
//!
//! # Key Types
//!
//! - [`line::ProductionLine`] -- countdown timer plus conveyor state machine.
//! - [`buffer::ProductionBuffer`] -- LIFO holding bin for completed units.
//! - [`inventory::Stockroom`] -- inventory and defect ledger.
//! - [`order::OrderBook`] and [`order::match_orders`] -- demand and matching.
//! - [`scheduler::FactoryScheduler`] -- owns everything and drives the loop.
//! - [`query::FactoryReport`] -- end-of-run figures and their text rendering.
//! - [`rng::SimRng`] -- seedable generator for unit weights.

pub mod buffer;
pub mod id;
pub mod inventory;
pub mod line;
pub mod order;
pub mod part;
pub mod query;
pub mod rng;
pub mod scheduler;
pub mod sim;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
