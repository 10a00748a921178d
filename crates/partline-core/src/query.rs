//! Read-only snapshots of factory state.
//!
//! Snapshot types are owned copies with no references into scheduler
//! storage. [`FactoryReport`] renders the end-of-run report.

use crate::id::{LineId, OrderId, PartTypeId};
use crate::order::OrderStatus;
use std::fmt;

// ---------------------------------------------------------------------------
// Line snapshot
// ---------------------------------------------------------------------------

/// Counts for one production line.
///
/// `defective` and `in_inventory` are per part type, so lines sharing a part
/// type report the same figures.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LineSnapshot {
    pub id: LineId,
    pub part_type: PartTypeId,
    pub part_name: String,
    /// Units this line has produced (entered its conveyor).
    pub produced: u64,
    /// Defective units of this part type discarded so far.
    pub defective: u64,
    /// Accepted units of this part type currently in stock.
    pub in_inventory: usize,
    /// Units currently in transit on this line's conveyor.
    pub in_transit: usize,
}

// ---------------------------------------------------------------------------
// Order snapshot
// ---------------------------------------------------------------------------

/// Summary of one order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OrderSnapshot {
    pub id: OrderId,
    pub customer: String,
    /// Distinct part types requested.
    pub part_count: usize,
    pub status: OrderStatus,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Per-line production figures and per-order status.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct FactoryReport {
    pub lines: Vec<LineSnapshot>,
    pub orders: Vec<OrderSnapshot>,
}

impl FactoryReport {
    pub fn fulfilled_orders(&self) -> usize {
        self.orders
            .iter()
            .filter(|o| o.status == OrderStatus::Fulfilled)
            .count()
    }
}

impl fmt::Display for FactoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t\t\tREPORT")?;
        writeln!(f)?;
        writeln!(f, "Parts Produced per Machine")?;
        for line in &self.lines {
            writeln!(
                f,
                "Machine {} Produced: {} {}\t({} defective)\t({} in inventory)",
                line.id, line.part_name, line.produced, line.defective, line.in_inventory
            )?;
        }
        writeln!(f)?;
        writeln!(f, "ORDERS")?;
        writeln!(f)?;
        for order in &self.orders {
            writeln!(
                f,
                "{} {} {} {}",
                order.id, order.customer, order.part_count, order.status
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FactoryReport {
        FactoryReport {
            lines: vec![LineSnapshot {
                id: LineId(1),
                part_type: PartTypeId(1),
                part_name: "Bolt".to_string(),
                produced: 5,
                defective: 1,
                in_inventory: 4,
                in_transit: 0,
            }],
            orders: vec![
                OrderSnapshot {
                    id: OrderId(7),
                    customer: "Acme".to_string(),
                    part_count: 2,
                    status: OrderStatus::Fulfilled,
                },
                OrderSnapshot {
                    id: OrderId(8),
                    customer: "Globex".to_string(),
                    part_count: 1,
                    status: OrderStatus::Pending,
                },
            ],
        }
    }

    #[test]
    fn report_renders_machine_and_order_lines() {
        let text = sample().to_string();
        assert!(text.starts_with("\t\t\tREPORT\n\nParts Produced per Machine\n"));
        assert!(text.contains("Machine 1 Produced: Bolt 5\t(1 defective)\t(4 in inventory)\n"));
        assert!(text.contains("\nORDERS\n\n7 Acme 2 FULFILLED\n8 Globex 1 PENDING\n"));
    }

    #[test]
    fn fulfilled_orders_counts_status() {
        assert_eq!(sample().fulfilled_orders(), 1);
    }

    #[test]
    fn report_serializes_to_json() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["lines"][0]["part_name"], "Bolt");
        assert_eq!(json["orders"][1]["status"], "Pending");
    }
}
