//! Customer orders and the all-or-nothing matcher.
//!
//! Matching walks the order book once in insertion order. A pending order is
//! fulfilled only if inventory covers every requested type; its units are
//! then withdrawn oldest first. Fulfilled orders are skipped, so running the
//! matcher again never withdraws stock for the same order twice.

use crate::id::{OrderId, PartTypeId};
use crate::inventory::Inventory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Requested parts
// ---------------------------------------------------------------------------

/// Quantity requested per part type. Adding a type twice sums the quantities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedParts {
    quantities: BTreeMap<PartTypeId, u32>,
}

impl RequestedParts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(type, quantity)` pairs, accumulating duplicates.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (PartTypeId, u32)>) -> Self {
        let mut requested = Self::new();
        for (type_id, quantity) in pairs {
            requested.add(type_id, quantity);
        }
        requested
    }

    pub fn add(&mut self, type_id: PartTypeId, quantity: u32) {
        let entry = self.quantities.entry(type_id).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    pub fn quantity(&self, type_id: PartTypeId) -> u32 {
        self.quantities.get(&type_id).copied().unwrap_or(0)
    }

    /// `(type, quantity)` pairs in ascending type order.
    pub fn iter(&self) -> impl Iterator<Item = (PartTypeId, u32)> + '_ {
        self.quantities.iter().map(|(&type_id, &quantity)| (type_id, quantity))
    }

    /// Number of distinct part types requested.
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Sum of all requested quantities.
    pub fn total_units(&self) -> u64 {
        self.quantities.values().map(|&q| u64::from(q)).sum()
    }
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// Fulfilment state. Only ever moves from `Pending` to `Fulfilled`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Fulfilled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => f.write_str("PENDING"),
            OrderStatus::Fulfilled => f.write_str("FULFILLED"),
        }
    }
}

/// A customer's demand. Immutable; [`Order::with_fulfilled`] yields the
/// fulfilled copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer: String,
    requested: RequestedParts,
    status: OrderStatus,
}

impl Order {
    /// A new pending order.
    pub fn new(id: OrderId, customer: impl Into<String>, requested: RequestedParts) -> Self {
        Self {
            id,
            customer: customer.into(),
            requested,
            status: OrderStatus::Pending,
        }
    }

    /// The same order marked fulfilled.
    pub fn with_fulfilled(&self) -> Self {
        Self {
            status: OrderStatus::Fulfilled,
            ..self.clone()
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer(&self) -> &str {
        &self.customer
    }

    pub fn requested(&self) -> &RequestedParts {
        &self.requested
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_fulfilled(&self) -> bool {
        self.status == OrderStatus::Fulfilled
    }

    /// Number of distinct part types requested.
    pub fn part_count(&self) -> usize {
        self.requested.len()
    }
}

// ---------------------------------------------------------------------------
// Order book
// ---------------------------------------------------------------------------

/// Orders in the sequence they were placed.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, order: Order) {
        self.orders.push(order);
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> + '_ {
        self.orders.iter()
    }

    pub fn pending(&self) -> impl Iterator<Item = &Order> + '_ {
        self.orders.iter().filter(|o| !o.is_fulfilled())
    }

    pub fn fulfilled(&self) -> impl Iterator<Item = &Order> + '_ {
        self.orders.iter().filter(|o| o.is_fulfilled())
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl FromIterator<Order> for OrderBook {
    fn from_iter<I: IntoIterator<Item = Order>>(iter: I) -> Self {
        Self {
            orders: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Result of one matching pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Orders fulfilled by this pass, in book order.
    pub fulfilled: Vec<OrderId>,
    /// Orders still pending after this pass, in book order.
    pub pending: Vec<OrderId>,
    /// Accepted units withdrawn from inventory by this pass.
    pub units_consumed: u64,
}

/// Run one matching pass over `book` against `inventory`.
pub fn match_orders(book: &mut OrderBook, inventory: &mut Inventory) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();

    for order in &mut book.orders {
        if order.is_fulfilled() {
            continue;
        }
        if !inventory.can_supply(order.requested.iter()) {
            outcome.pending.push(order.id);
            continue;
        }

        for (type_id, quantity) in order.requested.iter() {
            // Feasibility was checked above, so every withdrawal succeeds.
            if let Some(units) = inventory.withdraw(type_id, quantity) {
                outcome.units_consumed += units.len() as u64;
            }
        }
        *order = order.with_fulfilled();
        outcome.fulfilled.push(order.id);
        tracing::info!(
            order = order.id.0,
            customer = %order.customer,
            "order fulfilled"
        );
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::Part;

    fn stock(inventory: &mut Inventory, type_id: u32, n: usize) {
        for _ in 0..n {
            inventory.accept(Part::new(PartTypeId(type_id), "P", 1.0, false));
        }
    }

    fn order(id: u32, pairs: &[(u32, u32)]) -> Order {
        Order::new(
            OrderId(id),
            format!("customer-{id}"),
            RequestedParts::from_pairs(pairs.iter().map(|&(t, q)| (PartTypeId(t), q))),
        )
    }

    #[test]
    fn duplicate_types_accumulate() {
        let requested = RequestedParts::from_pairs([
            (PartTypeId(1), 2),
            (PartTypeId(2), 1),
            (PartTypeId(1), 3),
        ]);
        assert_eq!(requested.quantity(PartTypeId(1)), 5);
        assert_eq!(requested.len(), 2);
        assert_eq!(requested.total_units(), 6);
    }

    #[test]
    fn with_fulfilled_is_a_new_value() {
        let pending = order(1, &[(1, 1)]);
        let done = pending.with_fulfilled();
        assert_eq!(pending.status(), OrderStatus::Pending);
        assert_eq!(done.status(), OrderStatus::Fulfilled);
        assert_eq!(done.id(), pending.id());
    }

    #[test]
    fn insufficient_stock_leaves_order_pending() {
        let mut inventory = Inventory::new();
        stock(&mut inventory, 1, 2);
        let mut book: OrderBook = [order(1, &[(1, 3)])].into_iter().collect();

        let outcome = match_orders(&mut book, &mut inventory);
        assert!(outcome.fulfilled.is_empty());
        assert_eq!(outcome.pending, vec![OrderId(1)]);
        assert_eq!(inventory.available(PartTypeId(1)), 2);

        stock(&mut inventory, 1, 1);
        let outcome = match_orders(&mut book, &mut inventory);
        assert_eq!(outcome.fulfilled, vec![OrderId(1)]);
        assert_eq!(outcome.units_consumed, 3);
        assert_eq!(inventory.available(PartTypeId(1)), 0);
        assert!(book.get(OrderId(1)).unwrap().is_fulfilled());
    }

    #[test]
    fn all_or_nothing_across_types() {
        let mut inventory = Inventory::new();
        stock(&mut inventory, 1, 5);
        stock(&mut inventory, 2, 1);
        let mut book: OrderBook = [order(1, &[(1, 2), (2, 2)])].into_iter().collect();

        match_orders(&mut book, &mut inventory);
        assert_eq!(inventory.available(PartTypeId(1)), 5);
        assert_eq!(inventory.available(PartTypeId(2)), 1);
        assert_eq!(book.pending().count(), 1);
    }

    #[test]
    fn matching_follows_book_order() {
        let mut inventory = Inventory::new();
        stock(&mut inventory, 1, 3);
        let mut book: OrderBook = [order(1, &[(1, 2)]), order(2, &[(1, 2)]), order(3, &[(1, 1)])]
            .into_iter()
            .collect();

        let outcome = match_orders(&mut book, &mut inventory);
        assert_eq!(outcome.fulfilled, vec![OrderId(1), OrderId(3)]);
        assert_eq!(outcome.pending, vec![OrderId(2)]);
        assert_eq!(inventory.available(PartTypeId(1)), 0);
    }

    #[test]
    fn rematching_skips_fulfilled_orders() {
        let mut inventory = Inventory::new();
        stock(&mut inventory, 1, 4);
        let mut book: OrderBook = [order(1, &[(1, 2)])].into_iter().collect();

        match_orders(&mut book, &mut inventory);
        assert_eq!(inventory.available(PartTypeId(1)), 2);

        let outcome = match_orders(&mut book, &mut inventory);
        assert!(outcome.fulfilled.is_empty());
        assert!(outcome.pending.is_empty());
        assert_eq!(inventory.available(PartTypeId(1)), 2);
    }

    #[test]
    fn unknown_part_type_keeps_order_pending() {
        let mut inventory = Inventory::new();
        let mut book: OrderBook = [order(1, &[(42, 1)])].into_iter().collect();
        let outcome = match_orders(&mut book, &mut inventory);
        assert_eq!(outcome.pending, vec![OrderId(1)]);
    }

    #[test]
    fn status_display_matches_report_words() {
        assert_eq!(OrderStatus::Pending.to_string(), "PENDING");
        assert_eq!(OrderStatus::Fulfilled.to_string(), "FULFILLED");
    }
}
