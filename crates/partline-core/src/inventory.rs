//! Accepted stock and defect counts, keyed by part type.

use crate::id::PartTypeId;
use crate::part::Part;
use std::collections::{HashMap, VecDeque};

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Accepted units per part type, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    stock: HashMap<PartTypeId, VecDeque<Part>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a part type known with zero stock. Existing stock is kept.
    pub fn register(&mut self, type_id: PartTypeId) {
        self.stock.entry(type_id).or_default();
    }

    /// Append an accepted unit to the back of its type's sequence.
    pub fn accept(&mut self, part: Part) {
        self.stock.entry(part.type_id()).or_default().push_back(part);
    }

    /// Units in stock for a type. Unknown types have none.
    pub fn available(&self, type_id: PartTypeId) -> usize {
        self.stock.get(&type_id).map_or(0, VecDeque::len)
    }

    /// True when every `(type, quantity)` request is covered by stock.
    pub fn can_supply(&self, request: impl IntoIterator<Item = (PartTypeId, u32)>) -> bool {
        request
            .into_iter()
            .all(|(type_id, quantity)| self.available(type_id) >= quantity as usize)
    }

    /// Remove `quantity` units from the front (oldest first).
    ///
    /// Returns `None` without touching stock if fewer than `quantity` are
    /// available.
    #[must_use = "returns the withdrawn units, or None if stock was insufficient"]
    pub fn withdraw(&mut self, type_id: PartTypeId, quantity: u32) -> Option<Vec<Part>> {
        if quantity == 0 {
            return Some(Vec::new());
        }
        let queue = self.stock.get_mut(&type_id)?;
        if queue.len() < quantity as usize {
            return None;
        }
        Some(queue.drain(..quantity as usize).collect())
    }

    /// Units of a type in stock order, oldest first.
    pub fn parts(&self, type_id: PartTypeId) -> impl Iterator<Item = &Part> + '_ {
        self.stock.get(&type_id).into_iter().flatten()
    }

    /// Known part types, in ascending id order.
    pub fn types(&self) -> Vec<PartTypeId> {
        let mut types: Vec<PartTypeId> = self.stock.keys().copied().collect();
        types.sort();
        types
    }

    /// Total units in stock across all types.
    pub fn total(&self) -> usize {
        self.stock.values().map(VecDeque::len).sum()
    }
}

// ---------------------------------------------------------------------------
// Defect ledger
// ---------------------------------------------------------------------------

/// Count of defective units discarded per part type. Only ever increases.
#[derive(Debug, Clone, Default)]
pub struct DefectLedger {
    counts: HashMap<PartTypeId, u64>,
}

impl DefectLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a part type known with a zero count.
    pub fn register(&mut self, type_id: PartTypeId) {
        self.counts.entry(type_id).or_insert(0);
    }

    pub fn record(&mut self, type_id: PartTypeId) {
        *self.counts.entry(type_id).or_insert(0) += 1;
    }

    pub fn count(&self, type_id: PartTypeId) -> u64 {
        self.counts.get(&type_id).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

// ---------------------------------------------------------------------------
// Stockroom
// ---------------------------------------------------------------------------

/// Where a drained unit ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Accepted,
    Discarded,
}

/// Inventory plus defect ledger: the destination of every drained unit.
#[derive(Debug, Clone, Default)]
pub struct Stockroom {
    pub inventory: Inventory,
    pub defects: DefectLedger,
}

impl Stockroom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a part type in both the inventory and the ledger.
    pub fn register(&mut self, type_id: PartTypeId) {
        self.inventory.register(type_id);
        self.defects.register(type_id);
    }

    /// Defective units bump the ledger; everything else goes into stock.
    pub fn store(&mut self, part: Part) -> Disposition {
        if part.is_defective() {
            self.defects.record(part.type_id());
            Disposition::Discarded
        } else {
            self.inventory.accept(part);
            Disposition::Accepted
        }
    }
}
