//! Production buffer between the conveyors and the stockroom.

use crate::part::Part;

/// Holding bin for units that left a conveyor and await the end-of-day drain.
///
/// LIFO: the drain pops the most recently pushed unit first. Drain order has
/// no effect on inventory totals.
#[derive(Debug, Clone, Default)]
pub struct ProductionBuffer {
    parts: Vec<Part>,
}

impl ProductionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, part: Part) {
        self.parts.push(part);
    }

    pub fn pop(&mut self) -> Option<Part> {
        self.parts.pop()
    }

    pub fn peek(&self) -> Option<&Part> {
        self.parts.last()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Pop every unit, newest first.
    pub fn drain(&mut self) -> impl Iterator<Item = Part> + '_ {
        self.parts.drain(..).rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::PartTypeId;

    fn part(n: u32) -> Part {
        Part::new(PartTypeId(n), "P", 1.0, false)
    }

    #[test]
    fn pops_newest_first() {
        let mut buffer = ProductionBuffer::new();
        buffer.push(part(1));
        buffer.push(part(2));
        assert_eq!(buffer.peek().map(Part::type_id), Some(PartTypeId(2)));
        assert_eq!(buffer.pop().map(|p| p.type_id()), Some(PartTypeId(2)));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn drain_empties_in_lifo_order() {
        let mut buffer = ProductionBuffer::new();
        for n in 1..=3 {
            buffer.push(part(n));
        }
        let ids: Vec<u32> = buffer.drain().map(|p| p.type_id().0).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert!(buffer.is_empty());
    }
}
