use crate::sequence::Unit;
use std::collections::VecDeque;

/// Scales how long one unit of stock lasts: a unit of length L drains in
/// `L * L * CONSUMPTION_CONSTANT` simulated seconds at multiplier 1.0.
pub const CONSUMPTION_CONSTANT: f64 = 0.5;

/// One completed unit sitting in the market's stock.
#[derive(Clone, Debug, PartialEq)]
pub struct InventoryEntry {
    pub unit: Unit,
    /// Drops from `unit.len()` to 0, at which point the entry is removed.
    pub remaining: f64,
}

impl InventoryEntry {
    pub fn new(unit: Unit) -> Self {
        let remaining = unit.len() as f64;
        Self { unit, remaining }
    }
}

/// FIFO stock queue. Consumption is strictly serial: only the head entry
/// decays per tick, entries behind it are inert until they reach the front.
#[derive(Debug, Default)]
pub struct Inventory {
    entries: VecDeque<InventoryEntry>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn push(&mut self, entry: InventoryEntry) {
        self.entries.push_back(entry);
    }

    /// Decays the head entry for one tick. The drained overshoot is
    /// discarded, not carried into the next entry.
    pub fn tick(&mut self, dt_secs: f64, speed_multiplier: f64) {
        let Some(head) = self.entries.front_mut() else {
            return;
        };

        let decay =
            dt_secs / (head.unit.len() as f64 * CONSUMPTION_CONSTANT) * speed_multiplier;
        head.remaining -= decay;

        if head.remaining <= 0.0 {
            self.entries.pop_front();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::TICK_SECS;

    #[test]
    fn push_starts_full() {
        let mut inventory = Inventory::new();
        inventory.push(InventoryEntry::new(Unit::new(3)));

        let head = inventory.iter().next().unwrap();
        assert_eq!(head.remaining, 4.0);
        assert_eq!(head.unit.len(), 4);
    }

    #[test]
    fn tick_on_empty_is_a_noop() {
        let mut inventory = Inventory::new();
        inventory.tick(TICK_SECS, 1.0);
        assert!(inventory.is_empty());
    }

    #[test]
    fn only_the_head_decays() {
        let mut inventory = Inventory::new();
        inventory.push(InventoryEntry::new(Unit::new(1)));
        inventory.push(InventoryEntry::new(Unit::new(4)));

        inventory.tick(TICK_SECS, 1.0);

        let entries: Vec<_> = inventory.iter().collect();
        assert!(entries[0].remaining < 2.0);
        assert_eq!(entries[1].remaining, 5.0);
    }

    #[test]
    fn drained_head_pops_without_reordering() {
        let mut inventory = Inventory::new();
        inventory.push(InventoryEntry::new(Unit::new(1)));
        inventory.push(InventoryEntry::new(Unit::new(2)));

        // 古米 drains in len^2 * 0.5 = 2 seconds at multiplier 1.0
        let mut ticks = 0u32;
        while inventory.len() == 2 {
            inventory.tick(TICK_SECS, 1.0);
            ticks += 1;
            assert!(ticks < 1_000, "head entry should have drained");
        }
        assert!(ticks as f64 * TICK_SECS >= 2.0 - TICK_SECS);

        let head = inventory.iter().next().unwrap();
        assert_eq!(head.unit.len(), 3);
        // the successor had not started draining while it was queued
        assert_eq!(head.remaining, 3.0);
    }

    #[test]
    fn remaining_is_never_negative_once_persisted() {
        let mut inventory = Inventory::new();
        inventory.push(InventoryEntry::new(Unit::new(1)));

        for _ in 0..100_000 {
            inventory.tick(TICK_SECS, 4.0);
            for entry in inventory.iter() {
                assert!(entry.remaining > 0.0);
            }
            if inventory.is_empty() {
                break;
            }
        }
        assert!(inventory.is_empty());
    }

    #[test]
    fn multiplier_speeds_up_decay() {
        let mut slow = Inventory::new();
        let mut fast = Inventory::new();
        slow.push(InventoryEntry::new(Unit::new(2)));
        fast.push(InventoryEntry::new(Unit::new(2)));

        slow.tick(TICK_SECS, 1.0);
        fast.tick(TICK_SECS, 2.0);

        let slow_head = slow.iter().next().unwrap().remaining;
        let fast_head = fast.iter().next().unwrap().remaining;
        assert!(fast_head < slow_head);

        let slow_loss = 3.0 - slow_head;
        let fast_loss = 3.0 - fast_head;
        assert!((fast_loss - 2.0 * slow_loss).abs() < 1e-12);
    }
}
