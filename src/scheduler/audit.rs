//! Room utilization audit.
//!
//! Read-only diagnostics over a finished booking state.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Slot utilization | rooms occupied in the slot / total rooms |
//! | Average utilization | mean slot utilization over the grid |
//! | Low-utilization slots | slots strictly below a threshold |
//!
//! No remedial action is taken on low utilization.

use std::collections::BTreeMap;

use tracing::debug;

use super::booking::BookingRegistry;
use crate::models::{SlotGrid, SlotKey};

/// Per-slot room occupancy of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtilizationReport {
    by_slot: BTreeMap<SlotKey, f64>,
}

impl UtilizationReport {
    /// Computes occupancy for every slot of the grid.
    ///
    /// With no rooms, every slot reports `0.0`.
    pub fn from_registry(grid: &SlotGrid, registry: &BookingRegistry, room_count: usize) -> Self {
        let by_slot = grid
            .slots()
            .map(|slot| {
                let ratio = if room_count == 0 {
                    0.0
                } else {
                    registry.rooms_used(slot) as f64 / room_count as f64
                };
                (slot, ratio)
            })
            .collect();

        Self { by_slot }
    }

    /// Occupancy of one slot, if it is on the grid.
    pub fn ratio(&self, slot: SlotKey) -> Option<f64> {
        self.by_slot.get(&slot).copied()
    }

    /// Slot → occupancy, in calendar order.
    pub fn by_slot(&self) -> &BTreeMap<SlotKey, f64> {
        &self.by_slot
    }

    /// Mean occupancy over all slots (`0.0` for an empty grid).
    pub fn average(&self) -> f64 {
        if self.by_slot.is_empty() {
            0.0
        } else {
            self.by_slot.values().sum::<f64>() / self.by_slot.len() as f64
        }
    }

    /// Slots whose occupancy is strictly below `threshold`.
    pub fn low_utilization(&self, threshold: f64) -> Vec<(SlotKey, f64)> {
        self.by_slot
            .iter()
            .filter(|&(_, &ratio)| ratio < threshold)
            .map(|(&slot, &ratio)| (slot, ratio))
            .collect()
    }

    /// Emits one debug line per under-used slot.
    pub fn log_low_utilization(&self, threshold: f64) {
        for (slot, ratio) in self.low_utilization(threshold) {
            debug!(
                date = %slot.date,
                window = %slot.time_window().label(),
                utilization = ratio,
                "low room utilization"
            );
        }
    }

    /// Occupancy keyed by `"{YYYY-MM-DD}-{HH:MM}"` (date and window start).
    pub fn to_label_map(&self) -> BTreeMap<String, f64> {
        self.by_slot
            .iter()
            .map(|(slot, &ratio)| {
                let key = format!(
                    "{}-{}",
                    slot.date.format("%Y-%m-%d"),
                    slot.time_window().label()
                );
                (key, ratio)
            })
            .collect()
    }
}
