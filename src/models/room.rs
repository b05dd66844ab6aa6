//! Room model.
//!
//! Rooms carry a nominal seating capacity. The capacity usable in a run is
//! lower when a seating gap is configured (empty seats between candidates),
//! so it is derived per call from the gap rather than stored on the room.

use serde::{Deserialize, Serialize};

/// A physical examination room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Nominal number of seats.
    pub capacity: u32,
    /// Building / floor description.
    pub location: Option<String>,
}

impl Room {
    /// Creates a room with the given nominal capacity.
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity,
            location: None,
        }
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Seats usable when `gap` seats are left empty between candidates.
    ///
    /// `floor(capacity / (gap + 1))`.
    #[inline]
    pub fn effective_capacity(&self, gap: u32) -> u32 {
        self.capacity / gap.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_builder() {
        let r = Room::new("R1", 120)
            .with_name("Amphi A")
            .with_location("Building 2");

        assert_eq!(r.id, "R1");
        assert_eq!(r.name, "Amphi A");
        assert_eq!(r.capacity, 120);
        assert_eq!(r.location.as_deref(), Some("Building 2"));
    }

    #[test]
    fn test_effective_capacity_scales_with_gap() {
        let r = Room::new("R1", 40);
        assert_eq!(r.effective_capacity(0), 40);
        assert_eq!(r.effective_capacity(1), 20);
        assert_eq!(r.effective_capacity(2), 13);
    }

    #[test]
    fn test_effective_capacity_small_room() {
        let r = Room::new("R1", 1);
        assert_eq!(r.effective_capacity(1), 0);
        assert_eq!(Room::new("R0", 0).effective_capacity(0), 0);
    }

    #[test]
    fn test_effective_capacity_huge_gap() {
        let r = Room::new("R1", 100);
        assert_eq!(r.effective_capacity(u32::MAX), 0);
    }
}
