use std::fmt::{self, Display, Formatter};

use crate::models::CardType;

pub const EARLY_RING_MAX: i32 = 3;
pub const LATE_RING_MIN: i32 = 7;

/// Coarse draft stage. Rings outside 1..=9 fall into the nearest bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingStage {
    Early,
    Mid,
    Late,
}

impl RingStage {
    pub fn of(ring: i32) -> Self {
        if ring <= EARLY_RING_MAX {
            RingStage::Early
        } else if ring >= LATE_RING_MIN {
            RingStage::Late
        } else {
            RingStage::Mid
        }
    }
}

impl Display for RingStage {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            RingStage::Early => write!(f, "Early"),
            RingStage::Mid => write!(f, "Mid"),
            RingStage::Late => write!(f, "Late"),
        }
    }
}

/// Value curve: units matter early, spells and equipment late.
pub fn ring_delta(ring: i32, card_type: &CardType) -> i32 {
    match (RingStage::of(ring), card_type) {
        (RingStage::Early, CardType::Unit) => 5,
        (RingStage::Late, CardType::Spell) => 5,
        (RingStage::Late, CardType::Equipment) => 3,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets() {
        assert_eq!(RingStage::of(1), RingStage::Early);
        assert_eq!(RingStage::of(3), RingStage::Early);
        assert_eq!(RingStage::of(4), RingStage::Mid);
        assert_eq!(RingStage::of(6), RingStage::Mid);
        assert_eq!(RingStage::of(7), RingStage::Late);
        assert_eq!(RingStage::of(9), RingStage::Late);
    }

    #[test]
    fn test_out_of_range_rings_use_nearest_bucket() {
        assert_eq!(RingStage::of(-4), RingStage::Early);
        assert_eq!(RingStage::of(0), RingStage::Early);
        assert_eq!(RingStage::of(42), RingStage::Late);
    }

    #[test]
    fn test_ring_delta_table() {
        assert_eq!(ring_delta(1, &CardType::Unit), 5);
        assert_eq!(ring_delta(1, &CardType::Spell), 0);
        assert_eq!(ring_delta(5, &CardType::Unit), 0);
        assert_eq!(ring_delta(8, &CardType::Spell), 5);
        assert_eq!(ring_delta(8, &CardType::Equipment), 3);
        assert_eq!(ring_delta(8, &CardType::Unit), 0);
        assert_eq!(ring_delta(8, &CardType::Other("Room".to_string())), 0);
    }
}
