//! Panel rotation
//!
//! Rotation is implemented by the controller's memory access control
//! register (MADCTL), which changes the row/column scan order. The register
//! values used on the LCD HAT do not line up with the logical angle on their
//! own, so every frame is also counter-rotated before packing: the image is
//! turned counter-clockwise by the complement angle and the controller turns
//! it back.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Panel orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u16", into = "u16"))]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// All orientations in clockwise order
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Parse a rotation from degrees; only the four right angles are valid
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// Angle in degrees
    pub const fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// MADCTL register value for this orientation
    ///
    /// Bits: MY=0x80 (row order), MX=0x40 (column order), MV=0x20
    /// (row/column exchange), ML=0x10 (vertical refresh order).
    pub const fn madctl(self) -> u8 {
        match self {
            Rotation::Deg0 => 0x70,
            Rotation::Deg90 => 0x10,
            Rotation::Deg180 => 0xC0,
            Rotation::Deg270 => 0xA0,
        }
    }

    /// Counter-clockwise angle a frame is turned by before transmission
    pub const fn compensation(self) -> Rotation {
        match self {
            Rotation::Deg0 => Rotation::Deg0,
            Rotation::Deg90 => Rotation::Deg270,
            Rotation::Deg180 => Rotation::Deg180,
            Rotation::Deg270 => Rotation::Deg90,
        }
    }

    /// Next orientation clockwise (wraps 270 -> 0)
    pub fn next(self) -> Rotation {
        Rotation::ALL[(self as usize + 1) % 4]
    }

    /// Previous orientation (wraps 0 -> 270)
    pub fn prev(self) -> Rotation {
        Rotation::ALL[(self as usize + 3) % 4]
    }
}

impl TryFrom<u16> for Rotation {
    type Error = u16;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees).ok_or(degrees)
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl core::fmt::Display for Rotation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_madctl_table() {
        assert_eq!(Rotation::Deg0.madctl(), 0x70);
        assert_eq!(Rotation::Deg90.madctl(), 0x10);
        assert_eq!(Rotation::Deg180.madctl(), 0xC0);
        assert_eq!(Rotation::Deg270.madctl(), 0xA0);
    }

    #[test]
    fn test_compensation_is_complement() {
        for rotation in Rotation::ALL {
            let sum = rotation.degrees() + rotation.compensation().degrees();
            assert_eq!(sum % 360, 0);
        }
        assert_eq!(Rotation::Deg90.compensation(), Rotation::Deg270);
    }

    #[test]
    fn test_from_degrees_rejects_other_angles() {
        assert_eq!(Rotation::from_degrees(270), Some(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::try_from(360), Err(360));
    }

    #[test]
    fn test_next_prev_wrap() {
        assert_eq!(Rotation::Deg270.next(), Rotation::Deg0);
        assert_eq!(Rotation::Deg0.prev(), Rotation::Deg270);
        for rotation in Rotation::ALL {
            assert_eq!(rotation.next().prev(), rotation);
        }
    }
}
