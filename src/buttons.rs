//! Button and d-pad symbols for both controller families.
//!
//! The numeric values are the ones the XUSB and DS4 report formats use, so
//! they must never change.

use crate::error::VpadError;
use bitflags::bitflags;

bitflags! {
    /// Xbox 360 button bits. The d-pad is four ordinary bits here.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct XusbButton: u16 {
        const DPAD_UP        = 0x0001;
        const DPAD_DOWN      = 0x0002;
        const DPAD_LEFT      = 0x0004;
        const DPAD_RIGHT     = 0x0008;
        const START          = 0x0010;
        const BACK           = 0x0020;
        const LEFT_THUMB     = 0x0040;
        const RIGHT_THUMB    = 0x0080;
        const LEFT_SHOULDER  = 0x0100;
        const RIGHT_SHOULDER = 0x0200;
        const GUIDE          = 0x0400;
        const A              = 0x1000;
        const B              = 0x2000;
        const X              = 0x4000;
        const Y              = 0x8000;
    }
}

bitflags! {
    /// DualShock 4 button bits. The low nibble of the wire word is reserved
    /// for the d-pad direction, see [`Ds4DpadDirection`].
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Ds4Button: u16 {
        const THUMB_RIGHT    = 1 << 15;
        const THUMB_LEFT     = 1 << 14;
        const OPTIONS        = 1 << 13;
        const SHARE          = 1 << 12;
        const TRIGGER_RIGHT  = 1 << 11;
        const TRIGGER_LEFT   = 1 << 10;
        const SHOULDER_RIGHT = 1 << 9;
        const SHOULDER_LEFT  = 1 << 8;
        const TRIANGLE       = 1 << 7;
        const CIRCLE         = 1 << 6;
        const CROSS          = 1 << 5;
        const SQUARE         = 1 << 4;
    }
}

bitflags! {
    /// DualShock 4 buttons that live outside the main button word.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Ds4SpecialButton: u8 {
        const PS       = 1 << 0;
        const TOUCHPAD = 1 << 1;
    }
}

impl TryFrom<u16> for XusbButton {
    type Error = VpadError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Self::from_bits(raw).ok_or_else(|| {
            VpadError::ContractViolation(format!("0x{raw:04x} is not a valid Xbox 360 button mask"))
        })
    }
}

impl TryFrom<u16> for Ds4Button {
    type Error = VpadError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Self::from_bits(raw).ok_or_else(|| {
            VpadError::ContractViolation(format!("0x{raw:04x} is not a valid DualShock 4 button mask"))
        })
    }
}

impl TryFrom<u8> for Ds4SpecialButton {
    type Error = VpadError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::from_bits(raw).ok_or_else(|| {
            VpadError::ContractViolation(format!(
                "0x{raw:02x} is not a valid DualShock 4 special button mask"
            ))
        })
    }
}

/// D-pad position of a DualShock 4, stored as its 4-bit wire code.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ds4DpadDirection {
    North = 0x0,
    NorthEast = 0x1,
    East = 0x2,
    SouthEast = 0x3,
    South = 0x4,
    SouthWest = 0x5,
    West = 0x6,
    NorthWest = 0x7,
    #[default]
    None = 0x8,
}

impl Ds4DpadDirection {
    pub const ALL: [Self; 9] = [
        Self::None,
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Hat deltas `(dx, dy)` in evdev convention: x grows right, y grows down.
    pub fn hat(self) -> (i32, i32) {
        match self {
            Self::None => (0, 0),
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }

    /// Which of up/down/left/right are held for this direction.
    pub fn pressed(self) -> DpadButtons {
        let (dx, dy) = self.hat();
        DpadButtons {
            up: dy < 0,
            down: dy > 0,
            left: dx < 0,
            right: dx > 0,
        }
    }
}

impl TryFrom<u8> for Ds4DpadDirection {
    type Error = VpadError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|d| d.code() == code)
            .ok_or_else(|| VpadError::ContractViolation(format!("{code} is not a d-pad direction")))
    }
}

/// Four-button view of a d-pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DpadButtons {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DpadButtons {
    pub fn from_xusb(buttons: XusbButton) -> Self {
        Self {
            up: buttons.contains(XusbButton::DPAD_UP),
            down: buttons.contains(XusbButton::DPAD_DOWN),
            left: buttons.contains(XusbButton::DPAD_LEFT),
            right: buttons.contains(XusbButton::DPAD_RIGHT),
        }
    }

    /// Opposing directions cancel out.
    pub fn hat(self) -> (i32, i32) {
        (
            self.right as i32 - self.left as i32,
            self.down as i32 - self.up as i32,
        )
    }
}
