//! Wire frames understood by the actuator controller.
//!
//! Every frame is a single newline-terminated ASCII line:
//! `m<channel> <value>` sets a motor's PWM level, `n<HHHH>` sets the
//! relay bank from a 16-bit mask in uppercase hex.

use std::fmt;

pub const MAX_RELAYS: u8 = 16;

/// Fixed-width set of relays to switch on during one aggregation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayMask {
    bits: u16,
    width: u8,
}

impl RelayMask {
    pub fn empty(width: u8) -> Self {
        Self {
            bits: 0,
            width: width.clamp(1, MAX_RELAYS),
        }
    }

    /// Indices outside the mask width are ignored.
    pub fn set(&mut self, index: u8) {
        if index < self.width {
            self.bits |= 1 << index;
        }
    }

    pub fn is_set(&self, index: u8) -> bool {
        index < self.width && self.bits & (1 << index) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn bits(&self) -> u16 {
        self.bits
    }

    pub fn width(&self) -> u8 {
        self.width
    }
}

impl fmt::Display for RelayMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.bits, width = self.width as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFrame {
    MotorSet { channel: u8, value: u8 },
    RelayMask(RelayMask),
}

impl CommandFrame {
    pub fn to_wire(&self) -> String {
        match self {
            CommandFrame::MotorSet { channel, value } => format!("m{channel} {value}\n"),
            CommandFrame::RelayMask(mask) => format!("n{:04X}\n", mask.bits()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motor_frame_wire_text() {
        let frame = CommandFrame::MotorSet {
            channel: 3,
            value: 64,
        };
        assert_eq!(frame.to_wire(), "m3 64\n");
    }

    #[test]
    fn relay_frame_is_four_uppercase_hex_digits() {
        let mut mask = RelayMask::empty(16);
        for i in [1, 3, 5] {
            mask.set(i);
        }
        assert_eq!(mask.bits(), 0x002A);
        assert_eq!(CommandFrame::RelayMask(mask).to_wire(), "n002A\n");

        let mut high = RelayMask::empty(16);
        high.set(15);
        high.set(10);
        assert_eq!(CommandFrame::RelayMask(high).to_wire(), "n8400\n");
    }

    #[test]
    fn empty_mask_renders_zeroes() {
        let mask = RelayMask::empty(16);
        assert!(mask.is_empty());
        assert_eq!(CommandFrame::RelayMask(mask).to_wire(), "n0000\n");
        assert_eq!(mask.to_string(), "0000000000000000");
    }

    #[test]
    fn set_outside_width_is_ignored() {
        let mut mask = RelayMask::empty(8);
        mask.set(8);
        mask.set(15);
        assert!(mask.is_empty());
        mask.set(7);
        assert!(mask.is_set(7));
        assert_eq!(mask.to_string(), "10000000");
    }

    #[test]
    fn width_is_clamped() {
        assert_eq!(RelayMask::empty(0).width(), 1);
        assert_eq!(RelayMask::empty(40).width(), 16);
    }
}
