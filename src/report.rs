use crate::buttons::{Ds4Button, Ds4DpadDirection, Ds4SpecialButton, XusbButton};
use crate::error::{Result, VpadError};

/// Neutral stick position of a DualShock 4 axis.
pub const DS4_AXIS_CENTER: u8 = 0x80;

/// Xbox 360 input report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XusbReport {
    pub buttons: XusbButton,
    /// 0 to 255, 0 released
    pub left_trigger: u8,
    pub right_trigger: u8,
    /// -32768 to 32767, 0 centered
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

/// DualShock 4 input report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ds4Report {
    /// 0 to 255, 128 centered
    pub thumb_lx: u8,
    pub thumb_ly: u8,
    pub thumb_rx: u8,
    pub thumb_ry: u8,
    pub buttons: Ds4Button,
    pub special: Ds4SpecialButton,
    pub dpad: Ds4DpadDirection,
    pub trigger_l: u8,
    pub trigger_r: u8,
}

impl Default for Ds4Report {
    fn default() -> Self {
        Self {
            thumb_lx: DS4_AXIS_CENTER,
            thumb_ly: DS4_AXIS_CENTER,
            thumb_rx: DS4_AXIS_CENTER,
            thumb_ry: DS4_AXIS_CENTER,
            buttons: Ds4Button::empty(),
            special: Ds4SpecialButton::empty(),
            dpad: Ds4DpadDirection::None,
            trigger_l: 0,
            trigger_r: 0,
        }
    }
}

impl Ds4Report {
    /// Button word as the DS4 wire format carries it, d-pad code in the low nibble.
    pub fn wire_buttons(&self) -> u16 {
        (self.buttons.bits() & !0x000f) | u16::from(self.dpad.code())
    }
}

fn check_range(what: &str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_nan() || value < min || value > max {
        return Err(VpadError::ContractViolation(format!(
            "{what} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

/// 0.0..=1.0 onto a trigger byte
pub fn trigger_from_float(value: f32) -> Result<u8> {
    check_range("trigger", value, 0.0, 1.0)?;
    Ok((value * 255.0).round() as u8)
}

/// -1.0..=1.0 onto a signed 16 bit stick axis
pub fn word_axis_from_float(value: f32) -> Result<i16> {
    check_range("stick axis", value, -1.0, 1.0)?;
    Ok((value * i16::MAX as f32).round() as i16)
}

/// -1.0..=1.0 onto an unsigned 8 bit stick axis centered at 128
pub fn byte_axis_from_float(value: f32) -> Result<u8> {
    check_range("stick axis", value, -1.0, 1.0)?;
    Ok((DS4_AXIS_CENTER as i32 + (value * 127.0).round() as i32) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_reports() {
        let x = XusbReport::default();
        assert!(x.buttons.is_empty());
        assert_eq!((x.thumb_lx, x.thumb_ly, x.thumb_rx, x.thumb_ry), (0, 0, 0, 0));
        assert_eq!((x.left_trigger, x.right_trigger), (0, 0));

        let d = Ds4Report::default();
        assert_eq!((d.thumb_lx, d.thumb_ly, d.thumb_rx, d.thumb_ry), (128, 128, 128, 128));
        assert_eq!(d.dpad, Ds4DpadDirection::None);
        assert_eq!(d.wire_buttons(), 0x0008);
    }

    #[test]
    fn wire_buttons_pack_the_dpad() {
        let report = Ds4Report {
            buttons: Ds4Button::CROSS | Ds4Button::THUMB_RIGHT,
            dpad: Ds4DpadDirection::SouthWest,
            ..Default::default()
        };
        assert_eq!(report.wire_buttons(), 0x8025);
    }

    #[test]
    fn trigger_scaling() {
        assert_eq!(trigger_from_float(0.0).unwrap(), 0);
        assert_eq!(trigger_from_float(0.5).unwrap(), 128);
        assert_eq!(trigger_from_float(1.0).unwrap(), 255);
        assert_eq!(trigger_from_float(0.3).unwrap(), 77);
    }

    #[test]
    fn word_axis_scaling() {
        assert_eq!(word_axis_from_float(-1.0).unwrap(), -32767);
        assert_eq!(word_axis_from_float(0.0).unwrap(), 0);
        assert_eq!(word_axis_from_float(0.5).unwrap(), 16384);
        assert_eq!(word_axis_from_float(1.0).unwrap(), 32767);
    }

    #[test]
    fn byte_axis_scaling() {
        assert_eq!(byte_axis_from_float(-1.0).unwrap(), 1);
        assert_eq!(byte_axis_from_float(-0.5).unwrap(), 64);
        assert_eq!(byte_axis_from_float(0.0).unwrap(), 128);
        assert_eq!(byte_axis_from_float(0.5).unwrap(), 192);
        assert_eq!(byte_axis_from_float(1.0).unwrap(), 255);
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert!(matches!(trigger_from_float(-0.01), Err(VpadError::ContractViolation(_))));
        assert!(trigger_from_float(1.01).is_err());
        assert!(trigger_from_float(f32::NAN).is_err());
        assert!(word_axis_from_float(-1.5).is_err());
        assert!(byte_axis_from_float(f32::INFINITY).is_err());
    }
}
