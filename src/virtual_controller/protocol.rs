//! evdev event vocabulary and the capability declaration a sink is built from.

use crate::error::{Result, VpadError};

// Event types
pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_ABS: u16 = 0x03;

pub const SYN_REPORT: u16 = 0x00;

// Gamepad buttons as linux event codes
pub const BTN_SOUTH: u16 = 0x130;
pub const BTN_EAST: u16 = 0x131;
pub const BTN_NORTH: u16 = 0x133;
pub const BTN_WEST: u16 = 0x134;
pub const BTN_TL: u16 = 0x136;
pub const BTN_TR: u16 = 0x137;
pub const BTN_TL2: u16 = 0x138;
pub const BTN_TR2: u16 = 0x139;
pub const BTN_SELECT: u16 = 0x13a;
pub const BTN_START: u16 = 0x13b;
pub const BTN_MODE: u16 = 0x13c;
pub const BTN_THUMBL: u16 = 0x13d;
pub const BTN_THUMBR: u16 = 0x13e;
pub const BTN_DPAD_UP: u16 = 0x220;
pub const BTN_DPAD_DOWN: u16 = 0x221;
pub const BTN_DPAD_LEFT: u16 = 0x222;
pub const BTN_DPAD_RIGHT: u16 = 0x223;

// Absolute axes
pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_Z: u16 = 0x02;
pub const ABS_RX: u16 = 0x03;
pub const ABS_RY: u16 = 0x04;
pub const ABS_RZ: u16 = 0x05;
pub const ABS_HAT0X: u16 = 0x10;
pub const ABS_HAT0Y: u16 = 0x11;

pub const BUS_USB: u16 = 0x03;

/// One discrete event pushed to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key { code: u16, pressed: bool },
    Abs { code: u16, value: i32 },
    /// Marks the end of a report
    Sync,
}

impl InputEvent {
    pub fn key(code: u16, pressed: bool) -> Self {
        Self::Key { code, pressed }
    }

    pub fn abs(code: u16, value: i32) -> Self {
        Self::Abs { code, value }
    }

    pub fn type_(&self) -> u16 {
        match self {
            Self::Key { .. } => EV_KEY,
            Self::Abs { .. } => EV_ABS,
            Self::Sync => EV_SYN,
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::Key { code, .. } | Self::Abs { code, .. } => *code,
            Self::Sync => SYN_REPORT,
        }
    }

    pub fn value(&self) -> i32 {
        match self {
            Self::Key { pressed, .. } => *pressed as i32,
            Self::Abs { value, .. } => *value,
            Self::Sync => 0,
        }
    }
}

/// Declared range of an absolute axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsRange {
    pub min: i32,
    pub max: i32,
    pub fuzz: i32,
    pub flat: i32,
    /// Resting value
    pub value: i32,
}

impl AbsRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self {
            min,
            max,
            fuzz: 0,
            flat: 0,
            value: 0,
        }
    }

    pub const fn with_noise(mut self, fuzz: i32, flat: i32) -> Self {
        self.fuzz = fuzz;
        self.flat = flat;
        self
    }

    pub const fn resting_at(mut self, value: i32) -> Self {
        self.value = value;
        self
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Map a raw value to -1.0..1.0 the way joystick libraries report it
    pub fn normalize(&self, raw: i32) -> f64 {
        let span = (self.max - self.min) as f64;
        2.0 * (raw - self.min) as f64 / span - 1.0
    }
}

/// How the device presents itself to the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub name: String,
    pub bustype: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

/// Everything a device exposes, fixed before the handle is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSpec {
    pub identity: DeviceIdentity,
    pub keys: Vec<u16>,
    pub axes: Vec<(u16, AbsRange)>,
}

impl DeviceSpec {
    pub fn new(identity: DeviceIdentity) -> Self {
        Self {
            identity,
            keys: Vec::new(),
            axes: Vec::new(),
        }
    }

    pub fn with_keys(mut self, keys: &[u16]) -> Self {
        self.keys.extend_from_slice(keys);
        self
    }

    pub fn with_axis(mut self, code: u16, range: AbsRange) -> Self {
        self.axes.push((code, range));
        self
    }

    pub fn axis(&self, code: u16) -> Option<&AbsRange> {
        self.axes.iter().find(|(c, _)| *c == code).map(|(_, r)| r)
    }

    pub fn has_key(&self, code: u16) -> bool {
        self.keys.contains(&code)
    }

    pub fn button_count(&self) -> usize {
        self.keys.len()
    }

    /// Absolute axes excluding hats
    pub fn axis_count(&self) -> usize {
        self.axes.iter().filter(|(code, _)| !is_hat(*code)).count()
    }

    pub fn hat_count(&self) -> usize {
        self.axes.iter().filter(|(code, _)| *code == ABS_HAT0X).count()
    }

    /// Reject events the device never declared.
    pub fn check(&self, event: &InputEvent) -> Result<()> {
        match *event {
            InputEvent::Key { code, .. } if !self.has_key(code) => Err(
                VpadError::CapabilityUnavailable(format!("key 0x{code:03x} was not declared")),
            ),
            InputEvent::Abs { code, value } => match self.axis(code) {
                None => Err(VpadError::CapabilityUnavailable(format!(
                    "axis 0x{code:02x} was not declared"
                ))),
                Some(range) if !range.contains(value) => Err(VpadError::ContractViolation(format!(
                    "value {value} outside [{}, {}] for axis 0x{code:02x}",
                    range.min, range.max
                ))),
                Some(_) => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

fn is_hat(code: u16) -> bool {
    (ABS_HAT0X..=0x17).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> DeviceSpec {
        DeviceSpec::new(DeviceIdentity {
            name: "test pad".into(),
            bustype: BUS_USB,
            vendor: 1,
            product: 2,
            version: 3,
        })
        .with_keys(&[BTN_SOUTH, BTN_EAST])
        .with_axis(ABS_X, AbsRange::new(-32768, 32767).with_noise(16, 128))
        .with_axis(ABS_Z, AbsRange::new(0, 255))
        .with_axis(ABS_HAT0X, AbsRange::new(-1, 1))
        .with_axis(ABS_HAT0Y, AbsRange::new(-1, 1))
    }

    #[test]
    fn raw_fields() {
        let e = InputEvent::key(BTN_EAST, true);
        assert_eq!((e.type_(), e.code(), e.value()), (EV_KEY, BTN_EAST, 1));
        let e = InputEvent::abs(ABS_Y, -7);
        assert_eq!((e.type_(), e.code(), e.value()), (EV_ABS, ABS_Y, -7));
        let e = InputEvent::Sync;
        assert_eq!((e.type_(), e.code(), e.value()), (EV_SYN, SYN_REPORT, 0));
    }

    #[test]
    fn counts() {
        let spec = spec();
        assert_eq!(spec.button_count(), 2);
        assert_eq!(spec.axis_count(), 2);
        assert_eq!(spec.hat_count(), 1);
        assert_eq!(spec.axis(ABS_X).unwrap().flat, 128);
    }

    #[test]
    fn undeclared_events_are_rejected() {
        let spec = spec();
        assert!(spec.check(&InputEvent::key(BTN_SOUTH, true)).is_ok());
        assert!(matches!(
            spec.check(&InputEvent::key(BTN_MODE, true)),
            Err(VpadError::CapabilityUnavailable(_))
        ));
        assert!(matches!(
            spec.check(&InputEvent::abs(ABS_RZ, 0)),
            Err(VpadError::CapabilityUnavailable(_))
        ));
        assert!(matches!(
            spec.check(&InputEvent::abs(ABS_Z, 256)),
            Err(VpadError::ContractViolation(_))
        ));
        assert!(spec.check(&InputEvent::Sync).is_ok());
    }

    #[test]
    fn normalize_matches_joystick_libraries() {
        let trigger = AbsRange::new(0, 255);
        assert_eq!(trigger.normalize(0), -1.0);
        assert_eq!(trigger.normalize(255), 1.0);
        assert!((trigger.normalize(127) - 0.0).abs() < 0.01);

        let stick = AbsRange::new(-32768, 32767);
        assert!((stick.normalize(0)).abs() < 0.001);
    }
}
