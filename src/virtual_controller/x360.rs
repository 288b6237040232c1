use super::protocol::*;
use super::{Binding, InputSink, VirtualGamepad};
use crate::buttons::{DpadButtons, XusbButton};
use crate::config::{DpadMode, GamepadConfig};
use crate::error::Result;
use crate::report::{word_axis_from_float, XusbReport};

/// Triggers are declared on a wider axis than the report byte.
const TRIGGER_SCALE: i32 = 4;
/// Declared as 0..=1023; the largest value ever sent is 255 * 4 = 1020.
const TRIGGER_MAX: i32 = 1023;

const STICK: AbsRange = AbsRange::new(i16::MIN as i32, i16::MAX as i32).with_noise(16, 128);
const TRIGGER: AbsRange = AbsRange::new(0, TRIGGER_MAX);
const HAT: AbsRange = AbsRange::new(-1, 1);

/// Report bit to key code. GUIDE is left out on purpose: BTN_MODE is
/// declared but joystick layers on linux do not expose it as a button.
const BUTTON_KEYS: [(XusbButton, u16); 10] = [
    (XusbButton::A, BTN_SOUTH),
    (XusbButton::B, BTN_EAST),
    (XusbButton::X, BTN_NORTH),
    (XusbButton::Y, BTN_WEST),
    (XusbButton::LEFT_SHOULDER, BTN_TL),
    (XusbButton::RIGHT_SHOULDER, BTN_TR),
    (XusbButton::BACK, BTN_SELECT),
    (XusbButton::START, BTN_START),
    (XusbButton::LEFT_THUMB, BTN_THUMBL),
    (XusbButton::RIGHT_THUMB, BTN_THUMBR),
];

const DECLARED_KEYS: [u16; 11] = [
    BTN_SOUTH, BTN_EAST, BTN_NORTH, BTN_WEST, BTN_TL, BTN_TR, BTN_SELECT, BTN_START, BTN_MODE,
    BTN_THUMBL, BTN_THUMBR,
];

const DPAD_KEYS: [u16; 4] = [BTN_DPAD_UP, BTN_DPAD_DOWN, BTN_DPAD_LEFT, BTN_DPAD_RIGHT];

pub fn default_identity() -> DeviceIdentity {
    DeviceIdentity {
        name: "Xbox 360 Controller".to_string(),
        bustype: BUS_USB,
        vendor: 0x045e,  // Microsoft
        product: 0x028e, // Xbox 360 Controller
        version: 0x0110,
    }
}

/// Capabilities of the virtual Xbox 360 controller.
pub fn device_spec(config: &GamepadConfig) -> DeviceSpec {
    let mut spec = DeviceSpec::new(config.identity(default_identity()))
        .with_keys(&DECLARED_KEYS)
        .with_axis(ABS_X, STICK)
        .with_axis(ABS_Y, STICK)
        .with_axis(ABS_RX, STICK)
        .with_axis(ABS_RY, STICK)
        .with_axis(ABS_Z, TRIGGER)
        .with_axis(ABS_RZ, TRIGGER);

    match config.dpad_mode {
        DpadMode::Hat => {
            spec = spec.with_axis(ABS_HAT0X, HAT).with_axis(ABS_HAT0Y, HAT);
        }
        DpadMode::Buttons => {
            spec = spec.with_keys(&DPAD_KEYS);
        }
    }
    spec
}

/// Virtual Xbox 360 gamepad
pub struct VX360Gamepad<S: InputSink> {
    binding: Binding<S>,
    report: XusbReport,
    dpad_mode: DpadMode,
}

#[cfg(target_os = "linux")]
impl VX360Gamepad<super::UinputDevice> {
    /// Create a uinput-backed controller with the default identity.
    pub fn new() -> Result<Self> {
        Self::with_config(&GamepadConfig::default())
    }
}

impl<S: InputSink> VX360Gamepad<S> {
    /// Declare the device, register it and send the neutral report once.
    pub fn with_config(config: &GamepadConfig) -> Result<Self> {
        let binding = Binding::open(device_spec(config), config)?;
        let mut gamepad = Self {
            binding,
            report: XusbReport::default(),
            dpad_mode: config.dpad_mode,
        };
        gamepad.update()?;
        Ok(gamepad)
    }

    pub fn report(&self) -> &XusbReport {
        &self.report
    }

    pub fn dpad_mode(&self) -> DpadMode {
        self.dpad_mode
    }

    pub fn sink(&self) -> &S {
        self.binding.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.binding.sink_mut()
    }
}

impl<S: InputSink> VirtualGamepad for VX360Gamepad<S> {
    type Button = XusbButton;
    type Axis = i16;

    fn axis_from_float(value: f32) -> Result<i16> {
        word_axis_from_float(value)
    }

    fn press_button(&mut self, button: XusbButton) {
        self.report.buttons |= button;
    }

    fn release_button(&mut self, button: XusbButton) {
        self.report.buttons &= !button;
    }

    fn left_trigger(&mut self, value: u8) {
        self.report.left_trigger = value;
    }

    fn right_trigger(&mut self, value: u8) {
        self.report.right_trigger = value;
    }

    fn left_joystick(&mut self, x: i16, y: i16) {
        self.report.thumb_lx = x;
        self.report.thumb_ly = y;
    }

    fn right_joystick(&mut self, x: i16, y: i16) {
        self.report.thumb_rx = x;
        self.report.thumb_ry = y;
    }

    fn reset(&mut self) {
        self.report = XusbReport::default();
    }

    fn update(&mut self) -> Result<()> {
        let report = self.report;
        log::debug!("X360 update: {:?}", report);

        for (button, key) in BUTTON_KEYS {
            self.binding.key(key, report.buttons.contains(button))?;
        }

        let dpad = DpadButtons::from_xusb(report.buttons);
        if self.dpad_mode == DpadMode::Buttons {
            self.binding.dpad_keys(dpad)?;
        }

        self.binding.abs(ABS_X, report.thumb_lx.into())?;
        self.binding.abs(ABS_Y, report.thumb_ly.into())?;
        self.binding.abs(ABS_RX, report.thumb_rx.into())?;
        self.binding.abs(ABS_RY, report.thumb_ry.into())?;

        self.binding.abs(ABS_Z, i32::from(report.left_trigger) * TRIGGER_SCALE)?;
        self.binding.abs(ABS_RZ, i32::from(report.right_trigger) * TRIGGER_SCALE)?;

        if self.dpad_mode == DpadMode::Hat {
            self.binding.hat(dpad.hat())?;
        }

        self.binding.sync()
    }

    fn identity(&self) -> &DeviceIdentity {
        self.binding.identity()
    }

    fn set_vendor_id(&mut self, vendor: u16) {
        self.binding.set_vendor_id(vendor);
    }

    fn set_product_id(&mut self, product: u16) {
        self.binding.set_product_id(product);
    }

    fn close(self) -> Result<()> {
        self.binding.close()
    }
}
