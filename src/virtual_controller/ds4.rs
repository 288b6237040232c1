use super::protocol::*;
use super::{Binding, InputSink, VirtualGamepad};
use crate::buttons::{Ds4Button, Ds4DpadDirection, Ds4SpecialButton};
use crate::config::{DpadMode, GamepadConfig};
use crate::error::Result;
use crate::report::{byte_axis_from_float, Ds4Report, DS4_AXIS_CENTER};

const STICK: AbsRange = AbsRange::new(0, 255).resting_at(DS4_AXIS_CENTER as i32);
const TRIGGER: AbsRange = AbsRange::new(0, 255);
const HAT: AbsRange = AbsRange::new(-1, 1);

/// TRIGGER_LEFT/TRIGGER_RIGHT have BTN_TL2/BTN_TR2 declared but are not
/// forwarded; the analog triggers carry that information.
const BUTTON_KEYS: [(Ds4Button, u16); 10] = [
    (Ds4Button::CROSS, BTN_SOUTH),
    (Ds4Button::CIRCLE, BTN_EAST),
    (Ds4Button::TRIANGLE, BTN_NORTH),
    (Ds4Button::SQUARE, BTN_WEST),
    (Ds4Button::SHOULDER_LEFT, BTN_TL),
    (Ds4Button::SHOULDER_RIGHT, BTN_TR),
    (Ds4Button::OPTIONS, BTN_SELECT),
    (Ds4Button::SHARE, BTN_START),
    (Ds4Button::THUMB_LEFT, BTN_THUMBL),
    (Ds4Button::THUMB_RIGHT, BTN_THUMBR),
];

// no touchpad on uinput
const SPECIAL_KEYS: [(Ds4SpecialButton, u16); 1] = [(Ds4SpecialButton::PS, BTN_MODE)];

const DECLARED_KEYS: [u16; 13] = [
    BTN_SOUTH, BTN_EAST, BTN_NORTH, BTN_WEST, BTN_TL, BTN_TR, BTN_TL2, BTN_TR2, BTN_SELECT,
    BTN_START, BTN_MODE, BTN_THUMBL, BTN_THUMBR,
];

const DPAD_KEYS: [u16; 4] = [BTN_DPAD_UP, BTN_DPAD_DOWN, BTN_DPAD_LEFT, BTN_DPAD_RIGHT];

pub fn default_identity() -> DeviceIdentity {
    DeviceIdentity {
        name: "Sony Interactive Entertainment Wireless Controller".to_string(),
        bustype: BUS_USB,
        vendor: 0x054c,  // Sony
        product: 0x05c4, // DualShock 4
        version: 0x8111,
    }
}

/// Capabilities of the virtual DualShock 4.
pub fn device_spec(config: &GamepadConfig) -> DeviceSpec {
    let mut spec = DeviceSpec::new(config.identity(default_identity()))
        .with_keys(&DECLARED_KEYS)
        .with_axis(ABS_X, STICK)
        .with_axis(ABS_Y, STICK)
        .with_axis(ABS_Z, TRIGGER)
        .with_axis(ABS_RX, STICK)
        .with_axis(ABS_RY, STICK)
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

/// Virtual DualShock 4 gamepad
pub struct VDS4Gamepad<S: InputSink> {
    binding: Binding<S>,
    report: Ds4Report,
    dpad_mode: DpadMode,
}

#[cfg(target_os = "linux")]
impl VDS4Gamepad<super::UinputDevice> {
    /// Create a uinput-backed controller with the default identity.
    pub fn new() -> Result<Self> {
        Self::with_config(&GamepadConfig::default())
    }
}

impl<S: InputSink> VDS4Gamepad<S> {
    /// Declare the device, register it and send the neutral report once.
    pub fn with_config(config: &GamepadConfig) -> Result<Self> {
        let binding = Binding::open(device_spec(config), config)?;
        let mut gamepad = Self {
            binding,
            report: Ds4Report::default(),
            dpad_mode: config.dpad_mode,
        };
        gamepad.update()?;
        Ok(gamepad)
    }

    pub fn report(&self) -> &Ds4Report {
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

    /// Press a special button (no effect if already pressed)
    pub fn press_special_button(&mut self, button: Ds4SpecialButton) {
        self.report.special |= button;
    }

    /// Release a special button (no effect if already released)
    pub fn release_special_button(&mut self, button: Ds4SpecialButton) {
        self.report.special &= !button;
    }

    /// Set the d-pad direction. Translated to hat or buttons on update.
    pub fn directional_pad(&mut self, direction: Ds4DpadDirection) {
        self.report.dpad = direction;
    }
}

impl<S: InputSink> VirtualGamepad for VDS4Gamepad<S> {
    type Button = Ds4Button;
    type Axis = u8;

    fn axis_from_float(value: f32) -> Result<u8> {
        byte_axis_from_float(value)
    }

    fn press_button(&mut self, button: Ds4Button) {
        self.report.buttons |= button;
    }

    fn release_button(&mut self, button: Ds4Button) {
        self.report.buttons &= !button;
    }

    fn left_trigger(&mut self, value: u8) {
        self.report.trigger_l = value;
    }

    fn right_trigger(&mut self, value: u8) {
        self.report.trigger_r = value;
    }

    /// 0 to 255, 128 = centered
    fn left_joystick(&mut self, x: u8, y: u8) {
        self.report.thumb_lx = x;
        self.report.thumb_ly = y;
    }

    fn right_joystick(&mut self, x: u8, y: u8) {
        self.report.thumb_rx = x;
        self.report.thumb_ry = y;
    }

    fn reset(&mut self) {
        self.report = Ds4Report::default();
    }

    fn update(&mut self) -> Result<()> {
        let report = self.report;
        log::debug!("DS4 update: {:?}", report);

        for (button, key) in BUTTON_KEYS {
            self.binding.key(key, report.buttons.contains(button))?;
        }
        for (button, key) in SPECIAL_KEYS {
            self.binding.key(key, report.special.contains(button))?;
        }
        if self.dpad_mode == DpadMode::Buttons {
            self.binding.dpad_keys(report.dpad.pressed())?;
        }

        self.binding.abs(ABS_X, report.thumb_lx.into())?;
        self.binding.abs(ABS_Y, report.thumb_ly.into())?;
        self.binding.abs(ABS_RX, report.thumb_rx.into())?;
        self.binding.abs(ABS_RY, report.thumb_ry.into())?;

        self.binding.abs(ABS_Z, report.trigger_l.into())?;
        self.binding.abs(ABS_RZ, report.trigger_r.into())?;

        if self.dpad_mode == DpadMode::Hat {
            self.binding.hat(report.dpad.hat())?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::virtual_controller::RecordingSink;

    fn pad() -> VDS4Gamepad<RecordingSink> {
        VDS4Gamepad::with_config(&GamepadConfig::default()).unwrap()
    }

    #[test]
    fn declared_capabilities() {
        let spec = device_spec(&GamepadConfig::default());
        assert_eq!(spec.axis_count(), 6);
        assert_eq!(spec.button_count(), 13);
        assert_eq!(spec.hat_count(), 1);
        assert_eq!(spec.axis(ABS_RY).unwrap().value, 128);
        assert_eq!(spec.axis(ABS_RZ).unwrap().max, 255);
        assert_eq!(spec.identity.vendor, 0x054c);

        let buttons = device_spec(&GamepadConfig {
            dpad_mode: DpadMode::Buttons,
            ..Default::default()
        });
        assert_eq!(buttons.button_count(), 17);
        assert_eq!(buttons.hat_count(), 0);
    }

    #[test]
    fn construction_centers_sticks() {
        let pad = pad();
        for axis in [ABS_X, ABS_Y, ABS_RX, ABS_RY] {
            assert_eq!(pad.sink().abs(axis), Some(128));
        }
        assert_eq!(pad.sink().abs(ABS_HAT0X), Some(0));
    }

    #[test]
    fn each_button_maps_to_one_key() {
        let mut pad = pad();
        for (button, key) in BUTTON_KEYS {
            pad.press_button(button);
            pad.update().unwrap();
            assert_eq!(pad.sink().pressed_keys(), vec![key], "{button:?}");
            pad.release_button(button);
            pad.update().unwrap();
            assert!(pad.sink().pressed_keys().is_empty());
        }
    }

    #[test]
    fn special_buttons() {
        let mut pad = pad();
        pad.press_special_button(Ds4SpecialButton::PS);
        pad.update().unwrap();
        assert_eq!(pad.sink().pressed_keys(), vec![BTN_MODE]);

        pad.release_special_button(Ds4SpecialButton::PS);
        pad.press_special_button(Ds4SpecialButton::TOUCHPAD);
        pad.update().unwrap();
        assert!(pad.sink().pressed_keys().is_empty());
        assert_eq!(pad.report().special, Ds4SpecialButton::TOUCHPAD);
    }

    #[test]
    fn trigger_buttons_are_not_forwarded() {
        let mut pad = pad();
        pad.press_button(Ds4Button::TRIGGER_LEFT | Ds4Button::TRIGGER_RIGHT);
        pad.update().unwrap();
        assert_eq!(pad.sink().key(BTN_TL2), Some(false));
        assert_eq!(pad.sink().key(BTN_TR2), Some(false));
    }

    #[test]
    fn dpad_hat_table() {
        let mut pad = pad();
        for direction in Ds4DpadDirection::ALL {
            pad.directional_pad(direction);
            // stored only, not sent
            assert_eq!(pad.report().dpad, direction);
            pad.update().unwrap();
            let hat = (
                pad.sink().abs(ABS_HAT0X).unwrap(),
                pad.sink().abs(ABS_HAT0Y).unwrap(),
            );
            assert_eq!(hat, direction.hat(), "{direction:?}");
            pad.reset();
            pad.update().unwrap();
        }

        pad.directional_pad(Ds4DpadDirection::NorthWest);
        pad.update().unwrap();
        assert_eq!(pad.sink().abs(ABS_HAT0X), Some(-1));
        assert_eq!(pad.sink().abs(ABS_HAT0Y), Some(-1));
    }

    #[test]
    fn dpad_as_buttons() {
        let config = GamepadConfig {
            dpad_mode: DpadMode::Buttons,
            ..Default::default()
        };
        let mut pad: VDS4Gamepad<RecordingSink> = VDS4Gamepad::with_config(&config).unwrap();
        assert_eq!(pad.dpad_mode(), DpadMode::Buttons);
        let cases = [
            (Ds4DpadDirection::North, vec![BTN_DPAD_UP]),
            (Ds4DpadDirection::NorthEast, vec![BTN_DPAD_UP, BTN_DPAD_RIGHT]),
            (Ds4DpadDirection::East, vec![BTN_DPAD_RIGHT]),
            (Ds4DpadDirection::SouthEast, vec![BTN_DPAD_DOWN, BTN_DPAD_RIGHT]),
            (Ds4DpadDirection::South, vec![BTN_DPAD_DOWN]),
            (Ds4DpadDirection::SouthWest, vec![BTN_DPAD_DOWN, BTN_DPAD_LEFT]),
            (Ds4DpadDirection::West, vec![BTN_DPAD_LEFT]),
            (Ds4DpadDirection::NorthWest, vec![BTN_DPAD_UP, BTN_DPAD_LEFT]),
            (Ds4DpadDirection::None, vec![]),
        ];
        for (direction, keys) in cases {
            pad.directional_pad(direction);
            pad.update().unwrap();
            assert_eq!(pad.sink().pressed_keys(), keys, "{direction:?}");
        }
    }

    #[test]
    fn triggers_are_bytes() {
        let mut pad = pad();
        for (value, expected) in [(0u8, -1.0), (10, -0.92), (191, 0.5), (255, 1.0)] {
            pad.left_trigger(value);
            pad.update().unwrap();
            assert_eq!(pad.sink().abs(ABS_Z), Some(i32::from(value)));
            assert!((pad.sink().normalized(ABS_Z).unwrap() - expected).abs() < 0.01);
        }
        pad.right_trigger_float(0.5).unwrap();
        assert_eq!(pad.report().trigger_r, 128);
    }

    #[test]
    fn joysticks() {
        let cases = [
            ((0u8, 127u8), (-1.0, 0.0)),
            ((63, 63), (-0.5, -0.5)),
            ((127, 0), (0.0, -1.0)),
            ((191, 255), (0.5, 1.0)),
            ((255, 191), (1.0, 0.5)),
        ];
        let mut pad = pad();
        for ((x, y), (nx, ny)) in cases {
            pad.right_joystick(x, y);
            pad.update().unwrap();
            assert!((pad.sink().normalized(ABS_RX).unwrap() - nx).abs() < 0.01);
            assert!((pad.sink().normalized(ABS_RY).unwrap() - ny).abs() < 0.01);
        }

        pad.left_joystick_float(-1.0, 0.5).unwrap();
        assert_eq!((pad.report().thumb_lx, pad.report().thumb_ly), (1, 192));
    }

    #[test]
    fn reset_restores_neutral() {
        let mut pad = pad();
        pad.press_button(Ds4Button::CIRCLE);
        pad.press_special_button(Ds4SpecialButton::PS);
        pad.directional_pad(Ds4DpadDirection::East);
        pad.left_joystick(0, 0);
        pad.update().unwrap();

        pad.reset();
        assert_eq!(*pad.report(), Ds4Report::default());
        pad.update().unwrap();
        assert!(pad.sink().pressed_keys().is_empty());
        assert_eq!(pad.sink().abs(ABS_X), Some(128));
        assert_eq!(pad.sink().abs(ABS_HAT0X), Some(0));
    }

    #[test]
    fn close_destroys_once() {
        let pad = pad();
        assert_eq!(pad.index(), 0);
        assert_eq!(pad.product_id(), 0x05c4);
        assert_eq!(pad.dpad_mode(), DpadMode::Hat);
        let teardowns = pad.sink().teardowns();
        pad.close().unwrap();
        assert_eq!(teardowns.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
