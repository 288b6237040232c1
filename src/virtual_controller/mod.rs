#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
mod uinput_ffi;

mod ds4;
mod mock;
pub mod protocol;
mod x360;

#[cfg(target_os = "linux")]
pub use linux::UinputDevice;
pub use ds4::VDS4Gamepad;
pub use mock::RecordingSink;
pub use x360::VX360Gamepad;

use crate::buttons::DpadButtons;
use crate::config::GamepadConfig;
use crate::error::Result;
use crate::report::trigger_from_float;
use protocol::{
    DeviceIdentity, DeviceSpec, InputEvent, ABS_HAT0X, ABS_HAT0Y, BTN_DPAD_DOWN, BTN_DPAD_LEFT,
    BTN_DPAD_RIGHT, BTN_DPAD_UP,
};

/// The OS side of a virtual device: declared once, written many times,
/// destroyed once.
pub trait InputSink: Sized {
    /// Declare the capabilities in `spec` and register the device.
    fn create(spec: DeviceSpec, config: &GamepadConfig) -> Result<Self>;

    fn spec(&self) -> &DeviceSpec;

    fn emit(&mut self, event: InputEvent) -> Result<()>;

    /// Terminate the current report.
    fn sync(&mut self) -> Result<()>;

    /// Unregister the device. Calling it twice is harmless.
    fn destroy(&mut self) -> Result<()>;
}

/// Operations every emulated controller supports.
///
/// Mutations only touch the in-memory report. Nothing reaches the system
/// until [`update`](VirtualGamepad::update) is called.
pub trait VirtualGamepad {
    type Button: Copy;
    /// Native stick axis width
    type Axis: Copy;

    /// Map -1.0..=1.0 onto the native stick width.
    fn axis_from_float(value: f32) -> Result<Self::Axis>;

    /// Press a button (no effect if already pressed)
    fn press_button(&mut self, button: Self::Button);

    /// Release a button (no effect if already released)
    fn release_button(&mut self, button: Self::Button);

    /// 0 to 255, 0 = released
    fn left_trigger(&mut self, value: u8);

    fn right_trigger(&mut self, value: u8);

    /// 0.0 to 1.0, 0.0 = released
    fn left_trigger_float(&mut self, value: f32) -> Result<()> {
        let value = trigger_from_float(value)?;
        self.left_trigger(value);
        Ok(())
    }

    fn right_trigger_float(&mut self, value: f32) -> Result<()> {
        let value = trigger_from_float(value)?;
        self.right_trigger(value);
        Ok(())
    }

    fn left_joystick(&mut self, x: Self::Axis, y: Self::Axis);

    fn right_joystick(&mut self, x: Self::Axis, y: Self::Axis);

    /// -1.0 to 1.0 per axis, 0.0 = centered. Nothing changes if either is out of range.
    fn left_joystick_float(&mut self, x: f32, y: f32) -> Result<()> {
        let (x, y) = (Self::axis_from_float(x)?, Self::axis_from_float(y)?);
        self.left_joystick(x, y);
        Ok(())
    }

    fn right_joystick_float(&mut self, x: f32, y: f32) -> Result<()> {
        let (x, y) = (Self::axis_from_float(x)?, Self::axis_from_float(y)?);
        self.right_joystick(x, y);
        Ok(())
    }

    /// Back to the neutral report. Does not send anything.
    fn reset(&mut self);

    /// Send the whole report to the device, terminated by one sync marker.
    fn update(&mut self) -> Result<()>;

    fn identity(&self) -> &DeviceIdentity;

    fn set_vendor_id(&mut self, vendor: u16);

    fn set_product_id(&mut self, product: u16);

    fn vendor_id(&self) -> u16 {
        self.identity().vendor
    }

    fn product_id(&self) -> u16 {
        self.identity().product
    }

    fn bus_type(&self) -> u16 {
        self.identity().bustype
    }

    /// Each object owns exactly one device.
    fn index(&self) -> u32 {
        0
    }

    /// Destroy the device and release the handle.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Owned handle plus the identity it was registered with.
pub(crate) struct Binding<S: InputSink> {
    sink: S,
    identity: DeviceIdentity,
    closed: bool,
}

impl<S: InputSink> Binding<S> {
    pub(crate) fn open(spec: DeviceSpec, config: &GamepadConfig) -> Result<Self> {
        let identity = spec.identity.clone();
        let sink = S::create(spec, config)?;
        Ok(Self {
            sink,
            identity,
            closed: false,
        })
    }

    pub(crate) fn sink(&self) -> &S {
        &self.sink
    }

    pub(crate) fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub(crate) fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub(crate) fn set_vendor_id(&mut self, vendor: u16) {
        log::warn!(
            "Vendor id changed to {:04x} after creation; the system keeps {:04x}",
            vendor,
            self.sink.spec().identity.vendor
        );
        self.identity.vendor = vendor;
    }

    pub(crate) fn set_product_id(&mut self, product: u16) {
        log::warn!(
            "Product id changed to {:04x} after creation; the system keeps {:04x}",
            product,
            self.sink.spec().identity.product
        );
        self.identity.product = product;
    }

    pub(crate) fn emit(&mut self, event: InputEvent) -> Result<()> {
        log::trace!("{:?}", event);
        self.sink.emit(event)
    }

    pub(crate) fn key(&mut self, code: u16, pressed: bool) -> Result<()> {
        self.emit(InputEvent::key(code, pressed))
    }

    pub(crate) fn abs(&mut self, code: u16, value: i32) -> Result<()> {
        self.emit(InputEvent::abs(code, value))
    }

    pub(crate) fn dpad_keys(&mut self, dpad: DpadButtons) -> Result<()> {
        self.key(BTN_DPAD_UP, dpad.up)?;
        self.key(BTN_DPAD_DOWN, dpad.down)?;
        self.key(BTN_DPAD_LEFT, dpad.left)?;
        self.key(BTN_DPAD_RIGHT, dpad.right)
    }

    pub(crate) fn hat(&mut self, (dx, dy): (i32, i32)) -> Result<()> {
        self.abs(ABS_HAT0X, dx)?;
        self.abs(ABS_HAT0Y, dy)
    }

    pub(crate) fn sync(&mut self) -> Result<()> {
        self.sink.sync()
    }

    pub(crate) fn close(mut self) -> Result<()> {
        self.closed = true;
        self.sink.destroy()
    }
}

impl<S: InputSink> Drop for Binding<S> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.sink.destroy() {
            log::warn!("Failed to destroy \"{}\": {}", self.identity.name, e);
        }
    }
}
