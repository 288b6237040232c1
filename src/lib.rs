//! Virtual Xbox 360 and DualShock 4 gamepads.
//!
//! Create a controller, change its report with the mutation methods and push
//! it to the system with [`VirtualGamepad::update`]:
//!
//! ```no_run
//! # #[cfg(target_os = "linux")]
//! # fn main() -> vpad::Result<()> {
//! use vpad::{VX360Gamepad, VirtualGamepad, XusbButton};
//!
//! let mut pad = VX360Gamepad::new()?;
//! pad.press_button(XusbButton::A);
//! pad.left_joystick_float(0.0, -1.0)?;
//! pad.update()?;
//! # Ok(())
//! # }
//! # #[cfg(not(target_os = "linux"))]
//! # fn main() {}
//! ```

pub mod buttons;
pub mod config;
pub mod error;
pub mod report;
pub mod virtual_controller;

pub use buttons::{Ds4Button, Ds4DpadDirection, Ds4SpecialButton, XusbButton};
pub use config::{DpadMode, GamepadConfig};
pub use error::{Result, VpadError};
pub use report::{Ds4Report, XusbReport};
#[cfg(target_os = "linux")]
pub use virtual_controller::UinputDevice;
pub use virtual_controller::{InputSink, RecordingSink, VDS4Gamepad, VX360Gamepad, VirtualGamepad};
