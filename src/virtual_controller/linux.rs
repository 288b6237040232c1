use super::protocol::{DeviceSpec, InputEvent, EV_ABS, EV_KEY, EV_SYN};
use super::uinput_ffi::*;
use super::InputSink;
use crate::config::{check_name, GamepadConfig};
use crate::error::{Result, VpadError};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::io::AsRawFd;

/// The device setup block has to go out in one write.
fn check_written(written: isize, expected: usize) -> Result<()> {
    if written < 0 {
        return Err(VpadError::acquisition(
            "write uinput_user_dev",
            std::io::Error::last_os_error(),
        ));
    }
    if written as usize != expected {
        return Err(VpadError::acquisition(
            "write uinput_user_dev",
            std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                format!("short write: {written} of {expected} bytes"),
            ),
        ));
    }
    Ok(())
}

/// A device registered through `/dev/uinput`.
pub struct UinputDevice {
    file: File,
    spec: DeviceSpec,
    destroyed: bool,
}

impl UinputDevice {
    fn ioctl_int(&self, request: libc::c_ulong, arg: u16, what: &str) -> Result<()> {
        let rc = unsafe { libc::ioctl(self.file.as_raw_fd(), request, arg as libc::c_int) };
        if rc < 0 {
            return Err(VpadError::acquisition(
                format!("{what} 0x{arg:x}"),
                std::io::Error::last_os_error(),
            ));
        }
        Ok(())
    }

    fn declare(&self) -> Result<()> {
        for ev in [EV_KEY, EV_ABS, EV_SYN] {
            self.ioctl_int(UI_SET_EVBIT, ev, "UI_SET_EVBIT")?;
        }
        for &key in &self.spec.keys {
            self.ioctl_int(UI_SET_KEYBIT, key, "UI_SET_KEYBIT")?;
        }
        for &(axis, _) in &self.spec.axes {
            self.ioctl_int(UI_SET_ABSBIT, axis, "UI_SET_ABSBIT")?;
        }
        Ok(())
    }

    fn user_dev(&self) -> UinputUserDev {
        let identity = &self.spec.identity;
        let mut dev = UinputUserDev {
            name: [0; UINPUT_MAX_NAME_SIZE],
            id: InputId {
                bustype: identity.bustype,
                vendor: identity.vendor,
                product: identity.product,
                version: identity.version,
            },
            ff_effects_max: 0,
            absmax: [0; ABS_CNT],
            absmin: [0; ABS_CNT],
            absfuzz: [0; ABS_CNT],
            absflat: [0; ABS_CNT],
        };

        // length checked in create, the trailing NUL stays
        let name = identity.name.as_bytes();
        dev.name[..name.len()].copy_from_slice(name);

        for &(axis, range) in &self.spec.axes {
            let i = axis as usize;
            dev.absmin[i] = range.min;
            dev.absmax[i] = range.max;
            dev.absfuzz[i] = range.fuzz;
            dev.absflat[i] = range.flat;
        }
        dev
    }

    fn register(&self) -> Result<()> {
        let dev = self.user_dev();
        let dev_bytes = unsafe {
            std::slice::from_raw_parts(
                &dev as *const _ as *const u8,
                std::mem::size_of::<UinputUserDev>(),
            )
        };

        let written = unsafe {
            libc::write(
                self.file.as_raw_fd(),
                dev_bytes.as_ptr() as *const libc::c_void,
                dev_bytes.len(),
            )
        };
        check_written(written, dev_bytes.len())?;

        if unsafe { libc::ioctl(self.file.as_raw_fd(), UI_DEV_CREATE) } < 0 {
            return Err(VpadError::acquisition(
                "UI_DEV_CREATE",
                std::io::Error::last_os_error(),
            ));
        }
        Ok(())
    }

    fn write_raw(&mut self, type_: u16, code: u16, value: i32) -> Result<()> {
        let event = RawInputEvent::new(type_, code, value);
        let bytes = unsafe {
            std::slice::from_raw_parts(
                &event as *const _ as *const u8,
                std::mem::size_of::<RawInputEvent>(),
            )
        };
        self.file.write_all(bytes).map_err(VpadError::Emission)
    }
}

impl InputSink for UinputDevice {
    fn create(spec: DeviceSpec, config: &GamepadConfig) -> Result<Self> {
        check_name(&spec.identity.name)?;
        if let Some(&(axis, _)) = spec.axes.iter().find(|(a, _)| *a as usize >= ABS_CNT) {
            return Err(VpadError::ContractViolation(format!(
                "axis 0x{axis:x} does not fit uinput_user_dev"
            )));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.uinput_path)
            .map_err(|e| {
                VpadError::acquisition(
                    format!(
                        "open {}; try: sudo chmod 666 {}",
                        config.uinput_path, config.uinput_path
                    ),
                    e,
                )
            })?;

        let mut device = Self {
            file,
            spec,
            // nothing to destroy until UI_DEV_CREATE succeeds
            destroyed: true,
        };
        device.declare()?;
        device.register()?;
        device.destroyed = false;

        log::info!(
            "uinput device \"{}\" created ({:04x}:{:04x})",
            device.spec.identity.name,
            device.spec.identity.vendor,
            device.spec.identity.product
        );

        Ok(device)
    }

    fn spec(&self) -> &DeviceSpec {
        &self.spec
    }

    fn emit(&mut self, event: InputEvent) -> Result<()> {
        self.spec.check(&event)?;
        self.write_raw(event.type_(), event.code(), event.value())
    }

    fn sync(&mut self) -> Result<()> {
        let sync = InputEvent::Sync;
        self.write_raw(sync.type_(), sync.code(), sync.value())?;
        self.file.flush().map_err(VpadError::Emission)
    }

    fn destroy(&mut self) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        self.destroyed = true;
        if unsafe { libc::ioctl(self.file.as_raw_fd(), UI_DEV_DESTROY) } < 0 {
            return Err(VpadError::Io(std::io::Error::last_os_error()));
        }
        log::info!("uinput device \"{}\" destroyed", self.spec.identity.name);
        Ok(())
    }
}

impl Drop for UinputDevice {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            log::warn!("Failed to destroy uinput device: {}", e);
        }
    }
}
