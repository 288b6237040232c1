use crate::error::{Result, VpadError};
use crate::virtual_controller::protocol::DeviceIdentity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "vpad_config.json";
pub const DEFAULT_UINPUT_PATH: &str = "/dev/uinput";
/// uinput_user_dev holds 80 bytes including the trailing NUL.
pub const MAX_NAME_LEN: usize = 79;

/// How the d-pad reaches the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DpadMode {
    /// ABS_HAT0X / ABS_HAT0Y, what SDL and most linux games expect
    #[default]
    Hat,
    /// BTN_DPAD_UP/DOWN/LEFT/RIGHT
    Buttons,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamepadConfig {
    /// Overrides the family's device name
    pub name: Option<String>,
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
    pub version: Option<u16>,
    pub dpad_mode: DpadMode,
    pub uinput_path: String,
}

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            name: None,
            vendor_id: None,
            product_id: None,
            version: None,
            dpad_mode: DpadMode::default(),
            uinput_path: DEFAULT_UINPUT_PATH.to_string(),
        }
    }
}

impl GamepadConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        if let Some(name) = &config.name {
            check_name(name)?;
        }
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Like `load`, but a missing or broken file gives the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        log::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILENAME)
    }

    /// Apply the overrides on top of a family default.
    pub fn identity(&self, mut base: DeviceIdentity) -> DeviceIdentity {
        if let Some(name) = &self.name {
            base.name = name.clone();
        }
        if let Some(vendor) = self.vendor_id {
            base.vendor = vendor;
        }
        if let Some(product) = self.product_id {
            base.product = product;
        }
        if let Some(version) = self.version {
            base.version = version;
        }
        base
    }
}

/// A device name must be non-empty and fit the kernel's name field.
pub fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(VpadError::Config("device name must not be empty".into()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(VpadError::Config(format!(
            "device name is {} bytes, at most {MAX_NAME_LEN} fit",
            name.len()
        )));
    }
    Ok(())
}
