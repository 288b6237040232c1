use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use vpad::{DpadMode, GamepadConfig, VirtualGamepad};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Family {
    X360,
    Ds4,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DpadArg {
    Hat,
    Buttons,
}

/// Create a virtual gamepad and walk it through its inputs.
#[derive(Debug, Parser)]
#[command(name = "vpad", version)]
struct Args {
    family: Family,

    /// JSON device config, defaults to vpad_config.json next to the binary
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    dpad_mode: Option<DpadArg>,

    /// Pause between steps
    #[arg(long, default_value_t = 100)]
    delay_ms: u64,
}

struct Pacer(Duration);

impl Pacer {
    fn step<G: VirtualGamepad>(&self, pad: &mut G, what: &str) -> anyhow::Result<()> {
        log::info!("{}", what);
        pad.update().with_context(|| format!("update failed during: {what}"))?;
        thread::sleep(self.0);
        Ok(())
    }
}

/// Shared part of the walkthrough: wake the device, then sweep triggers and sticks.
fn exercise_axes<G: VirtualGamepad>(pad: &mut G, wake: G::Button, pace: &Pacer) -> anyhow::Result<()> {
    pad.press_button(wake);
    pace.step(pad, "wake: press")?;
    pad.release_button(wake);
    pad.left_joystick_float(0.3, -0.3)?;
    pad.right_joystick_float(-0.3, 0.3)?;
    pad.left_trigger_float(0.3)?;
    pad.right_trigger_float(0.3)?;
    pace.step(pad, "wake: nudge axes")?;
    pad.reset();
    pace.step(pad, "wake: reset")?;

    for value in [0.0, 0.5, 1.0] {
        pad.left_trigger_float(value)?;
        pad.right_trigger_float(value)?;
        pace.step(pad, &format!("triggers at {value}"))?;
    }
    pad.reset();

    for (x, y) in [(-1.0, 0.0), (-0.5, -0.5), (0.0, -1.0), (0.5, 1.0), (1.0, 0.5)] {
        pad.left_joystick_float(x, y)?;
        pad.right_joystick_float(x, y)?;
        pace.step(pad, &format!("sticks at ({x}, {y})"))?;
    }
    pad.reset();
    pace.step(pad, "neutral")
}

#[cfg(target_os = "linux")]
fn run_x360(config: &GamepadConfig, pace: &Pacer) -> anyhow::Result<()> {
    use vpad::XusbButton;

    let mut pad = vpad::VX360Gamepad::<vpad::UinputDevice>::with_config(config)
        .context("Failed to create the Xbox 360 controller")?;
    exercise_axes(&mut pad, XusbButton::A, pace)?;

    for button in XusbButton::all().iter() {
        pad.press_button(button);
        pace.step(&mut pad, &format!("{button:?}"))?;
        pad.release_button(button);
    }
    pace.step(&mut pad, "all released")?;

    pad.close().context("Failed to destroy the controller")?;
    Ok(())
}

#[cfg(target_os = "linux")]
fn run_ds4(config: &GamepadConfig, pace: &Pacer) -> anyhow::Result<()> {
    use vpad::{Ds4Button, Ds4DpadDirection, Ds4SpecialButton};

    let mut pad = vpad::VDS4Gamepad::<vpad::UinputDevice>::with_config(config)
        .context("Failed to create the DualShock 4 controller")?;
    exercise_axes(&mut pad, Ds4Button::CROSS, pace)?;

    for button in Ds4Button::all().iter() {
        pad.press_button(button);
        pace.step(&mut pad, &format!("{button:?}"))?;
        pad.release_button(button);
    }
    pad.press_special_button(Ds4SpecialButton::PS);
    pace.step(&mut pad, "PS")?;
    pad.release_special_button(Ds4SpecialButton::PS);

    for direction in Ds4DpadDirection::ALL {
        pad.directional_pad(direction);
        pace.step(&mut pad, &format!("d-pad {direction:?}"))?;
    }
    pad.reset();
    pace.step(&mut pad, "all released")?;

    pad.close().context("Failed to destroy the controller")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GamepadConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GamepadConfig::load_or_default(&GamepadConfig::config_path()),
    };
    if let Some(mode) = args.dpad_mode {
        config.dpad_mode = match mode {
            DpadArg::Hat => DpadMode::Hat,
            DpadArg::Buttons => DpadMode::Buttons,
        };
    }

    let pace = Pacer(Duration::from_millis(args.delay_ms));

    #[cfg(target_os = "linux")]
    return match args.family {
        Family::X360 => run_x360(&config, &pace),
        Family::Ds4 => run_ds4(&config, &pace),
    };

    #[cfg(not(target_os = "linux"))]
    anyhow::bail!("{:?} needs uinput, which only exists on linux", args.family);
}
