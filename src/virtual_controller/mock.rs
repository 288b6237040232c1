use super::protocol::{DeviceSpec, InputEvent};
use super::InputSink;
use crate::config::GamepadConfig;
use crate::error::{Result, VpadError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory sink that records every event and keeps the state a consumer
/// would observe. State only changes on `sync`, like a real evdev reader.
#[derive(Debug)]
pub struct RecordingSink {
    spec: DeviceSpec,
    events: Vec<InputEvent>,
    pending: Vec<InputEvent>,
    keys: HashMap<u16, bool>,
    abs: HashMap<u16, i32>,
    reports: usize,
    broken: bool,
    destroyed: bool,
    teardowns: Arc<AtomicUsize>,
}

impl RecordingSink {
    /// Every event emitted so far, sync markers included.
    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    /// Events of the most recent complete report, without the sync marker.
    pub fn last_report(&self) -> &[InputEvent] {
        let Some(end) = self.events.iter().rposition(|e| *e == InputEvent::Sync) else {
            return &[];
        };
        let start = self.events[..end]
            .iter()
            .rposition(|e| *e == InputEvent::Sync)
            .map_or(0, |i| i + 1);
        &self.events[start..end]
    }

    /// Number of sync markers seen
    pub fn reports(&self) -> usize {
        self.reports
    }

    pub fn key(&self, code: u16) -> Option<bool> {
        self.keys.get(&code).copied()
    }

    pub fn abs(&self, code: u16) -> Option<i32> {
        self.abs.get(&code).copied()
    }

    /// Axis value scaled to -1.0..1.0 over its declared range.
    pub fn normalized(&self, code: u16) -> Option<f64> {
        let range = self.spec.axis(code)?;
        Some(range.normalize(self.abs(code)?))
    }

    /// Declared keys that currently read as pressed.
    pub fn pressed_keys(&self) -> Vec<u16> {
        let mut pressed: Vec<u16> = self
            .keys
            .iter()
            .filter(|(_, &down)| down)
            .map(|(&code, _)| code)
            .collect();
        pressed.sort_unstable();
        pressed
    }

    /// Make every following write fail, like a handle that went away.
    pub fn set_broken(&mut self, broken: bool) {
        self.broken = broken;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Counts `destroy` calls. Shared, so it stays readable after the
    /// sink itself has been dropped.
    pub fn teardowns(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.teardowns)
    }

    fn check_writable(&self) -> Result<()> {
        if self.broken || self.destroyed {
            return Err(VpadError::Emission(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "recording sink is not writable",
            )));
        }
        Ok(())
    }
}

impl InputSink for RecordingSink {
    fn create(spec: DeviceSpec, _config: &GamepadConfig) -> Result<Self> {
        let abs = spec
            .axes
            .iter()
            .map(|(code, range)| (*code, range.value))
            .collect();
        let keys = spec.keys.iter().map(|&code| (code, false)).collect();
        Ok(Self {
            spec,
            events: Vec::new(),
            pending: Vec::new(),
            keys,
            abs,
            reports: 0,
            broken: false,
            destroyed: false,
            teardowns: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn spec(&self) -> &DeviceSpec {
        &self.spec
    }

    fn emit(&mut self, event: InputEvent) -> Result<()> {
        self.check_writable()?;
        self.spec.check(&event)?;
        self.events.push(event);
        self.pending.push(event);
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        self.check_writable()?;
        for event in self.pending.drain(..) {
            match event {
                InputEvent::Key { code, pressed } => {
                    self.keys.insert(code, pressed);
                }
                InputEvent::Abs { code, value } => {
                    self.abs.insert(code, value);
                }
                InputEvent::Sync => {}
            }
        }
        self.events.push(InputEvent::Sync);
        self.reports += 1;
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
        self.destroyed = true;
        Ok(())
    }
}
