// Platform-specific audio backends
// Each platform implements the AudioBackend trait against its own
// audio subsystem (WASAPI, PulseAudio, osascript)

// Platform-specific modules
#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "macos")]
pub mod macos;

// Re-export platform-specific implementation as 'platform'
#[cfg(target_os = "windows")]
pub use windows as platform;

#[cfg(target_os = "linux")]
pub use linux as platform;

#[cfg(target_os = "macos")]
pub use macos as platform;

use thiserror::Error;

/// Failure classes of the platform acquisition sequence and of the
/// read/write primitives. The `Enumerator` and `Activation` steps only
/// exist on platforms whose acquisition path has them; each backend uses
/// the subset matching its own sequence.
#[derive(Debug, Error)]
pub enum AudioError {
    #[cfg_attr(target_os = "macos", allow(dead_code))]
    #[error("audio subsystem initialization failed: {0}")]
    SubsystemInit(String),

    #[cfg_attr(not(target_os = "windows"), allow(dead_code))]
    #[error("failed to create device enumerator: {0}")]
    Enumerator(String),

    #[cfg_attr(target_os = "macos", allow(dead_code))]
    #[error("no default render endpoint: {0}")]
    NoDefaultDevice(String),

    #[cfg_attr(not(target_os = "windows"), allow(dead_code))]
    #[error("failed to activate endpoint volume interface: {0}")]
    Activation(String),

    #[error("failed to read mute state: {0}")]
    MuteRead(String),

    #[error("failed to write mute state: {0}")]
    MuteWrite(String),

    #[error("failed to write volume level: {0}")]
    VolumeWrite(String),
}

// Platform audio backend trait
//
// The narrow capability surface the program needs from the OS: mute
// read/write and master volume write on the default render endpoint.
// Every call resolves the default endpoint and performs the full
// acquire/use/release lifecycle internally; nothing is cached between
// calls.
pub trait AudioBackend {
    /// Read the mute flag of the default output device.
    fn read_mute(&self) -> Result<bool, AudioError>;

    /// Write the mute flag of the default output device.
    fn write_mute(&self, mute: bool) -> Result<(), AudioError>;

    /// Write the master volume of the default output device.
    /// `scalar` is in [0.0, 1.0].
    fn write_volume(&self, scalar: f32) -> Result<(), AudioError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        ReadMute,
        WriteMute(bool),
        WriteVolume(f32),
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum FailMode {
        None,
        All,
        Reads,
        Writes,
    }

    /// In-memory stand-in for the platform audio subsystem: records
    /// every call and can be scripted to fail reads, writes, or both.
    pub struct FakeBackend {
        pub muted: Cell<bool>,
        pub volume: Cell<f32>,
        pub fail: Cell<FailMode>,
        pub calls: RefCell<Vec<Call>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            FakeBackend {
                muted: Cell::new(false),
                volume: Cell::new(0.5),
                fail: Cell::new(FailMode::None),
                calls: RefCell::new(Vec::new()),
            }
        }

        pub fn muted(self) -> Self {
            self.muted.set(true);
            self
        }

        pub fn failing(self, mode: FailMode) -> Self {
            self.fail.set(mode);
            self
        }

        fn fails_read(&self) -> bool {
            matches!(self.fail.get(), FailMode::All | FailMode::Reads)
        }

        fn fails_write(&self) -> bool {
            matches!(self.fail.get(), FailMode::All | FailMode::Writes)
        }
    }

    impl AudioBackend for FakeBackend {
        fn read_mute(&self) -> Result<bool, AudioError> {
            self.calls.borrow_mut().push(Call::ReadMute);
            if self.fails_read() {
                return Err(AudioError::MuteRead("scripted failure".into()));
            }
            Ok(self.muted.get())
        }

        fn write_mute(&self, mute: bool) -> Result<(), AudioError> {
            self.calls.borrow_mut().push(Call::WriteMute(mute));
            if self.fails_write() {
                return Err(AudioError::MuteWrite("scripted failure".into()));
            }
            self.muted.set(mute);
            Ok(())
        }

        fn write_volume(&self, scalar: f32) -> Result<(), AudioError> {
            self.calls.borrow_mut().push(Call::WriteVolume(scalar));
            if self.fails_write() {
                return Err(AudioError::VolumeWrite("scripted failure".into()));
            }
            self.volume.set(scalar);
            Ok(())
        }
    }
}
