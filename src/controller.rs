// Master volume operations with a boolean success contract
//
// Failure causes are logged before being collapsed; callers only see
// success or failure, never which acquisition step broke.

use crate::audio::AudioBackend;

/// Highest percentage accepted; anything above clamps here.
pub const MAX_PERCENT: i32 = 100;

/// Linear mapping from a 0-100 percentage to the platform volume scalar.
/// Out-of-range input is clamped before conversion.
pub fn percent_to_scalar(percent: i32) -> f32 {
    percent.clamp(0, MAX_PERCENT) as f32 / 100.0
}

pub struct VolumeControl<B> {
    backend: B,
}

impl<B: AudioBackend> VolumeControl<B> {
    pub fn new(backend: B) -> Self {
        VolumeControl { backend }
    }

    /// Whether the default output device is muted.
    ///
    /// A failed read is reported as `false`, indistinguishable from a
    /// confirmed unmuted device; the cause goes to the debug log.
    pub fn is_muted(&self) -> bool {
        match self.backend.read_mute() {
            Ok(muted) => muted,
            Err(err) => {
                log::debug!("mute query failed, treating as unmuted: {err}");
                false
            }
        }
    }

    /// Flip the mute flag. Returns true iff the new state was written.
    pub fn toggle_mute(&self) -> bool {
        let muted = match self.backend.read_mute() {
            Ok(muted) => muted,
            Err(err) => {
                log::debug!("toggle mute aborted: {err}");
                return false;
            }
        };

        match self.backend.write_mute(!muted) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("toggle mute failed: {err}");
                false
            }
        }
    }

    /// Set the master volume to `percent`, clamped to [0, 100].
    /// Leaves the mute flag untouched.
    pub fn set_volume(&self, percent: i32) -> bool {
        match self.backend.write_volume(percent_to_scalar(percent)) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("set volume failed: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
impl<B> VolumeControl<B> {
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::{Call, FailMode, FakeBackend};

    #[test]
    fn test_percent_to_scalar_clamps() {
        assert_eq!(percent_to_scalar(150), percent_to_scalar(100));
        assert_eq!(percent_to_scalar(-5), percent_to_scalar(0));
        assert!((percent_to_scalar(50) - 0.5).abs() < f32::EPSILON);
        assert_eq!(percent_to_scalar(0), 0.0);
        assert_eq!(percent_to_scalar(100), 1.0);
    }

    #[test]
    fn test_set_volume_writes_scalar() {
        let control = VolumeControl::new(FakeBackend::new());
        for n in [0, 1, 35, 99, 100] {
            assert!(control.set_volume(n));
            let expected = n as f32 / 100.0;
            assert!((control.backend.volume.get() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_set_volume_out_of_range_equals_clamped() {
        let control = VolumeControl::new(FakeBackend::new());
        assert!(control.set_volume(150));
        assert_eq!(control.backend.volume.get(), 1.0);
        assert!(control.set_volume(-20));
        assert_eq!(control.backend.volume.get(), 0.0);
    }

    #[test]
    fn test_set_volume_does_not_touch_mute() {
        let control = VolumeControl::new(FakeBackend::new().muted());
        assert!(control.set_volume(40));
        assert!(control.backend.muted.get());
        assert_eq!(
            control.backend.calls.borrow().as_slice(),
            &[Call::WriteVolume(0.4)]
        );
    }

    #[test]
    fn test_toggle_mute_writes_negation() {
        let control = VolumeControl::new(FakeBackend::new());
        assert!(control.toggle_mute());
        assert!(control.backend.muted.get());
        assert_eq!(
            control.backend.calls.borrow().as_slice(),
            &[Call::ReadMute, Call::WriteMute(true)]
        );
    }

    #[test]
    fn test_toggle_mute_twice_restores_state() {
        for initially_muted in [false, true] {
            let backend = FakeBackend::new();
            backend.muted.set(initially_muted);
            let control = VolumeControl::new(backend);
            assert!(control.toggle_mute());
            assert!(control.toggle_mute());
            assert_eq!(control.backend.muted.get(), initially_muted);
        }
    }

    #[test]
    fn test_toggle_mute_aborts_when_read_fails() {
        let control = VolumeControl::new(FakeBackend::new().failing(FailMode::Reads));
        assert!(!control.toggle_mute());
        // No write may follow a failed read
        assert_eq!(control.backend.calls.borrow().as_slice(), &[Call::ReadMute]);
    }

    #[test]
    fn test_toggle_mute_fails_when_write_fails() {
        let control = VolumeControl::new(FakeBackend::new().failing(FailMode::Writes));
        assert!(!control.toggle_mute());
    }

    #[test]
    fn test_is_muted_false_on_failure() {
        let control = VolumeControl::new(FakeBackend::new().muted().failing(FailMode::All));
        assert!(!control.is_muted());
    }

    #[test]
    fn test_set_volume_false_on_failure() {
        let control = VolumeControl::new(FakeBackend::new().failing(FailMode::All));
        assert!(!control.set_volume(50));
    }
}
