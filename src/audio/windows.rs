// Windows audio backend using WASAPI
// Master volume and mute on the default render endpoint (eRender/eConsole)

use super::{AudioBackend, AudioError};
use windows::Win32::Media::Audio::Endpoints::IAudioEndpointVolume;
use windows::Win32::Media::Audio::{eConsole, eRender, IMMDeviceEnumerator, MMDeviceEnumerator};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_ALL, COINIT_APARTMENTTHREADED,
};

pub struct SystemBackend;

impl AudioBackend for SystemBackend {
    fn read_mute(&self) -> Result<bool, AudioError> {
        let endpoint = EndpointVolume::open()?;
        endpoint.read_mute()
    }

    fn write_mute(&self, mute: bool) -> Result<(), AudioError> {
        let endpoint = EndpointVolume::open()?;
        endpoint.write_mute(mute)
    }

    fn write_volume(&self, scalar: f32) -> Result<(), AudioError> {
        let endpoint = EndpointVolume::open()?;
        endpoint.write_volume(scalar)
    }
}

/// COM init guard for the calling thread. Constructed only after
/// `CoInitializeEx` succeeds, so `CoUninitialize` runs exactly once per
/// successful init, on every exit path.
struct ComSession;

impl ComSession {
    fn init() -> Result<Self, AudioError> {
        unsafe {
            CoInitializeEx(None, COINIT_APARTMENTTHREADED)
                .ok()
                .map_err(|e| AudioError::SubsystemInit(e.to_string()))?;
        }
        Ok(ComSession)
    }
}

impl Drop for ComSession {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}

/// One acquired endpoint-volume interface on the default render device.
///
/// The enumerator and device handle are released as soon as activation
/// completes; the interface itself and the COM session are released on
/// drop. Field order matters: `volume` must release before `_com`
/// uninitializes the thread.
struct EndpointVolume {
    volume: IAudioEndpointVolume,
    _com: ComSession,
}

impl EndpointVolume {
    fn open() -> Result<Self, AudioError> {
        let com = ComSession::init()?;

        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                    .map_err(|e| AudioError::Enumerator(e.to_string()))?;

            let device = enumerator
                .GetDefaultAudioEndpoint(eRender, eConsole)
                .map_err(|e| AudioError::NoDefaultDevice(e.to_string()))?;

            let volume: IAudioEndpointVolume = device
                .Activate(CLSCTX_ALL, None)
                .map_err(|e| AudioError::Activation(e.to_string()))?;

            Ok(EndpointVolume { volume, _com: com })
        }
    }

    fn read_mute(&self) -> Result<bool, AudioError> {
        unsafe {
            let muted = self
                .volume
                .GetMute()
                .map_err(|e| AudioError::MuteRead(e.to_string()))?;
            Ok(muted.as_bool())
        }
    }

    fn write_mute(&self, mute: bool) -> Result<(), AudioError> {
        unsafe {
            self.volume
                .SetMute(mute, std::ptr::null())
                .map_err(|e| AudioError::MuteWrite(e.to_string()))
        }
    }

    fn write_volume(&self, scalar: f32) -> Result<(), AudioError> {
        unsafe {
            self.volume
                .SetMasterVolumeLevelScalar(scalar, std::ptr::null())
                .map_err(|e| AudioError::VolumeWrite(e.to_string()))
        }
    }
}
