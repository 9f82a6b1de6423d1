// Linux audio backend using PulseAudio
// Master volume and mute on the server's default sink

use super::{AudioBackend, AudioError};
use libpulse_binding as pulse;
use libpulse_binding::callbacks::ListResult;
use libpulse_binding::context::{Context, FlagSet as ContextFlagSet};
use libpulse_binding::mainloop::threaded::Mainloop;
use libpulse_binding::proplist::Proplist;
use libpulse_binding::volume::{ChannelVolumes, Volume};
use std::sync::{Arc, Mutex};

pub struct SystemBackend;

impl AudioBackend for SystemBackend {
    fn read_mute(&self) -> Result<bool, AudioError> {
        let mut session = PulseSession::connect()?;
        let sink = session.default_sink_name()?;
        let state = session
            .sink_state(&sink)
            .ok_or_else(|| AudioError::MuteRead(format!("no state for sink {sink}")))?;
        Ok(state.muted)
    }

    fn write_mute(&self, mute: bool) -> Result<(), AudioError> {
        let mut session = PulseSession::connect()?;
        let sink = session.default_sink_name()?;
        match session.set_sink_mute(&sink, mute) {
            Some(true) => Ok(()),
            _ => Err(AudioError::MuteWrite(format!(
                "server rejected mute change for sink {sink}"
            ))),
        }
    }

    fn write_volume(&self, scalar: f32) -> Result<(), AudioError> {
        let mut session = PulseSession::connect()?;
        let sink = session.default_sink_name()?;

        // Existing channel layout is needed to build the new volume set
        let state = session
            .sink_state(&sink)
            .ok_or_else(|| AudioError::VolumeWrite(format!("no state for sink {sink}")))?;

        let raw = (scalar * Volume::NORMAL.0 as f32).round() as u32;
        let mut volumes = state.volumes;
        volumes.set(volumes.len(), Volume(raw));

        match session.set_sink_volumes(&sink, &volumes) {
            Some(true) => Ok(()),
            _ => Err(AudioError::VolumeWrite(format!(
                "server rejected volume change for sink {sink}"
            ))),
        }
    }
}

struct SinkState {
    muted: bool,
    volumes: ChannelVolumes,
}

/// One connected PulseAudio session. The mainloop and context are torn
/// down on drop, on every exit path.
struct PulseSession {
    mainloop: Mainloop,
    context: Context,
}

impl PulseSession {
    fn connect() -> Result<Self, AudioError> {
        let mut proplist = Proplist::new()
            .ok_or_else(|| AudioError::SubsystemInit("failed to create proplist".into()))?;
        proplist
            .set_str(pulse::proplist::properties::APPLICATION_NAME, "volctl")
            .map_err(|_| AudioError::SubsystemInit("failed to set application name".into()))?;

        let mut mainloop = Mainloop::new()
            .ok_or_else(|| AudioError::SubsystemInit("failed to create mainloop".into()))?;
        let mut context = Context::new_with_proplist(&mainloop, "VolctlContext", &proplist)
            .ok_or_else(|| AudioError::SubsystemInit("failed to create context".into()))?;

        context
            .connect(None, ContextFlagSet::NOFLAGS, None)
            .map_err(|e| AudioError::SubsystemInit(format!("failed to connect: {e:?}")))?;

        mainloop.lock();
        if let Err(e) = mainloop.start() {
            mainloop.unlock();
            return Err(AudioError::SubsystemInit(format!(
                "failed to start mainloop: {e:?}"
            )));
        }

        // Wait for the context to become ready
        loop {
            match context.get_state() {
                pulse::context::State::Ready => break,
                pulse::context::State::Failed | pulse::context::State::Terminated => {
                    mainloop.unlock();
                    mainloop.stop();
                    return Err(AudioError::SubsystemInit("context failed".into()));
                }
                _ => {
                    mainloop.unlock();
                    std::thread::sleep(std::time::Duration::from_millis(10));
                    mainloop.lock();
                }
            }
        }
        mainloop.unlock();

        Ok(PulseSession { mainloop, context })
    }

    /// Name of the server's default sink (the default output device).
    fn default_sink_name(&mut self) -> Result<String, AudioError> {
        let result = Arc::new(Mutex::new(None));
        let result_cb = Arc::clone(&result);

        self.mainloop.lock();
        let introspect = self.context.introspect();
        introspect.get_server_info(move |server_info| {
            let name = server_info
                .default_sink_name
                .as_ref()
                .map(|n| n.to_string());
            *result_cb.lock().unwrap() = Some(name);
        });
        self.mainloop.unlock();

        match wait_for(&result) {
            Some(Some(name)) => Ok(name),
            Some(None) => Err(AudioError::NoDefaultDevice(
                "server reports no default sink".into(),
            )),
            None => Err(AudioError::NoDefaultDevice(
                "timed out querying server info".into(),
            )),
        }
    }

    /// Mute flag and channel volumes of the named sink.
    fn sink_state(&mut self, sink: &str) -> Option<SinkState> {
        let result = Arc::new(Mutex::new(None));
        let result_cb = Arc::clone(&result);

        self.mainloop.lock();
        let introspect = self.context.introspect();
        introspect.get_sink_info_by_name(sink, move |list_result| {
            if let ListResult::Item(sink_info) = list_result {
                *result_cb.lock().unwrap() = Some(SinkState {
                    muted: sink_info.mute,
                    volumes: sink_info.volume,
                });
            }
        });
        self.mainloop.unlock();

        wait_for(&result)
    }

    fn set_sink_mute(&mut self, sink: &str, mute: bool) -> Option<bool> {
        let result = Arc::new(Mutex::new(None));
        let result_cb = Arc::clone(&result);

        self.mainloop.lock();
        let mut introspect = self.context.introspect();
        introspect.set_sink_mute_by_name(
            sink,
            mute,
            Some(Box::new(move |success| {
                *result_cb.lock().unwrap() = Some(success);
            })),
        );
        self.mainloop.unlock();

        wait_for(&result)
    }

    fn set_sink_volumes(&mut self, sink: &str, volumes: &ChannelVolumes) -> Option<bool> {
        let result = Arc::new(Mutex::new(None));
        let result_cb = Arc::clone(&result);

        self.mainloop.lock();
        let mut introspect = self.context.introspect();
        introspect.set_sink_volume_by_name(
            sink,
            volumes,
            Some(Box::new(move |success| {
                *result_cb.lock().unwrap() = Some(success);
            })),
        );
        self.mainloop.unlock();

        wait_for(&result)
    }
}

impl Drop for PulseSession {
    fn drop(&mut self) {
        self.mainloop.lock();
        self.context.disconnect();
        self.mainloop.unlock();
        self.mainloop.stop();
    }
}

// Poll for a callback result; the mainloop lock must not be held here
fn wait_for<T>(slot: &Arc<Mutex<Option<T>>>) -> Option<T> {
    for _ in 0..50 {
        std::thread::sleep(std::time::Duration::from_millis(10));
        if slot.lock().unwrap().is_some() {
            break;
        }
    }
    slot.lock().unwrap().take()
}
