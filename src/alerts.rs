use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use notify_rust::{Notification, Urgency};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::config::Config;
use crate::AppEvent;

/// Vibration pattern from the handset version: wait 1s, pulse 2s, wait 3s,
/// repeating until cancelled. Even slots are quiet, odd slots pulse.
pub const VIBE_PATTERN_MS: [u64; 3] = [1000, 2000, 3000];

const PULSE_SLICE_MS: u64 = 25;

/// System alert sounds to probe when no alarm file is configured.
const DEFAULT_SOUND_PATHS: &[&str] = &[
    "/usr/share/sounds/freedesktop/stereo/alarm-clock-elapsed.oga",
    "/usr/share/sounds/freedesktop/stereo/complete.oga",
    "/usr/share/sounds/sound-icons/guitar-11.wav",
];

#[derive(Clone, Debug)]
pub struct AlertConfig {
    pub audio: bool,
    pub notification: bool,
    pub flash: bool,
}

impl From<&Config> for AlertConfig {
    fn from(config: &Config) -> Self {
        Self {
            audio: config.audio,
            notification: config.notification,
            flash: config.flash,
        }
    }
}

/// Completion side effects, fired once per finished countdown.
pub fn fire_alert(
    config: &AlertConfig,
    alarm: &mut AlarmSound,
    vibe: &mut VibePulse,
    wake: &Sender<AppEvent>,
    message: &str,
) {
    if config.audio && alarm.is_available() {
        alarm.play();
    }
    if config.flash {
        vibe.start(wake.clone());
    }
    if config.notification {
        notify(message);
    }
}

fn notify(message: &str) {
    let result = Notification::new()
        .summary("Countdown")
        .body(message)
        .urgency(Urgency::Critical)
        .show();
    if let Err(err) = result {
        log::warn!("desktop notification failed: {}", err);
    }
}

/// The alarm sound, held as a prepared-but-paused sink so playback starts
/// instantly on completion. Any failure along the way (no output device,
/// missing file, undecodable asset) logs and leaves the sound disabled;
/// the countdown, flash, and notification still proceed.
pub struct AlarmSound {
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
    source: Option<PathBuf>,
}

impl AlarmSound {
    pub fn new(source: Option<PathBuf>) -> Self {
        let source = source.or_else(default_sound_path);
        if source.is_none() {
            log::warn!("no alarm sound file found; playback disabled");
        }
        let output = match OutputStream::try_default() {
            Ok(output) => Some(output),
            Err(err) => {
                log::error!("no audio output device: {}", err);
                None
            }
        };
        let mut alarm = Self {
            output,
            sink: None,
            source,
        };
        alarm.prepare();
        alarm
    }

    /// Load the asset into a fresh paused sink. Clears any previous handle.
    pub fn prepare(&mut self) {
        self.sink = None;
        let Some((_, handle)) = &self.output else {
            return;
        };
        let Some(path) = &self.source else {
            return;
        };
        match load_sink(path, handle) {
            Ok(sink) => self.sink = Some(sink),
            Err(err) => log::error!("failed to prepare alarm sound {}: {}", path.display(), err),
        }
    }

    pub fn is_available(&self) -> bool {
        self.sink.is_some()
    }

    pub fn play(&mut self) {
        // A sink drained by a previous completion cannot replay; re-arm so
        // every run gets a fresh playable handle.
        if self.sink.as_ref().is_none_or(|sink| sink.empty()) {
            self.prepare();
        }
        match &self.sink {
            Some(sink) => sink.play(),
            None => log::warn!("alarm sound unavailable; skipping playback"),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .map(|sink| !sink.empty() && !sink.is_paused())
            .unwrap_or(false)
    }

    /// Halt playback and re-arm. The handle from an interrupted run is
    /// discarded rather than reused.
    pub fn stop(&mut self) {
        if let Some(sink) = &self.sink {
            sink.stop();
        }
        self.prepare();
    }
}

fn load_sink(path: &Path, handle: &OutputStreamHandle) -> anyhow::Result<Sink> {
    let file = File::open(path)?;
    let source = Decoder::new(BufReader::new(file))?;
    let sink = Sink::try_new(handle)?;
    sink.pause();
    sink.append(source);
    Ok(sink)
}

fn default_sound_path() -> Option<PathBuf> {
    DEFAULT_SOUND_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

fn slot_pulses(index: usize) -> bool {
    index % 2 == 1
}

/// Repeating flash pattern standing in for the device vibrator: a worker
/// thread walks `VIBE_PATTERN_MS`, toggling the shared phase flag and waking
/// the event loop so the display repaints. Cancellation is prompt (the sleep
/// is sliced) and idempotent.
pub struct VibePulse {
    phase_on: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl VibePulse {
    pub fn new() -> Self {
        Self {
            phase_on: Arc::new(AtomicBool::new(false)),
            cancelled: Arc::new(AtomicBool::new(true)),
            worker: None,
        }
    }

    pub fn start(&mut self, wake: Sender<AppEvent>) {
        self.cancel();
        let phase_on = Arc::clone(&self.phase_on);
        let cancelled = Arc::new(AtomicBool::new(false));
        self.cancelled = Arc::clone(&cancelled);
        self.worker = Some(thread::spawn(move || {
            pulse_thread(&phase_on, &cancelled, &wake);
        }));
    }

    /// True while the pattern thread is live.
    pub fn is_ringing(&self) -> bool {
        self.worker.is_some()
    }

    /// True during the "on" slots of the pattern; drives the display flash.
    pub fn phase_on(&self) -> bool {
        self.phase_on.load(Ordering::Relaxed)
    }

    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.phase_on.store(false, Ordering::Relaxed);
    }
}

impl Drop for VibePulse {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn pulse_thread(phase_on: &AtomicBool, cancelled: &AtomicBool, wake: &Sender<AppEvent>) {
    'pattern: loop {
        for (slot, &duration_ms) in VIBE_PATTERN_MS.iter().enumerate() {
            phase_on.store(slot_pulses(slot), Ordering::Relaxed);
            if wake.send(AppEvent::Pulse).is_err() {
                break 'pattern;
            }
            let mut slept = 0;
            while slept < duration_ms {
                if cancelled.load(Ordering::Relaxed) {
                    break 'pattern;
                }
                thread::sleep(Duration::from_millis(PULSE_SLICE_MS));
                slept += PULSE_SLICE_MS;
            }
        }
    }
    phase_on.store(false, Ordering::Relaxed);
    let _ = wake.send(AppEvent::Pulse);
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn pattern_slots_alternate_starting_quiet() {
        assert!(!slot_pulses(0));
        assert!(slot_pulses(1));
        assert!(!slot_pulses(2));
    }

    #[test]
    fn vibe_pulse_start_and_cancel() {
        let (tx, rx) = mpsc::channel();
        let mut vibe = VibePulse::new();
        assert!(!vibe.is_ringing());

        vibe.start(tx);
        assert!(vibe.is_ringing());
        // The worker posts a wake-up as soon as it enters the first slot.
        assert!(rx.recv_timeout(Duration::from_millis(500)).is_ok());

        vibe.cancel();
        assert!(!vibe.is_ringing());
        assert!(!vibe.phase_on());
        // Cancelling again is a no-op.
        vibe.cancel();
    }

    #[test]
    fn missing_alarm_asset_disables_playback() {
        let mut alarm = AlarmSound::new(Some(PathBuf::from("/nonexistent/alarm.wav")));
        assert!(!alarm.is_available());
        assert!(!alarm.is_playing());
        // Disabled playback must be inert, not a crash.
        alarm.play();
        alarm.stop();
        assert!(!alarm.is_playing());
    }
}
