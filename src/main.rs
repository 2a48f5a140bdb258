mod alerts;
mod config;
mod ui;

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use timer_core::{Countdown, FIELD_MAX};

use crate::alerts::{fire_alert, AlarmSound, AlertConfig, VibePulse};
use crate::config::Config;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Terminal countdown timer with wheel pickers and an audible alarm"
)]
struct Args {
    /// Initial minutes on the picker
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=59))]
    minutes: Option<u8>,

    /// Initial seconds on the picker
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=59))]
    seconds: Option<u8>,

    /// Alarm sound file (wav/ogg/mp3)
    #[arg(long)]
    sound: Option<PathBuf>,

    /// Disable the alarm sound
    #[arg(long)]
    no_sound: bool,

    /// Disable desktop notifications
    #[arg(long)]
    no_notify: bool,

    /// Disable the screen flash on alarm
    #[arg(long)]
    no_flash: bool,
}

fn apply_args(mut config: Config, args: &Args) -> Config {
    if let Some(minutes) = args.minutes {
        config.minutes = minutes;
    }
    if let Some(seconds) = args.seconds {
        config.seconds = seconds;
    }
    if let Some(sound) = &args.sound {
        config.sound = Some(sound.clone());
    }
    if args.no_sound {
        config.audio = false;
    }
    if args.no_notify {
        config.notification = false;
    }
    if args.no_flash {
        config.flash = false;
    }
    config
}

#[derive(Debug)]
pub enum AppEvent {
    Input(Event),
    Tick,
    Pulse,
}

enum PumpCmd {
    Start,
    Stop,
    Quit,
}

/// Owned handle to the tick pump thread. The pump posts `AppEvent::Tick`
/// once per second while started; `shutdown` is idempotent and joins the
/// thread, so no tick can be delivered after the owner is gone.
struct TickPump {
    ctrl: Sender<PumpCmd>,
    worker: Option<JoinHandle<()>>,
}

impl TickPump {
    fn spawn(events: Sender<AppEvent>) -> Self {
        let (ctrl, commands) = mpsc::channel();
        let worker = thread::spawn(move || pump_thread(&commands, &events));
        Self {
            ctrl,
            worker: Some(worker),
        }
    }

    fn start(&self) {
        let _ = self.ctrl.send(PumpCmd::Start);
    }

    fn stop(&self) {
        let _ = self.ctrl.send(PumpCmd::Stop);
    }

    fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.ctrl.send(PumpCmd::Quit);
            let _ = worker.join();
        }
    }
}

impl Drop for TickPump {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Block on control messages while stopped; while started, wait out the tick
/// interval but wake immediately for control messages.
fn pump_thread(commands: &Receiver<PumpCmd>, events: &Sender<AppEvent>) {
    let mut running = false;
    loop {
        let command = if running {
            match commands.recv_timeout(TICK_INTERVAL) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => {
                    if events.send(AppEvent::Tick).is_err() {
                        break;
                    }
                    None
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match commands.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            }
        };

        match command {
            Some(PumpCmd::Start) => running = true,
            Some(PumpCmd::Stop) => running = false,
            Some(PumpCmd::Quit) => break,
            None => {}
        }
    }
}

fn spawn_input_thread(events: Sender<AppEvent>) {
    thread::spawn(move || loop {
        match crossterm::event::read() {
            Ok(event) => {
                if events.send(AppEvent::Input(event)).is_err() {
                    break;
                }
            }
            Err(err) => {
                log::error!("input thread terminated: {}", err);
                break;
            }
        }
    });
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PickerField {
    Minutes,
    Seconds,
}

impl PickerField {
    fn other(self) -> Self {
        match self {
            PickerField::Minutes => PickerField::Seconds,
            PickerField::Seconds => PickerField::Minutes,
        }
    }
}

pub struct CountdownApp {
    pub core: Countdown,
    pub focus: PickerField,
    pub notice_visible: bool,
    pub vibe: VibePulse,
    alert_config: AlertConfig,
    alarm: AlarmSound,
    pump: TickPump,
    events: Sender<AppEvent>,
    should_quit: bool,
}

impl CountdownApp {
    fn new(config: &Config, events: Sender<AppEvent>) -> Self {
        Self {
            core: Countdown::with_duration(config.minutes, config.seconds),
            focus: PickerField::Minutes,
            notice_visible: false,
            vibe: VibePulse::new(),
            alert_config: AlertConfig::from(config),
            alarm: AlarmSound::new(config.sound.clone()),
            pump: TickPump::spawn(events.clone()),
            events,
            should_quit: false,
        }
    }

    pub fn alarm_active(&self) -> bool {
        self.alarm.is_playing() || self.vibe.is_ringing()
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.core.is_running() || self.alarm_active() {
            "Stop"
        } else {
            "Start"
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if self.notice_visible {
            // The notice blocks everything else; any key dismisses it.
            self.notice_visible = false;
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle(),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h' | 'l') => {
                self.focus = self.focus.other();
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll_focused(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_focused(-1),
            _ => {}
        }
    }

    /// Wheel scroll on the focused field, wrapping over 0..=59. While the
    /// countdown runs this only adjusts the display (core contract).
    fn scroll_focused(&mut self, delta: i16) {
        let span = i16::from(FIELD_MAX) + 1;
        match self.focus {
            PickerField::Minutes => {
                let value = (i16::from(self.core.minutes()) + delta).rem_euclid(span) as u8;
                self.core.set_minutes(value);
            }
            PickerField::Seconds => {
                let value = (i16::from(self.core.seconds()) + delta).rem_euclid(span) as u8;
                self.core.set_seconds(value);
            }
        }
    }

    fn toggle(&mut self) {
        if self.core.is_running() || self.alarm_active() {
            self.stop();
        } else {
            match self.core.start() {
                Ok(()) => {
                    log::info!("countdown started at {}", self.core.display());
                    self.pump.start();
                }
                Err(err) => {
                    log::info!("start rejected: {}", err);
                    self.notice_visible = true;
                }
            }
        }
    }

    fn stop(&mut self) {
        self.quiesce();
        self.core.stop();
    }

    /// Silence the alarm and cancel further ticks. Safe to call repeatedly.
    fn quiesce(&mut self) {
        if self.alarm.is_playing() {
            self.alarm.stop();
        }
        self.vibe.cancel();
        self.pump.stop();
    }

    fn handle_tick(&mut self) {
        if self.core.tick() {
            log::info!("countdown finished");
            self.pump.stop();
            fire_alert(
                &self.alert_config,
                &mut self.alarm,
                &mut self.vibe,
                &self.events,
                "Time's up!",
            );
        }
    }

    fn teardown(&mut self) {
        self.quiesce();
        self.pump.shutdown();
    }
}

fn init_logging() {
    let dir = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
    let Ok(file) = File::create(dir.join("countdown.log")) else {
        return;
    };
    let _ = simplelog::WriteLogger::init(
        log::LevelFilter::Info,
        simplelog::Config::default(),
        file,
    );
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        default_hook(info);
    }));
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut CountdownApp,
    events: &Receiver<AppEvent>,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;
        match events.recv() {
            Ok(AppEvent::Input(Event::Key(key))) => app.handle_key(key),
            Ok(AppEvent::Input(_)) => {} // resize and friends just redraw
            Ok(AppEvent::Tick) => app.handle_tick(),
            Ok(AppEvent::Pulse) => {} // flash phase changed; redraw
            Err(_) => break,
        }
        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging();
    let config = apply_args(Config::load(), &args);
    log::info!(
        "starting with duration {:02}:{:02}",
        config.minutes,
        config.seconds
    );

    let (events_tx, events_rx) = mpsc::channel();
    spawn_input_thread(events_tx.clone());
    let mut app = CountdownApp::new(&config, events_tx);

    let mut terminal = setup_terminal().context("failed to initialize terminal")?;
    install_panic_hook();
    let guard = TerminalGuard;

    let result = run(&mut terminal, &mut app, &events_rx);
    app.teardown();
    drop(guard);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_override_config() {
        let args = Args::parse_from([
            "countdown",
            "--minutes",
            "2",
            "--seconds",
            "15",
            "--no-sound",
            "--sound",
            "/tmp/ring.wav",
        ]);
        let config = apply_args(Config::default(), &args);
        assert_eq!(config.minutes, 2);
        assert_eq!(config.seconds, 15);
        assert!(!config.audio);
        assert!(config.notification);
        assert_eq!(config.sound, Some(PathBuf::from("/tmp/ring.wav")));
    }

    #[test]
    fn bare_args_leave_config_untouched() {
        let args = Args::parse_from(["countdown"]);
        let config = apply_args(Config::default(), &args);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn out_of_range_picker_args_are_rejected() {
        assert!(Args::try_parse_from(["countdown", "--minutes", "60"]).is_err());
        assert!(Args::try_parse_from(["countdown", "--seconds", "-1"]).is_err());
    }

    #[test]
    fn picker_focus_toggles() {
        assert_eq!(PickerField::Minutes.other(), PickerField::Seconds);
        assert_eq!(PickerField::Seconds.other(), PickerField::Minutes);
    }

    #[test]
    fn pump_ticks_once_started_and_stays_quiet_after_stop() {
        let (tx, rx) = mpsc::channel();
        let mut pump = TickPump::spawn(tx);

        pump.start();
        match rx.recv_timeout(Duration::from_secs(3)) {
            Ok(AppEvent::Tick) => {}
            other => panic!("expected a tick, got {:?}", other),
        }

        pump.stop();
        // Drain anything already in flight when the stop landed.
        thread::sleep(Duration::from_millis(50));
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(1300)).is_err());

        pump.shutdown();
        pump.shutdown(); // idempotent
    }
}
