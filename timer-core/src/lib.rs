//! Pure countdown logic with no platform dependencies.
//! Driven by the app's one-second pump, testable on host.

use std::fmt;

/// Both picker fields range over 0..=59.
pub const FIELD_MAX: u8 = 59;

pub const DEFAULT_MINUTES: u8 = 0;
pub const DEFAULT_SECONDS: u8 = 5;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RunState {
    Idle,
    Running,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StartError {
    ZeroDuration,
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::ZeroDuration => write!(f, "countdown duration is zero"),
        }
    }
}

impl std::error::Error for StartError {}

/// Countdown state machine.
///
/// `minutes`/`seconds` are the *live* (displayed) values; they mirror the
/// user-set duration while idle and track `time_remaining` while running.
/// The user-set duration can only change while idle and is what the display
/// is restored to after every run.
#[derive(Clone, Debug)]
pub struct Countdown {
    state: RunState,
    time_remaining: u32,
    minutes: u8,
    seconds: u8,
    user_minutes: u8,
    user_seconds: u8,
}

impl Countdown {
    pub fn new() -> Self {
        Self::with_duration(DEFAULT_MINUTES, DEFAULT_SECONDS)
    }

    pub fn with_duration(minutes: u8, seconds: u8) -> Self {
        let minutes = minutes.min(FIELD_MAX);
        let seconds = seconds.min(FIELD_MAX);
        Self {
            state: RunState::Idle,
            time_remaining: 0,
            minutes,
            seconds,
            user_minutes: minutes,
            user_seconds: seconds,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Whole seconds left in the current run; 0 while idle.
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn user_minutes(&self) -> u8 {
        self.user_minutes
    }

    pub fn user_seconds(&self) -> u8 {
        self.user_seconds
    }

    /// While idle, sets both the user duration and the display. While
    /// running, only the display changes; the next tick overwrites it.
    pub fn set_minutes(&mut self, value: u8) {
        let value = value.min(FIELD_MAX);
        self.minutes = value;
        if self.state == RunState::Idle {
            self.user_minutes = value;
        }
    }

    pub fn set_seconds(&mut self, value: u8) {
        let value = value.min(FIELD_MAX);
        self.seconds = value;
        if self.state == RunState::Idle {
            self.user_seconds = value;
        }
    }

    /// Snapshots the user-set duration into `time_remaining` and starts
    /// counting. A zero duration is rejected with no state change.
    pub fn start(&mut self) -> Result<(), StartError> {
        if self.state == RunState::Running {
            return Ok(());
        }
        if self.user_minutes == 0 && self.user_seconds == 0 {
            return Err(StartError::ZeroDuration);
        }
        self.time_remaining = u32::from(self.user_minutes) * 60 + u32::from(self.user_seconds);
        self.minutes = self.user_minutes;
        self.seconds = self.user_seconds;
        self.state = RunState::Running;
        Ok(())
    }

    /// One pump interval elapsed. Sole mutator of `time_remaining`.
    ///
    /// Returns `true` exactly on the transition to zero; the countdown then
    /// goes idle with the display restored to the user-set duration, so a
    /// repeated or late tick cannot re-fire the completion. Ticks delivered
    /// while idle (e.g. one already queued when `stop` ran) are ignored.
    pub fn tick(&mut self) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        let (minutes, seconds) = split_mmss(self.time_remaining);
        self.minutes = minutes;
        self.seconds = seconds;
        if self.time_remaining == 0 {
            self.complete();
            true
        } else {
            false
        }
    }

    fn complete(&mut self) {
        self.state = RunState::Idle;
        self.minutes = self.user_minutes;
        self.seconds = self.user_seconds;
    }

    /// Cancels the run and restores the user-set duration on the display.
    /// Idempotent: stopping while idle only resets the display.
    pub fn stop(&mut self) {
        self.state = RunState::Idle;
        self.time_remaining = 0;
        self.minutes = self.user_minutes;
        self.seconds = self.user_seconds;
    }

    /// The live duration as "MM:SS".
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.minutes, self.seconds)
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Split whole seconds into (minutes, seconds).
pub fn split_mmss(total_secs: u32) -> (u8, u8) {
    ((total_secs / 60) as u8, (total_secs % 60) as u8)
}

/// Format whole seconds as "MM:SS".
pub fn format_mmss(total_secs: u32) -> String {
    let (m, s) = split_mmss(total_secs);
    format!("{:02}:{:02}", m, s)
}

/// Two-digit zero-padded picker label.
pub fn field_label(value: u8) -> String {
    format!("{:02}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_snapshots_duration() {
        for (m, s) in [(0u8, 1u8), (0, 5), (1, 30), (10, 0), (59, 59)] {
            let mut cd = Countdown::with_duration(m, s);
            assert_eq!(cd.start(), Ok(()));
            assert_eq!(cd.state(), RunState::Running);
            assert_eq!(cd.time_remaining(), u32::from(m) * 60 + u32::from(s));
        }
    }

    #[test]
    fn test_zero_duration_start_rejected() {
        let mut cd = Countdown::with_duration(0, 0);
        assert_eq!(cd.start(), Err(StartError::ZeroDuration));
        assert_eq!(cd.state(), RunState::Idle);
        assert_eq!(cd.time_remaining(), 0);
    }

    #[test]
    fn test_exact_ticks_complete_once() {
        let mut cd = Countdown::with_duration(0, 5);
        cd.start().unwrap();
        for _ in 0..4 {
            assert!(!cd.tick());
            assert!(cd.is_running());
        }
        assert!(cd.tick()); // fifth tick is the completion edge
        assert_eq!(cd.state(), RunState::Idle);
        assert_eq!(cd.time_remaining(), 0);
        // A late tick after completion must not re-fire or mutate anything.
        assert!(!cd.tick());
        assert_eq!(cd.display(), "00:05");
    }

    #[test]
    fn test_completion_restores_display() {
        let mut cd = Countdown::with_duration(1, 1);
        cd.start().unwrap();
        assert!(!cd.tick());
        assert_eq!((cd.minutes(), cd.seconds()), (1, 0));
        for _ in 0..59 {
            assert!(!cd.tick());
        }
        assert!(cd.tick());
        assert_eq!((cd.minutes(), cd.seconds()), (1, 1));
        assert_eq!((cd.user_minutes(), cd.user_seconds()), (1, 1));
    }

    #[test]
    fn test_stop_cancels_and_ignores_late_tick() {
        let mut cd = Countdown::with_duration(0, 10);
        cd.start().unwrap();
        assert!(!cd.tick());
        cd.stop();
        assert_eq!(cd.state(), RunState::Idle);
        assert_eq!(cd.time_remaining(), 0);
        // A tick already queued when stop ran arrives afterwards.
        assert!(!cd.tick());
        assert_eq!(cd.time_remaining(), 0);
        assert_eq!(cd.display(), "00:10");
    }

    #[test]
    fn test_stop_while_idle_is_a_display_reset() {
        let mut cd = Countdown::with_duration(2, 0);
        cd.stop();
        cd.stop();
        assert_eq!(cd.state(), RunState::Idle);
        assert_eq!((cd.minutes(), cd.seconds()), (2, 0));
    }

    #[test]
    fn test_running_edits_are_cosmetic() {
        let mut cd = Countdown::with_duration(0, 30);
        cd.start().unwrap();
        cd.set_minutes(9);
        cd.set_seconds(9);
        assert_eq!((cd.minutes(), cd.seconds()), (9, 9));
        assert_eq!((cd.user_minutes(), cd.user_seconds()), (0, 30));
        assert_eq!(cd.time_remaining(), 30);
        // The next tick rederives the display from the countdown.
        assert!(!cd.tick());
        assert_eq!((cd.minutes(), cd.seconds()), (0, 29));
        cd.stop();
        assert_eq!((cd.minutes(), cd.seconds()), (0, 30));
    }

    #[test]
    fn test_idle_edits_update_both() {
        let mut cd = Countdown::new();
        cd.set_minutes(3);
        cd.set_seconds(45);
        assert_eq!((cd.minutes(), cd.seconds()), (3, 45));
        assert_eq!((cd.user_minutes(), cd.user_seconds()), (3, 45));
    }

    #[test]
    fn test_default_five_second_scenario() {
        let mut cd = Countdown::new();
        assert_eq!((cd.minutes(), cd.seconds()), (0, 5));
        cd.start().unwrap();
        assert_eq!(cd.time_remaining(), 5);
        let mut completions = 0;
        for _ in 0..5 {
            if cd.tick() {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(cd.display(), "00:05");
    }

    #[test]
    fn test_out_of_range_values_clamp() {
        let mut cd = Countdown::with_duration(200, 200);
        assert_eq!((cd.minutes(), cd.seconds()), (59, 59));
        cd.set_seconds(100);
        assert_eq!(cd.seconds(), 59);
    }

    #[test]
    fn test_restart_after_completion() {
        let mut cd = Countdown::with_duration(0, 2);
        cd.start().unwrap();
        assert!(!cd.tick());
        assert!(cd.tick());
        assert_eq!(cd.start(), Ok(()));
        assert_eq!(cd.time_remaining(), 2);
        assert!(cd.is_running());
    }

    #[test]
    fn test_format_mmss() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(61), "01:01");
        assert_eq!(format_mmss(3599), "59:59");
    }

    #[test]
    fn test_field_label() {
        assert_eq!(field_label(0), "00");
        assert_eq!(field_label(7), "07");
        assert_eq!(field_label(59), "59");
    }
}
