use dwat_types::TimeLeft;

pub const MS_PER_SECOND: u64 = 1_000;
pub const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Period of the display tick.
pub const TICK_INTERVAL_MS: u32 = 1_000;

/// Split `target - now` (epoch milliseconds) into calendar units. A target in
/// the past yields all zeros.
pub fn time_left(target_ms: i64, now_ms: i64) -> TimeLeft {
    let remaining = target_ms.saturating_sub(now_ms);
    if remaining <= 0 {
        return TimeLeft::ZERO;
    }
    let remaining = remaining as u64;

    TimeLeft {
        days: remaining / MS_PER_DAY,
        hours: (remaining % MS_PER_DAY) / MS_PER_HOUR,
        minutes: (remaining % MS_PER_HOUR) / MS_PER_MINUTE,
        seconds: (remaining % MS_PER_MINUTE) / MS_PER_SECOND,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub time_left: TimeLeft,
    /// True on the single tick where the target was first reached.
    pub completed_now: bool,
}

/// Countdown for one mounted timer. Once the target is reached it stays at
/// zero and reports completion exactly once.
#[derive(Debug, Clone)]
pub struct Countdown {
    target_ms: i64,
    finished: bool,
}

impl Countdown {
    pub fn new(target_ms: i64) -> Self {
        Self {
            target_ms,
            finished: false,
        }
    }

    pub fn target_ms(&self) -> i64 {
        self.target_ms
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn tick(&mut self, now_ms: i64) -> Tick {
        if self.finished {
            return Tick {
                time_left: TimeLeft::ZERO,
                completed_now: false,
            };
        }

        if self.target_ms.saturating_sub(now_ms) <= 0 {
            self.finished = true;
            return Tick {
                time_left: TimeLeft::ZERO,
                completed_now: true,
            };
        }

        Tick {
            time_left: time_left(self.target_ms, now_ms),
            completed_now: false,
        }
    }
}

/// Labelled two-digit strings for the four timer cells.
pub fn display_units(left: &TimeLeft) -> [(&'static str, String); 4] {
    [
        ("Days", format!("{:02}", left.days)),
        ("Hours", format!("{:02}", left.hours)),
        ("Minutes", format!("{:02}", left.minutes)),
        ("Seconds", format!("{:02}", left.seconds)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_735_689_599_000;

    #[test]
    fn one_of_each_unit() {
        let left = time_left(NOW + 90_061_000, NOW);
        assert_eq!(
            left,
            TimeLeft {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1
            }
        );
    }

    #[test]
    fn units_sum_to_remaining_seconds() {
        for offset in [1_000_i64, 59_999, 3_600_000, 86_399_999, 86_400_000, 987_654_321, 31_536_000_123] {
            let left = time_left(NOW + offset, NOW);
            assert_eq!(left.total_seconds(), (offset / 1_000) as u64, "offset {offset}");
            assert!(left.hours < 24 && left.minutes < 60 && left.seconds < 60);
        }
    }

    #[test]
    fn past_target_is_zero() {
        assert_eq!(time_left(NOW - 5_000, NOW), TimeLeft::ZERO);
        assert_eq!(time_left(NOW, NOW), TimeLeft::ZERO);
        assert_eq!(time_left(i64::MIN, i64::MAX), TimeLeft::ZERO);
    }

    #[test]
    fn completion_fires_once() {
        let mut countdown = Countdown::new(NOW - 1);
        let first = countdown.tick(NOW);
        assert!(first.completed_now);
        assert_eq!(first.time_left, TimeLeft::ZERO);

        for later in 1..50 {
            let tick = countdown.tick(NOW + later * 1_000);
            assert!(!tick.completed_now);
            assert_eq!(tick.time_left, TimeLeft::ZERO);
        }
        assert!(countdown.is_finished());
    }

    #[test]
    fn runs_down_then_freezes() {
        let mut countdown = Countdown::new(NOW + 2_500);

        let tick = countdown.tick(NOW);
        assert_eq!(tick.time_left.seconds, 2);
        assert!(!tick.completed_now);

        let tick = countdown.tick(NOW + 2_000);
        assert_eq!(tick.time_left, TimeLeft::ZERO);
        assert!(!tick.completed_now);

        assert!(countdown.tick(NOW + 3_000).completed_now);
        // A clock stepping backwards does not restart a finished countdown.
        assert_eq!(countdown.tick(NOW).time_left, TimeLeft::ZERO);
    }

    #[test]
    fn display_pads_to_two_digits() {
        let units = display_units(&time_left(NOW + 90_061_000, NOW));
        assert_eq!(units[0], ("Days", "01".to_owned()));
        assert_eq!(units[3], ("Seconds", "01".to_owned()));

        let long = TimeLeft {
            days: 120,
            ..TimeLeft::ZERO
        };
        assert_eq!(display_units(&long)[0].1, "120");
    }
}
