// Year cursor and autoplay state machine

use std::ops::RangeInclusive;
use chrono::{DateTime, Datelike, Utc};
use std::time::Duration;

pub const DEFAULT_MIN_YEAR: i32 = 1962;
/// Published anomaly data trails the calendar by about a year.
pub const DEFAULT_DATA_LAG_YEARS: i32 = 1;
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub current_year: i32,
    pub is_playing: bool,
    pub min_year: i32,
    pub max_year: i32,
}

impl PlaybackState {
    /// Every selectable year, oldest first.
    pub fn years(&self) -> RangeInclusive<i32> {
        self.min_year..=self.max_year
    }

    pub fn at_end(&self) -> bool {
        self.current_year >= self.max_year
    }
}

/// Emitted whenever the cursor moves; every marker retargets on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearChange {
    pub previous: i32,
    pub current: i32,
}

/// Owns the current year and the Paused/Playing mode.
///
/// The autoplay timer lives with the caller: run it only while
/// [`is_playing`](Self::is_playing) and call [`tick`](Self::tick) each time
/// it fires.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackController {
    state: PlaybackState,
    tick_interval: Duration,
}

impl PlaybackController {
    /// Starts paused at `min_year`. A `max_year` below `min_year` collapses
    /// the range to a single year.
    pub fn new(min_year: i32, max_year: i32, tick_interval: Duration) -> Self {
        let max_year = max_year.max(min_year);
        Self {
            state: PlaybackState {
                current_year: min_year,
                is_playing: false,
                min_year,
                max_year,
            },
            tick_interval,
        }
    }

    /// Derive `max_year` from the UTC calendar year of `now` minus the data lag.
    pub fn from_clock(
        min_year: i32,
        data_lag_years: i32,
        now: DateTime<Utc>,
        tick_interval: Duration,
    ) -> Self {
        Self::new(min_year, now.year() - data_lag_years, tick_interval)
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn current_year(&self) -> i32 {
        self.state.current_year
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Paused -> Playing. Returns whether the mode changed; playing from the
    /// last year does nothing rather than wrapping around.
    pub fn play(&mut self) -> bool {
        if self.state.is_playing || self.state.at_end() {
            return false;
        }
        self.state.is_playing = true;
        true
    }

    /// Playing -> Paused. Returns whether the mode changed.
    pub fn pause(&mut self) -> bool {
        if !self.state.is_playing {
            return false;
        }
        self.state.is_playing = false;
        true
    }

    /// Flip between Playing and Paused, with the same rules as `play`/`pause`.
    pub fn toggle(&mut self) -> bool {
        if self.state.is_playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// One autoplay step. Stops on reaching `max_year`.
    pub fn tick(&mut self) -> Option<YearChange> {
        if !self.state.is_playing {
            return None;
        }

        let previous = self.state.current_year;
        let next = previous.saturating_add(1);
        if next >= self.state.max_year {
            self.state.current_year = self.state.max_year;
            self.state.is_playing = false;
        } else {
            self.state.current_year = next;
        }

        self.change_from(previous)
    }

    /// Jump to `year`, clamped into range. Does not touch the play mode.
    pub fn seek(&mut self, year: i32) -> Option<YearChange> {
        let previous = self.state.current_year;
        self.state.current_year = year.clamp(self.state.min_year, self.state.max_year);
        self.change_from(previous)
    }

    /// Back to `min_year`, always paused.
    pub fn reset(&mut self) -> Option<YearChange> {
        let previous = self.state.current_year;
        self.state.current_year = self.state.min_year;
        self.state.is_playing = false;
        self.change_from(previous)
    }

    fn change_from(&self, previous: i32) -> Option<YearChange> {
        (previous != self.state.current_year).then_some(YearChange {
            previous,
            current: self.state.current_year,
        })
    }
}
