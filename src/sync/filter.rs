use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveTime, Timelike, Weekday};

use crate::types::PlayedTrack;

const SECONDS_PER_DAY: u32 = 86_400;
const SECONDS_PER_WEEK: u32 = 7 * SECONDS_PER_DAY;

/// A recurring weekly time range, such as Tuesday 22:00 to Wednesday 01:00.
///
/// The start is inclusive and the end exclusive. Days and times are compared
/// in the offset the play was reported in, never converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlackoutWindow {
    pub start_day: Weekday,
    pub start_time: NaiveTime,
    pub end_day: Weekday,
    pub end_time: NaiveTime,
}

impl BlackoutWindow {
    pub fn new(start_day: Weekday, start_time: NaiveTime, end_day: Weekday, end_time: NaiveTime) -> Self {
        Self {
            start_day,
            start_time,
            end_day,
            end_time,
        }
    }

    /// Whether `day` at `time` falls inside the window.
    ///
    /// Windows may wrap across the end of the week (e.g. Sunday to Monday).
    pub fn contains(&self, day: Weekday, time: NaiveTime) -> bool {
        let start = week_position(self.start_day, self.start_time);
        let end = week_position(self.end_day, self.end_time);
        let at = week_position(day, time);

        if start <= end {
            start <= at && at < end
        } else {
            at >= start || at < end
        }
    }
}

fn week_position(day: Weekday, time: NaiveTime) -> u32 {
    day.num_days_from_monday() * SECONDS_PER_DAY + time.num_seconds_from_midnight()
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| format!("'{}' is not a time of day (HH:MM)", raw))
}

fn parse_point(raw: &str) -> Result<(Weekday, NaiveTime), String> {
    let mut parts = raw.split_whitespace();
    let (Some(day), Some(time), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected '<day> <HH:MM>', got '{}'", raw.trim()));
    };
    let day = day
        .parse::<Weekday>()
        .map_err(|_| format!("'{}' is not a day of the week", day))?;
    Ok((day, parse_time(time)?))
}

impl FromStr for BlackoutWindow {
    type Err = String;

    /// Parses `<day> <HH:MM> - <day> <HH:MM>`, e.g. `tue 22:00 - wed 01:00`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((start, end)) = s.split_once('-') else {
            return Err(format!("expected '<day> <HH:MM> - <day> <HH:MM>', got '{}'", s));
        };
        let (start_day, start_time) = parse_point(start)?;
        let (end_day, end_time) = parse_point(end)?;

        if week_position(start_day, start_time) % SECONDS_PER_WEEK
            == week_position(end_day, end_time) % SECONDS_PER_WEEK
        {
            return Err(format!("window '{}' is empty", s.trim()));
        }

        Ok(BlackoutWindow::new(start_day, start_time, end_day, end_time))
    }
}

impl fmt::Display for BlackoutWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - {} {}",
            self.start_day,
            self.start_time.format("%H:%M"),
            self.end_day,
            self.end_time.format("%H:%M")
        )
    }
}

/// Excludes plays that fall inside any configured blackout window.
#[derive(Debug, Clone, Default)]
pub struct ProgramFilter {
    windows: Vec<BlackoutWindow>,
}

impl ProgramFilter {
    pub fn new(windows: Vec<BlackoutWindow>) -> Self {
        Self { windows }
    }

    pub fn is_ignored(&self, track: &PlayedTrack) -> bool {
        self.matching_window(track).is_some()
    }

    pub fn matching_window(&self, track: &PlayedTrack) -> Option<&BlackoutWindow> {
        let day = track.played_at.weekday();
        let time = track.played_at.time();
        self.windows.iter().find(|w| w.contains(day, time))
    }
}
