// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity models: wire format, internal record, and query window.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Deserialize;

/// Summary activity as returned by `GET /api/v3/athlete/activities`.
///
/// Only the fields the heatmap needs are decoded; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryActivityV3 {
    #[serde(default)]
    pub name: String,
    /// Seconds of movement, excluding pauses
    pub moving_time: i64,
    /// Distance in meters
    #[serde(default)]
    pub distance: f64,
    /// Start time (UTC, ISO 8601)
    pub start_date: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub activity_type: String,
}

/// One activity, decoupled from the wire schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub name: String,
    /// Use moving time, not elapsed time: an activity can be paused and
    /// resumed hours later.
    pub moving_time_seconds: i64,
    pub distance_meters: f64,
    pub start_date_utc: DateTime<Utc>,
    pub activity_type: String,
}

impl From<SummaryActivityV3> for ActivityRecord {
    fn from(wire: SummaryActivityV3) -> Self {
        Self {
            name: wire.name,
            moving_time_seconds: wire.moving_time,
            distance_meters: wire.distance,
            start_date_utc: wire.start_date,
            activity_type: wire.activity_type,
        }
    }
}

/// Inclusive time window for activity queries.
///
/// `after <= before` is the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub after: DateTime<Utc>,
    pub before: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(after: DateTime<Utc>, before: DateTime<Utc>) -> Self {
        Self { after, before }
    }

    /// Jan 1 00:00:00 through Dec 31 00:00:00 of `year` in time zone `tz`.
    ///
    /// Returns `None` if either midnight does not exist in `tz`.
    pub fn calendar_year<Tz: TimeZone>(tz: &Tz, year: i32) -> Option<Self> {
        let after = tz.with_ymd_and_hms(year, 1, 1, 0, 0, 0).earliest()?;
        let before = tz.with_ymd_and_hms(year, 12, 31, 0, 0, 0).earliest()?;
        Some(Self::new(after.with_timezone(&Utc), before.with_timezone(&Utc)))
    }

    /// The current calendar year in the local time zone.
    pub fn current_year() -> Option<Self> {
        use chrono::Datelike;
        Self::calendar_year(&Local, Local::now().year())
    }

    /// Lower bound as Unix epoch seconds.
    pub fn after_epoch(&self) -> i64 {
        self.after.timestamp()
    }

    /// Upper bound as Unix epoch seconds.
    pub fn before_epoch(&self) -> i64 {
        self.before.timestamp()
    }
}
