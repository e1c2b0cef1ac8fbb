// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Minutes-per-day aggregate handed to the heatmap renderer.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::ActivityRecord;

/// Activities longer than this are treated as bad data (e.g. a GPS tracker
/// left running for days) and dropped.
pub const MAX_ACTIVITY_SECS: i64 = 24 * 60 * 60;

/// Date format used for aggregate keys.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Total minutes of activity per UTC calendar date ("YYYY-MM-DD").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActivityAggregate {
    counts: BTreeMap<String, i64>,
}

impl ActivityAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce a stream of activities into an aggregate.
    pub fn reduce<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ActivityRecord>,
    {
        let mut aggregate = Self::new();
        for record in records {
            aggregate.add(&record);
        }
        aggregate
    }

    /// Fold one activity into the aggregate.
    ///
    /// Returns `false` if the activity was dropped as an outlier.
    pub fn add(&mut self, record: &ActivityRecord) -> bool {
        if record.moving_time_seconds > MAX_ACTIVITY_SECS {
            tracing::debug!(
                name = %record.name,
                moving_time = record.moving_time_seconds,
                "Skipping activity longer than 24h"
            );
            return false;
        }

        // Key on the UTC date, never local time.
        let key = record.start_date_utc.format(DATE_KEY_FORMAT).to_string();
        *self.counts.entry(key).or_insert(0) += record.moving_time_seconds / 60;
        true
    }

    /// Set the total for `date`, replacing any previous value.
    pub fn insert(&mut self, date: NaiveDate, minutes: i64) {
        self.counts
            .insert(date.format(DATE_KEY_FORMAT).to_string(), minutes);
    }

    /// Minutes recorded for `date` ("YYYY-MM-DD").
    pub fn get(&self, date: &str) -> Option<i64> {
        self.counts.get(date).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over `(date, minutes)` in date order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Largest single-day total, if any.
    pub fn max_minutes(&self) -> Option<i64> {
        self.counts.values().copied().max()
    }
}

impl FromIterator<ActivityRecord> for ActivityAggregate {
    fn from_iter<I: IntoIterator<Item = ActivityRecord>>(iter: I) -> Self {
        Self::reduce(iter)
    }
}
