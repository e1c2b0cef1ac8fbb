// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Heatmap rendering configuration and the renderer seam.
//!
//! Drawing the calendar is delegated to a [`HeatmapRenderer`]. This module
//! only describes what to draw: the per-day aggregate plus a declarative
//! [`HeatmapConfig`].

use serde::Serialize;
use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::models::ActivityAggregate;

/// An opaque RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Background color for days without activity.
pub const GRAY: Rgba = Rgba::rgb(240, 240, 240);
/// Strava brand orange.
pub const STRAVA_ORANGE: Rgba = Rgba::rgb(252, 76, 2);

/// Number of steps in the default color scale.
pub const DEFAULT_SCALE_STEPS: usize = 100;

/// Declarative heatmap rendering configuration.
///
/// Built by the caller; [`Default`] gives the Strava-styled layout:
/// PNG images, 30px boxes, 10px margin, Swedish locale, no labels or month
/// separators, and a gray-to-orange scale biased towards orange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapConfig {
    /// Image format for the final encoder. Renderers that emit a document
    /// for a downstream encoder (like [`JsonHeatmapRenderer`]) pass it through
    /// untouched; it never describes their own output.
    pub format: String,
    pub draw_month_separator: bool,
    pub draw_labels: bool,
    pub box_size: u32,
    pub margin: u32,
    pub text_color: Rgba,
    pub border_color: Rgba,
    pub locale: String,
    /// Weekdays to label, Monday = 0
    pub show_weekdays: BTreeSet<u8>,
    pub color_scale: Vec<Rgba>,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            format: "png".to_string(),
            draw_month_separator: false,
            draw_labels: false,
            box_size: 30,
            margin: 10,
            text_color: Rgba::rgb(100, 100, 100),
            border_color: Rgba::rgb(200, 200, 200),
            locale: "sv_SE".to_string(),
            show_weekdays: BTreeSet::new(),
            // Biased so one very long activity does not wash everything
            // else out to gray.
            color_scale: biased_color_scale(GRAY, STRAVA_ORANGE, DEFAULT_SCALE_STEPS),
        }
    }
}

/// Evenly spaced colors from `from` towards `to` (exclusive).
///
/// Returns an empty scale if `n < 2`.
pub fn linear_color_scale(from: Rgba, to: Rgba, n: usize) -> Vec<Rgba> {
    scale_with(from, to, n, |t| t)
}

/// Color scale that leans towards `to`.
///
/// Step `i` sits at `sqrt(i / n)` of the way, so the low end climbs quickly.
/// Returns an empty scale if `n < 2`.
pub fn biased_color_scale(from: Rgba, to: Rgba, n: usize) -> Vec<Rgba> {
    scale_with(from, to, n, signed_sqrt)
}

fn scale_with(from: Rgba, to: Rgba, n: usize, curve: impl Fn(f64) -> f64) -> Vec<Rgba> {
    if n < 2 {
        return Vec::new();
    }

    let channel = |a: u8, b: u8, t: f64| -> u8 {
        let delta = f64::from(b) - f64::from(a);
        (f64::from(a) + (delta * t).round()).clamp(0.0, 255.0) as u8
    };

    (0..n)
        .map(|i| {
            let t = curve(i as f64 / n as f64);
            Rgba {
                r: channel(from.r, to.r, t),
                g: channel(from.g, to.g, t),
                b: channel(from.b, to.b, t),
                a: 255,
            }
        })
        .collect()
}

/// Square root of the magnitude, keeping the sign.
fn signed_sqrt(x: f64) -> f64 {
    x.abs().sqrt().copysign(x)
}

/// Synthetic data for `year`: every other day, starting Jan 1, gets the
/// day's zero-based index as its minute count.
///
/// Useful for previewing a color scale without Strava access.
pub fn demo_year(year: i32) -> ActivityAggregate {
    let mut counts = ActivityAggregate::new();
    let Some(first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return counts;
    };

    for (i, date) in first
        .iter_days()
        .take_while(|d| d.year() == year)
        .enumerate()
    {
        if i % 2 == 0 {
            counts.insert(date, i as i64);
        }
    }
    counts
}

/// Renders an aggregate into an image (or other document) byte stream.
pub trait HeatmapRenderer: Send + Sync {
    /// MIME type of the rendered output.
    fn content_type(&self) -> &'static str;

    fn render(&self, config: &HeatmapConfig, counts: &ActivityAggregate)
        -> anyhow::Result<Vec<u8>>;
}

/// Hands the configuration and counts to a client-side renderer as JSON.
///
/// The output is always `application/json`; `config.format` is forwarded as
/// the image format the client should encode.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonHeatmapRenderer;

#[derive(Serialize)]
struct HeatmapDocument<'a> {
    config: &'a HeatmapConfig,
    counts: &'a ActivityAggregate,
}

impl HeatmapRenderer for JsonHeatmapRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(
        &self,
        config: &HeatmapConfig,
        counts: &ActivityAggregate,
    ) -> anyhow::Result<Vec<u8>> {
        Ok(serde_json::to_vec(&HeatmapDocument { config, counts })?)
    }
}
