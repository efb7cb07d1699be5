//! Assembles the rolling 12-month climate window: a 366-slot day sequence
//! centred near today, carrying the historical envelope band, every spanning
//! year-pair trace, every averaging bucket, and the spliced actual/forecast
//! "current" trace, all populated simultaneously. Overlay selection is the
//! presentation layer's concern.

use crate::aggregate::averages::AveragingBucket;
use crate::types::calendar::{days_in_month, MonthDay, SpanningYearPair};
use crate::types::samples::DayStats;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Candidate start offsets, in months before today's month, evaluated
/// earliest start first. Ties on the balance score keep the earliest.
const START_OFFSETS_MONTHS: [u32; 3] = [7, 6, 5];

/// The window always spans 12 leap-length months.
const WINDOW_LEN: usize = 366;

/// Which source supplied a current-trace value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrentSource {
    /// A recent observation from the archive.
    Actual,
    /// A forecast value.
    Forecast,
}

/// One value of the spliced current trace, tagged with its source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentSample {
    pub value: f64,
    pub source: CurrentSource,
}

/// The envelope band of one slot, without the raw samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub min: f64,
    pub p25: f64,
    pub p75: f64,
    pub max: f64,
}

impl Band {
    pub fn from_stats(stats: &DayStats) -> Self {
        Self {
            min: stats.min,
            p25: stats.p25,
            p75: stats.p75,
            max: stats.max,
        }
    }
}

/// One day slot of the window. `pair_values` aligns with
/// [`ClimateWindow::pairs`], `bucket_means` with [`ClimateWindow::buckets`].
#[derive(Debug, Clone, Serialize)]
pub struct WindowSlot {
    pub month_day: MonthDay,
    pub band: Option<Band>,
    pub pair_values: Vec<Option<f64>>,
    pub bucket_means: Vec<Option<f64>>,
    pub current: Option<CurrentSample>,
}

/// The assembled rolling window.
#[derive(Debug, Clone, Serialize)]
pub struct ClimateWindow {
    /// First calendar month of the window.
    pub start_month: u32,
    /// Index of today's slot, for marker placement.
    pub today_index: usize,
    pub pairs: Vec<SpanningYearPair>,
    pub buckets: Vec<AveragingBucket>,
    pub slots: Vec<WindowSlot>,
}

/// Everything the assembler reads; all of it is borrowed from an already
/// computed envelope report.
pub struct WindowInputs<'a> {
    pub statistics: &'a BTreeMap<MonthDay, DayStats>,
    pub overlay: &'a BTreeMap<i32, BTreeMap<MonthDay, f64>>,
    pub overlay_years: &'a [i32],
    pub averages: &'a [(AveragingBucket, BTreeMap<MonthDay, f64>)],
    pub recent: &'a BTreeMap<MonthDay, f64>,
    pub forecast: &'a BTreeMap<MonthDay, f64>,
}

/// Builds the window for a given "today".
///
/// The start month is searched over a small set of candidates and the one
/// whose today-index lands closest to half the window wins, so the days
/// before and after today are as balanced as the month grid allows.
pub fn assemble(inputs: &WindowInputs<'_>, today: NaiveDate) -> ClimateWindow {
    let (start_month, sequence, today_index) = choose_start_month(today);

    let pairs = SpanningYearPair::from_years(inputs.overlay_years);
    let buckets: Vec<AveragingBucket> = inputs
        .averages
        .iter()
        .map(|(bucket, _)| *bucket)
        .collect();

    let slots = sequence
        .iter()
        .enumerate()
        .map(|(index, &month_day)| {
            let band = inputs
                .statistics
                .get(&month_day)
                .map(Band::from_stats);

            let pair_values = pairs
                .iter()
                .map(|pair| pair_value(inputs.overlay, pair, start_month, month_day))
                .collect();

            let bucket_means = inputs
                .averages
                .iter()
                .map(|(_, means)| means.get(&month_day).copied())
                .collect();

            let current = current_sample(inputs, month_day, index, today_index);

            WindowSlot {
                month_day,
                band,
                pair_values,
                bucket_means,
                current,
            }
        })
        .collect();

    ClimateWindow {
        start_month,
        today_index,
        pairs,
        buckets,
        slots,
    }
}

/// A pair's value for one slot: `year1` supplies the slots from the window's
/// start month onward, `year2` the slots past the Dec/Jan wrap, so one label
/// traces a single continuous 12-month history.
fn pair_value(
    overlay: &BTreeMap<i32, BTreeMap<MonthDay, f64>>,
    pair: &SpanningYearPair,
    start_month: u32,
    month_day: MonthDay,
) -> Option<f64> {
    let source_year = if month_day.month() >= start_month {
        pair.year1
    } else {
        pair.year2
    };
    overlay.get(&source_year)?.get(&month_day).copied()
}

/// The spliced current value: recent-actual up to and including today's slot,
/// forecast from today's slot on, never overlapping. At the boundary the
/// actual sample wins and forecast only fills its absence.
fn current_sample(
    inputs: &WindowInputs<'_>,
    month_day: MonthDay,
    index: usize,
    today_index: usize,
) -> Option<CurrentSample> {
    if index <= today_index {
        let actual = inputs.recent.get(&month_day).map(|&value| CurrentSample {
            value,
            source: CurrentSource::Actual,
        });
        if index == today_index {
            return actual.or_else(|| {
                inputs.forecast.get(&month_day).map(|&value| CurrentSample {
                    value,
                    source: CurrentSource::Forecast,
                })
            });
        }
        actual
    } else {
        inputs.forecast.get(&month_day).map(|&value| CurrentSample {
            value,
            source: CurrentSource::Forecast,
        })
    }
}

fn choose_start_month(today: NaiveDate) -> (u32, Vec<MonthDay>, usize) {
    let today_key = MonthDay::from_date(today);
    let mut best: Option<(i64, u32, Vec<MonthDay>, usize)> = None;

    for offset in START_OFFSETS_MONTHS {
        let start_month = (today.month0() + 12 - offset) % 12 + 1;
        let sequence = slot_sequence(start_month);
        let today_index = sequence
            .iter()
            .position(|&slot| slot == today_key)
            .expect("every month/day occurs once in a 12-month window");
        let balance = (today_index as i64 - (WINDOW_LEN / 2) as i64).abs();
        if best.as_ref().map_or(true, |(score, ..)| balance < *score) {
            best = Some((balance, start_month, sequence, today_index));
        }
    }

    let (_, start_month, sequence, today_index) = best.expect("candidate offsets are non-empty");
    (start_month, sequence, today_index)
}

/// 12 consecutive leap-length months starting at `start_month`; always 366
/// slots.
fn slot_sequence(start_month: u32) -> Vec<MonthDay> {
    let mut slots = Vec::with_capacity(WINDOW_LEN);
    for month_offset in 0..12 {
        let month = (start_month - 1 + month_offset) % 12 + 1;
        for day in 1..=days_in_month(month) {
            slots.push(MonthDay::new(month, day).expect("day within leap-length month"));
        }
    }
    slots
}
