use crate::domain::chart::{BandScale, LinearScale};
use chrono::NaiveDate;
use serde::Serialize;

/// A labelled tick, positioned in plot-local pixels along its axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

/// `$1,234.56`; negative values keep the sign in front of the dollar.
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Short month and day, e.g. `Mar 07`.
pub fn format_date_label(date: NaiveDate) -> String {
    date.format("%b %d").to_string()
}

pub fn value_ticks(scale: &LinearScale, count: usize) -> Vec<AxisTick> {
    scale
        .ticks(count)
        .into_iter()
        .map(|value| AxisTick { position: scale.map(value), label: format_currency(value) })
        .collect()
}

/// One label every `stride` bands starting from the oldest, centred on its band.
pub fn time_ticks(scale: &BandScale, stride: usize) -> Vec<AxisTick> {
    let half = scale.bandwidth() / 2.0;
    scale
        .keys()
        .iter()
        .enumerate()
        .step_by(stride.max(1))
        .map(|(index, date)| AxisTick {
            position: scale.position_at(index) + half,
            label: format_date_label(*date),
        })
        .collect()
}
