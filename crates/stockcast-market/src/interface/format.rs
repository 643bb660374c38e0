//! Number, date and direction formatting

use crate::model::Direction;
use chrono::NaiveDate;

/// Avoid printing "-0.00"
fn tidy(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

/// Rupee amount with two decimals: `₹3542.10`
pub fn currency(value: f64) -> String {
    format!("₹{:.2}", tidy(value))
}

/// Rupee amount rounded to whole rupees, for axis labels: `₹3542`
pub fn axis_currency(value: f64) -> String {
    format!("₹{:.0}", tidy(value))
}

/// Plain two-decimal figure: `3542.10`
pub fn fixed2(value: f64) -> String {
    format!("{:.2}", tidy(value))
}

/// Percentage with two decimals: `0.35%`
pub fn percent(value: f64) -> String {
    format!("{:.2}%", tidy(value))
}

/// Model metric with four decimals: `0.9345`
pub fn metric(value: f64) -> String {
    format!("{:.4}", tidy(value))
}

/// Optional number as given, or `N/A`
pub fn number_or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// Optional text as given, or `N/A`
pub fn text_or_na(value: Option<&str>) -> String {
    value.unwrap_or("N/A").to_string()
}

/// Indian digit grouping (lakh/crore): `12,34,567`
pub fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Thousands grouping: `1,234,567`
pub fn group_western(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Short chart label: `May 1`
pub fn chart_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Table date: `2024-05-01`
pub fn table_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `▲` for up, `▼` for down, nothing for neutral
pub fn direction_marker(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "▲",
        Direction::Down => "▼",
        Direction::Neutral => "",
    }
}

/// Direction of a predicted close relative to the last close
pub fn direction_between(from: f64, to: f64) -> Direction {
    if to > from {
        Direction::Up
    } else if to < from {
        Direction::Down
    } else {
        Direction::Neutral
    }
}

/// `12.50 (0.35%)`, prefixed with the direction marker when there is one
pub fn change_label(direction: Direction, change: f64, change_percent: f64) -> String {
    let marker = direction_marker(direction);
    let body = format!("{} ({})", fixed2(change), percent(change_percent));
    if marker.is_empty() {
        body
    } else {
        format!("{marker} {body}")
    }
}
