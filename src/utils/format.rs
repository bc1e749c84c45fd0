//! Display helpers for hours, money and payout summaries.

use crate::models::PayoutSchedule;

/// Format an hour amount the way the queue widgets show it: `2h`, `1.5h`,
/// `45m` below one hour, `0h` for nothing.
pub fn format_hours(hours: f64) -> String {
    if !hours.is_finite() || hours <= 0.0 {
        return "0h".to_string();
    }

    if hours < 1.0 {
        let minutes = (hours * 60.0).round() as i64;
        if minutes <= 0 {
            return "0h".to_string();
        }
        return format!("{minutes}m");
    }

    let rounded = (hours * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}h", rounded as i64)
    } else {
        format!("{rounded:.1}h")
    }
}

/// Same as [`format_hours`] but tolerant of negative or missing input.
pub fn format_duration(hours: f64) -> String {
    format_hours(hours.max(0.0))
}

/// Whole-dollar amount with thousands separators.
pub fn format_money(amount: f64) -> String {
    if !amount.is_finite() {
        return "0".to_string();
    }
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn format_payout_summary(amount: Option<f64>, schedule: &PayoutSchedule) -> String {
    match amount.filter(|value| value.is_finite() && *value > 0.0) {
        None => match schedule {
            PayoutSchedule::OnCompletion => String::new(),
            other => other.as_str().to_string(),
        },
        Some(amount) => match schedule {
            PayoutSchedule::OnCompletion => format!("${} on completion", format_money(amount)),
            PayoutSchedule::Daily => format!("${} / day", format_money(amount)),
            PayoutSchedule::Other(label) => format!("${} ({label})", format_money(amount)),
        },
    }
}
