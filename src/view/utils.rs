//! Formatting helpers shared by the text renderers

use chrono::{DateTime, Utc};

/// Seconds as `m:ss`; non-finite or negative input renders as `0:00`
pub fn format_time(seconds: f64) -> String {
    let total_seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Long-form date, e.g. `March 5, 2024`
pub fn format_date(date: Option<&DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => "Unknown".to_string(),
    }
}

/// Width of the index column (digits plus padding)
pub fn calculate_num_width(item_count: usize) -> usize {
    if item_count == 0 {
        2
    } else {
        let digits = (item_count as f64).log10().floor() as usize + 1;
        digits + 1
    }
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_width)
    } else {
        format!("{:<width$}", s, width = max_width)
    }
}

/// `[#####-----]` style bar for a 0..=1 ratio
pub fn progress_bar(ratio: f64, width: usize) -> String {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (ratio * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_timestamp;

    #[test]
    fn formats_times() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.9), "1:05");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(-3.0), "0:00");
    }

    #[test]
    fn formats_dates() {
        let date = parse_timestamp("2024-03-05T10:00:00Z");
        assert_eq!(format_date(date.as_ref()), "March 5, 2024");
        assert_eq!(format_date(None), "Unknown");
    }

    #[test]
    fn truncates_and_pads() {
        assert_eq!(truncate_string("abcdefghij", 8), "abcde...");
        assert_eq!(truncate_string("abc", 5), "abc  ");
        assert_eq!(calculate_num_width(0), 2);
        assert_eq!(calculate_num_width(9), 2);
        assert_eq!(calculate_num_width(120), 4);
    }

    #[test]
    fn draws_progress() {
        assert_eq!(progress_bar(0.5, 10), "[#####-----]");
        assert_eq!(progress_bar(2.0, 4), "[####]");
        assert_eq!(progress_bar(f64::NAN, 4), "[----]");
    }
}
