use chrono::{DateTime, Utc};

/// Helper function to render a human-relative "time ago" label.
///
/// Under an hour the label is in minutes ("42m"), under a day in hours
/// ("3h"), anything older in days ("12d"). Timestamps in the future clamp
/// to "0m".
pub fn time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - timestamp).num_minutes().max(0);
    if minutes < 60 {
        format!("{minutes}m")
    } else if minutes < 1440 {
        format!("{}h", minutes / 60)
    } else {
        format!("{}d", minutes / 1440)
    }
}

/// Helper function to escape regex metacharacters in user input.
///
/// The customer order lookup matches emails with a case-insensitive anchored
/// regex; emails routinely contain `.` and `+`, which must be treated as
/// literal text.
pub fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn time_ago_minutes_hours_days() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m");
        assert_eq!(time_ago(now - Duration::minutes(59), now), "59m");
        assert_eq!(time_ago(now - Duration::minutes(60), now), "1h");
        assert_eq!(time_ago(now - Duration::minutes(1439), now), "23h");
        assert_eq!(time_ago(now - Duration::minutes(1440), now), "1d");
        assert_eq!(time_ago(now - Duration::days(12), now), "12d");
    }

    #[test]
    fn time_ago_clamps_future_timestamps() {
        let now = Utc::now();
        assert_eq!(time_ago(now + Duration::minutes(10), now), "0m");
    }

    #[test]
    fn escape_regex_makes_emails_literal() {
        assert_eq!(escape_regex("jo.doe+rx@mail.com"), "jo\\.doe\\+rx@mail\\.com");
        assert_eq!(escape_regex("plain"), "plain");
    }
}
