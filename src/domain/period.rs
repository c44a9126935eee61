//! Named time windows ("This Week") and minute arithmetic used by charts.

use crate::domain::DomainError;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Whole minutes between `start` and `end`, rounded toward zero.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_minutes()
}

/// `start` moved forward by `minutes`; out-of-range input is `InvalidInput`, never a panic.
pub fn minutes_after(start: DateTime<Utc>, minutes: i64) -> Result<DateTime<Utc>, DomainError> {
    Duration::try_minutes(minutes)
        .and_then(|delta| start.checked_add_signed(delta))
        .ok_or_else(|| DomainError::InvalidInput(format!("{} minutes is out of range", minutes)))
}

/// Concrete `[start, end]` window. `start <= end` is enforced at construction and when
/// deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPeriodDuration")]
pub struct PeriodDuration {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawPeriodDuration {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawPeriodDuration> for PeriodDuration {
    type Error = DomainError;

    fn try_from(raw: RawPeriodDuration) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl PeriodDuration {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidInput(
                "period ends before it starts".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }

    /// Subtitle text: "Oct 20 - Oct 26", or with years when the window crosses one.
    pub fn short_text(&self) -> String {
        if self.start.year() == self.end.year() {
            format!(
                "{} - {}",
                self.start.format("%b %d"),
                self.end.format("%b %d")
            )
        } else {
            format!(
                "{} - {}",
                self.start.format("%b %d, %Y"),
                self.end.format("%b %d, %Y")
            )
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: String,
    pub name: String,
    pub duration: PeriodDuration,
}

impl Period {
    /// Monday 00:00 UTC of the week containing `now`, through the following Sunday 23:59:59.
    pub fn this_week(now: DateTime<Utc>) -> Self {
        let days_back = i64::from(now.weekday().num_days_from_monday());
        let monday = now.date_naive() - Duration::days(days_back);
        let start = monday.and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(7) - Duration::seconds(1);
        Self {
            id: "this-week".to_string(),
            name: "This Week".to_string(),
            duration: PeriodDuration { start, end },
        }
    }

    pub fn today(now: DateTime<Utc>) -> Self {
        let start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1) - Duration::seconds(1);
        Self {
            id: "today".to_string(),
            name: "Today".to_string(),
            duration: PeriodDuration { start, end },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_duration_minutes_truncates() {
        let start = Utc.with_ymd_and_hms(2025, 10, 24, 1, 41, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 10, 24, 2, 41, 59).unwrap();
        assert_eq!(duration_minutes(start, end), 60);
    }

    #[test]
    fn test_this_week_starts_monday() {
        // 2025-10-22 is a Wednesday.
        let now = Utc.with_ymd_and_hms(2025, 10, 22, 15, 0, 0).unwrap();
        let week = Period::this_week(now);
        assert_eq!(
            week.duration.start(),
            Utc.with_ymd_and_hms(2025, 10, 20, 0, 0, 0).unwrap()
        );
        assert_eq!(
            week.duration.end(),
            Utc.with_ymd_and_hms(2025, 10, 26, 23, 59, 59).unwrap()
        );
        assert!(week.duration.contains(now));
        assert_eq!(week.duration.short_text(), "Oct 20 - Oct 26");
    }

    #[test]
    fn test_short_text_across_years() {
        let d = PeriodDuration::new(
            Utc.with_ymd_and_hms(2025, 12, 29, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 4, 0, 0, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(d.short_text(), "Dec 29, 2025 - Jan 04, 2026");
    }

    #[test]
    fn test_period_rejects_inverted_window() {
        let a = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(PeriodDuration::new(a, b).is_err());
    }

    #[test]
    fn test_deserialize_rejects_inverted_window() {
        let ok: PeriodDuration = serde_json::from_str(
            r#"{"start":"2025-01-01T00:00:00Z","end":"2025-01-02T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(ok.end() - ok.start(), Duration::days(1));

        let inverted = serde_json::from_str::<PeriodDuration>(
            r#"{"start":"2025-01-02T00:00:00Z","end":"2025-01-01T00:00:00Z"}"#,
        );
        let err = inverted.unwrap_err().to_string();
        assert!(err.contains("period ends before it starts"), "{}", err);
    }

    #[test]
    fn test_minutes_after_rejects_overflow() {
        let start = Utc.with_ymd_and_hms(2025, 10, 24, 9, 0, 0).unwrap();
        assert_eq!(
            minutes_after(start, 90).unwrap(),
            Utc.with_ymd_and_hms(2025, 10, 24, 10, 30, 0).unwrap()
        );
        assert!(matches!(
            minutes_after(start, i64::MAX / 2),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(minutes_after(start, i64::MIN).is_err());
    }
}
