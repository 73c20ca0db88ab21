//! Calendar date helpers
//!
//! Completion dates are UTC calendar days.

use chrono::{DateTime, NaiveDate, Utc};

/// Current UTC calendar date
pub fn today_utc() -> NaiveDate {
    utc_date(Utc::now())
}

/// UTC calendar date of an instant
pub fn utc_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_utc_date_late_evening() {
        let instant = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(
            utc_date(instant),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_utc_date_from_offset_timestamp() {
        // 2024-03-10T01:30:00+05:00 is still 2024-03-09 in UTC
        let instant = DateTime::parse_from_rfc3339("2024-03-10T01:30:00+05:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            utc_date(instant),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
        );
    }

    #[test]
    fn test_today_utc_matches_now() {
        let before = Utc::now().date_naive();
        let today = today_utc();
        let after = Utc::now().date_naive();
        assert!(today == before || today == after);
    }
}
