use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

/// Monday the bi-weekly cycle is pinned to. Every pay period is a
/// whole number of 14-day steps from this date.
const PERIOD_ANCHOR: NaiveDate = match NaiveDate::from_ymd_opt(2024, 1, 1) {
    Some(d) => d,
    None => panic!("invalid payroll anchor"),
};

const PERIOD_DAYS: i64 = 14;

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct PayPeriod {
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub start: NaiveDate,

    /// Inclusive last day of the period.
    #[schema(example = "2026-01-18", value_type = String, format = "date")]
    pub end: NaiveDate,
}

/// The bi-weekly period containing `date`. Deterministic for any date,
/// including dates before the anchor.
pub fn period_containing(date: NaiveDate) -> PayPeriod {
    let days = (date - PERIOD_ANCHOR).num_days();
    let index = days.div_euclid(PERIOD_DAYS);
    let start = PERIOD_ANCHOR + chrono::Duration::days(index * PERIOD_DAYS);
    PayPeriod {
        start,
        end: start + chrono::Duration::days(PERIOD_DAYS - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn anchor_day_starts_the_first_period() {
        let p = period_containing(d(2024, 1, 1));
        assert_eq!(p.start, d(2024, 1, 1));
        assert_eq!(p.end, d(2024, 1, 14));
    }

    #[test]
    fn last_day_of_period_maps_to_same_period() {
        let p = period_containing(d(2024, 1, 14));
        assert_eq!(p.start, d(2024, 1, 1));
    }

    #[test]
    fn next_day_rolls_over() {
        let p = period_containing(d(2024, 1, 15));
        assert_eq!(p.start, d(2024, 1, 15));
        assert_eq!(p.end, d(2024, 1, 28));
    }

    #[test]
    fn dates_before_anchor_still_resolve() {
        let p = period_containing(d(2023, 12, 31));
        assert_eq!(p.start, d(2023, 12, 18));
        assert_eq!(p.end, d(2023, 12, 31));
    }

    #[test]
    fn periods_always_start_on_monday() {
        use chrono::Datelike;
        let p = period_containing(d(2026, 8, 29));
        assert_eq!(p.start.weekday(), chrono::Weekday::Mon);
        assert_eq!((p.end - p.start).num_days(), 13);
    }
}
