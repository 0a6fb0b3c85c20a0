use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// First second of the day, in the stored timestamp format.
pub fn start_of_day(d: NaiveDate) -> String {
    NaiveDateTime::new(d, NaiveTime::MIN)
        .format(super::time::DB_FORMAT)
        .to_string()
}

/// Last second of the day, in the stored timestamp format.
pub fn end_of_day(d: NaiveDate) -> String {
    format!("{} 23:59:59", d.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_cover_the_whole_day() {
        let d = parse_date("2025-06-01").unwrap();
        assert_eq!(start_of_day(d), "2025-06-01 00:00:00");
        assert_eq!(end_of_day(d), "2025-06-01 23:59:59");
    }

    #[test]
    fn malformed_dates_are_rejected() {
        assert!(parse_date("2025-13-01").is_none());
        assert!(parse_date("01/06/2025").is_none());
    }
}
