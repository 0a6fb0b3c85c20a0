// src/export/excel_date.rs

use chrono::NaiveDateTime;

/// Number format applied to timestamp cells.
pub(crate) const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Serial of 1970-01-01 in the 1900 date system.
const UNIX_EPOCH_SERIAL: f64 = 25569.0;

/// Excel serial (days since 1899-12-30, fraction = time of day).
pub(crate) fn naive_datetime_to_excel_serial(dt: &NaiveDateTime) -> f64 {
    let secs = dt.and_utc().timestamp();
    UNIX_EPOCH_SERIAL + secs as f64 / 86400.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn noon_is_half_a_day() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(naive_datetime_to_excel_serial(&dt), 45292.5);
    }
}
