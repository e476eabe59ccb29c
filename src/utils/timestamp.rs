use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use mongodb::bson::Bson;

/// Epoch integers above this are read as milliseconds, below as seconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Converts whatever the backend stored as a timestamp into UTC.
///
/// Accepts BSON dates, epoch integers and the string shapes the dashboard
/// backend has been seen to emit. Anything else is treated as absent.
pub fn bson_to_datetime(value: &Bson) -> Option<DateTime<Utc>> {
    match value {
        Bson::DateTime(dt) => DateTime::from_timestamp_millis(dt.timestamp_millis()),
        Bson::String(s) => parse_timestamp_str(s),
        Bson::Int64(n) => epoch_to_datetime(*n),
        Bson::Int32(n) => epoch_to_datetime(i64::from(*n)),
        Bson::Double(f) if f.is_finite() => epoch_to_datetime(*f as i64),
        _ => None,
    }
}

pub fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn epoch_to_datetime(n: i64) -> Option<DateTime<Utc>> {
    if n.unsigned_abs() > EPOCH_MILLIS_THRESHOLD as u64 {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_parses_date_only_strings() {
        let dt = parse_timestamp_str("2024-02-01").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parses_rfc3339_with_offset() {
        let dt = parse_timestamp_str("2024-02-01T03:00:00+03:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parses_naive_datetime_with_fraction() {
        let dt = parse_timestamp_str("2024-02-01T10:20:30.250").unwrap();
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_timestamp_str("").is_none());
        assert!(parse_timestamp_str("yesterday").is_none());
        assert!(bson_to_datetime(&Bson::Boolean(true)).is_none());
        assert!(bson_to_datetime(&Bson::Null).is_none());
    }

    #[test]
    fn test_epoch_seconds_and_millis() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(bson_to_datetime(&Bson::Int64(1_704_067_200)), Some(expected));
        assert_eq!(bson_to_datetime(&Bson::Int64(1_704_067_200_000)), Some(expected));
    }

    #[test]
    fn test_out_of_range_epochs_are_dropped() {
        assert!(bson_to_datetime(&Bson::Int64(i64::MIN)).is_none());
        assert!(bson_to_datetime(&Bson::Int64(i64::MAX)).is_none());
        assert!(bson_to_datetime(&Bson::Double(-1e300)).is_none());
    }

    #[test]
    fn test_bson_datetime() {
        let bson_dt = mongodb::bson::DateTime::from_millis(1_704_067_200_000);
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(bson_to_datetime(&Bson::DateTime(bson_dt)), Some(expected));
    }
}
