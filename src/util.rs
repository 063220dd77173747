use crate::errors::Result;
use crate::models::record::Exchange;
use chrono::{NaiveDateTime, TimeZone, Utc};
use chrono_tz::Asia::Dhaka;
use std::time::SystemTime;

/// Cache wire format for the update time
const AS_OF_WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// Timestamp conversion tools
pub fn as_of_to_string(as_of: NaiveDateTime) -> String {
    as_of.format(AS_OF_WIRE_FORMAT).to_string()
}

pub fn as_of_from_string(s: &str) -> Result<NaiveDateTime> {
    Ok(NaiveDateTime::parse_from_str(s, AS_OF_WIRE_FORMAT)?)
}

/// Current wall-clock time where the exchanges are (Asia/Dhaka)
pub fn exchange_now() -> NaiveDateTime {
    Utc::now().with_timezone(&Dhaka).naive_local()
}

/// Timestamp-derived output name: `<exchange>-<YY-MM-DD_HH-MM>.csv`
pub fn snapshot_filename(exchange: Exchange, as_of: NaiveDateTime) -> String {
    format!("{}-{}.csv", exchange.code(), as_of.format("%y-%m-%d_%H-%M"))
}

/// Maps an update time to a `SystemTime` for HTTP header formatting.
/// The naive value is interpreted on the exchange clock.
pub fn as_of_to_system_time(as_of: NaiveDateTime) -> SystemTime {
    match Dhaka.from_local_datetime(&as_of).earliest() {
        Some(local) => SystemTime::from(local.with_timezone(&Utc)),
        None => SystemTime::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_as_of() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2010, 2, 15)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap()
    }

    #[test]
    fn filename_encodes_exchange_and_minute() {
        assert_eq!(
            snapshot_filename(Exchange::Dse, sample_as_of()),
            "dse-10-02-15_14-30.csv"
        );
        assert_eq!(
            snapshot_filename(Exchange::Cse, sample_as_of()),
            "cse-10-02-15_14-30.csv"
        );
    }

    #[test]
    fn as_of_round_trips_through_the_wire_format() {
        let as_of = sample_as_of();
        let wire = as_of_to_string(as_of);
        assert_eq!(wire, "2010-02-15T14:30:05");
        assert_eq!(as_of_from_string(&wire).unwrap(), as_of);
    }

    #[test]
    fn malformed_wire_values_are_rejected() {
        assert!(as_of_from_string("not a timestamp").is_err());
    }

    #[test]
    fn system_time_conversion_lands_six_hours_earlier_in_utc() {
        // Dhaka is UTC+6 year round
        let system_time = as_of_to_system_time(sample_as_of());
        let utc: chrono::DateTime<Utc> = system_time.into();
        assert_eq!(
            utc.naive_utc(),
            NaiveDate::from_ymd_opt(2010, 2, 15)
                .unwrap()
                .and_hms_opt(8, 30, 5)
                .unwrap()
        );
    }
}
