//! Time sources. Both the hardware timer (milliseconds since boot) and the
//! hardware RTC (wall-clock seconds) are external collaborators (spec §5);
//! the core only depends on the traits below.

/// A monotonically-incrementing millisecond counter, provided by a hardware
/// timer driver. Never goes backwards.
pub trait MonotonicClock {
    /// Milliseconds elapsed since an arbitrary, fixed epoch (e.g. boot).
    fn now_ms(&self) -> u64;
}

/// A hardware RTC supplying wall-clock seconds since the Unix epoch.
pub trait RealTimeClock {
    /// Current wall-clock time, seconds since 1970-01-01T00:00:00Z.
    fn now_unix(&self) -> i64;
}

/// A calendar timestamp as consumed by the prepass geometry library and
/// produced by the pass-predict BCD decoder (spec §4.4, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl CalendarTime {
    /// Converts a Unix timestamp (UTC, no leap seconds) to a calendar time.
    pub fn from_unix(epoch_secs: i64) -> Self {
        use chrono::{DateTime, Datelike, Timelike, Utc};
        let dt: DateTime<Utc> = DateTime::from_timestamp(epoch_secs, 0).unwrap_or_default();
        CalendarTime {
            year: dt.year() as u16,
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
        }
    }

    /// Converts back to a Unix timestamp (UTC).
    pub fn to_unix(self) -> i64 {
        use chrono::{NaiveDate, TimeZone, Utc};
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)
            .and_then(|d| d.and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32))
            .and_then(|dt| Utc.from_local_datetime(&dt).single())
            .map(|dt| dt.timestamp())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_unix_time() {
        let t = CalendarTime {
            year: 2022,
            month: 5,
            day: 9,
            hour: 17,
            minute: 33,
            second: 7,
        };
        let back = CalendarTime::from_unix(t.to_unix());
        assert_eq!(t, back);
    }
}
