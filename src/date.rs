use std::fmt;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use rand::Rng;

use crate::error::{Error, Result};

/// Fixed input format, `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const NANOS_PER_DAY: i64 = 24 * 60 * 60 * 1_000_000_000;

/// A calendar date typed by the operator, without a time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDate(NaiveDate);

impl TargetDate {
    /// Parses `input` as exactly four year digits, two month digits and two
    /// day digits separated by `-`. Anything else is a [`Error::DateFormat`].
    pub fn parse(input: &str) -> Result<Self> {
        let bad = || Error::DateFormat {
            input: input.to_string(),
        };

        if !has_fixed_shape(input) {
            return Err(bad());
        }

        NaiveDate::parse_from_str(input, DATE_FORMAT)
            .map(TargetDate)
            .map_err(|_| bad())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// True for dates before 1970. git refuses such dates when amending,
    /// which only shows up once the rebase is already paused.
    pub fn before_unix_epoch(&self) -> bool {
        self.0.year() < 1970
    }
}

/// chrono accepts single-digit months and days and longer years, so the
/// shape is checked up front.
fn has_fixed_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// The timestamp written as both author and committer date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedTimestamp(DateTime<FixedOffset>);

impl DerivedTimestamp {
    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    /// Formats the timestamp in a form `git commit --date` and
    /// `GIT_COMMITTER_DATE` both accept.
    pub fn to_git_date(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%S %z").to_string()
    }
}

impl fmt::Display for DerivedTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S %:z"))
    }
}

/// Parses `input` and derives a timestamp in `zone` with a fresh random time
/// of day.
///
/// The typed date carries no time of day, so a random instant within that
/// day is drawn. Its wall-clock fields are then labelled with `zone`, the
/// original commit's offset, without converting the instant (see
/// [`at_offset`]).
///
/// # Parameters
///
/// * `input` – The operator's date, exactly `YYYY-MM-DD`.
/// * `zone` – Offset of the commit being rewritten.
///
/// # Returns
///
/// * `Ok(DerivedTimestamp)` within the typed day, read in `zone`.
/// * `Err(Error::DateFormat)` if `input` does not match the format.
pub fn derive(input: &str, zone: FixedOffset) -> Result<DerivedTimestamp> {
    let target = TargetDate::parse(input)?;
    derive_with(&mut rand::thread_rng(), target, zone)
}

/// Same as [`derive`], drawing the time of day from `rng`.
pub fn derive_with<R: Rng>(
    rng: &mut R,
    target: TargetDate,
    zone: FixedOffset,
) -> Result<DerivedTimestamp> {
    let nanos = rng.gen_range(0..NANOS_PER_DAY);
    at_offset(target, nanos, zone)
}

/// Midnight of `target` plus `nanos`, read as wall-clock time in `zone`.
///
/// The zone is swapped in without adjusting the instant: the result keeps
/// the year, month, day, hour, minute, second and nanosecond of the naive
/// candidate and therefore lands `zone` away from the UTC reading.
pub fn at_offset(target: TargetDate, nanos: i64, zone: FixedOffset) -> Result<DerivedTimestamp> {
    let out_of_range = || Error::DateFormat {
        input: target.0.format(DATE_FORMAT).to_string(),
    };

    let midnight: NaiveDateTime = target.0.and_hms_opt(0, 0, 0).ok_or_else(out_of_range)?;
    let candidate = midnight
        .checked_add_signed(Duration::nanoseconds(nanos))
        .ok_or_else(out_of_range)?;

    zone.from_local_datetime(&candidate)
        .single()
        .map(DerivedTimestamp)
        .ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn zone(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).expect("valid offset")
    }

    #[test]
    fn parses_fixed_format() {
        let d = TargetDate::parse("2025-08-31").expect("parse failed");
        assert_eq!(d.date(), NaiveDate::from_ymd_opt(2025, 8, 31).expect("date"));
    }

    #[test]
    fn rejects_invalid_calendar_date() {
        let r = TargetDate::parse("2025-13-40");
        assert!(matches!(r, Err(Error::DateFormat { .. })));
    }

    #[test]
    fn rejects_other_layouts() {
        for input in [
            "08/31/2025",
            "2025-8-31",
            "2025-08-1",
            "25-08-31",
            "12025-08-31",
            " 2025-08-31",
            "2025-08-31T00:00",
            "",
        ] {
            assert!(
                matches!(TargetDate::parse(input), Err(Error::DateFormat { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn flags_dates_before_1970() {
        let early = TargetDate::parse("1969-12-31").expect("parse failed");
        let epoch = TargetDate::parse("1970-01-01").expect("parse failed");
        let recent = TargetDate::parse("2025-08-31").expect("parse failed");
        assert!(early.before_unix_epoch());
        assert!(!epoch.before_unix_epoch());
        assert!(!recent.before_unix_epoch());
    }

    #[test]
    fn derive_rejects_malformed_date() {
        let r = derive("08/31/2025", zone(2));
        assert!(matches!(r, Err(Error::DateFormat { input }) if input == "08/31/2025"));
    }

    #[test]
    fn zone_is_swapped_not_converted() {
        let target = TargetDate::parse("2025-08-31").expect("parse failed");
        let nanos = (13 * 3600 + 5 * 60 + 7) * 1_000_000_000;
        let ts = at_offset(target, nanos, zone(5)).expect("derive failed");

        let dt = ts.as_datetime();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (13, 5, 7));
        assert_eq!(dt.offset().local_minus_utc(), 5 * 3600);
        // 13:05:07 at +05:00 is 08:05:07 UTC, five hours before the UTC reading.
        assert_eq!(dt.naive_utc().hour(), 8);
    }

    #[test]
    fn calendar_date_survives_extreme_offsets_near_midnight() {
        let target = TargetDate::parse("2025-08-31").expect("parse failed");
        for hours in [-14, -12, 0, 12, 14] {
            for nanos in [0, NANOS_PER_DAY - 1] {
                let ts = at_offset(target, nanos, zone(hours)).expect("derive failed");
                let dt = ts.as_datetime();
                assert_eq!(
                    (dt.year(), dt.month(), dt.day()),
                    (2025, 8, 31),
                    "offset {hours}h nanos {nanos}"
                );
            }
        }
    }

    #[test]
    fn random_draw_stays_within_the_day() {
        let target = TargetDate::parse("2024-02-29").expect("parse failed");
        let start = target.date().and_hms_opt(0, 0, 0).expect("midnight");
        let end = start + Duration::days(1);

        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let ts = derive_with(&mut rng, target, zone(-7)).expect("derive failed");
            let local = ts.as_datetime().naive_local();
            assert!(local >= start && local < end, "seed {seed} gave {local}");
        }
    }

    #[test]
    fn git_date_carries_offset() {
        let target = TargetDate::parse("2025-08-31").expect("parse failed");
        let offset = FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("offset");
        let ts = at_offset(target, 3_600_000_000_000, offset).expect("derive failed");
        assert_eq!(ts.to_git_date(), "2025-08-31T01:00:00 +0530");
        assert_eq!(ts.to_string(), "2025-08-31 01:00:00 +05:30");
    }
}
