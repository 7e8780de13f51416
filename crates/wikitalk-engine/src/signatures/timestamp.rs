use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::{Match, Regex};
use wikitalk_config::TimestampConfig;

use crate::config::compile;
use crate::error::EngineError;

/// Recognises and parses signature timestamps (`HH:MM, D Month YYYY (UTC)`).
#[derive(Debug, Clone)]
pub struct TimestampFormat {
    with_zone: Regex,
    without_zone: Regex,
    month_names: Vec<String>,
    zone_suffix: String,
}

impl TimestampFormat {
    pub fn new(config: &TimestampConfig) -> Result<Self, EngineError> {
        if config.month_names.len() != 12 {
            return Err(EngineError::InvalidMonthNames {
                count: config.month_names.len(),
            });
        }

        let months = config
            .month_names
            .iter()
            .map(|m| regex::escape(m))
            .collect::<Vec<_>>()
            .join("|");
        let core = format!(r"\b(\d{{1,2}}):(\d{{2}}), (\d{{1,2}}) ({months}) (\d{{4}})");
        let zone = regex::escape(&config.timezone);

        Ok(Self {
            with_zone: compile("timestamp", &format!(r"{core} \({zone}\)"))?,
            without_zone: compile("zoneless timestamp", &core)?,
            month_names: config.month_names.clone(),
            zone_suffix: format!(" ({})", config.timezone),
        })
    }

    /// Every complete timestamp (with zone) in `s`, left to right.
    pub fn find_iter<'t>(&self, s: &'t str) -> impl Iterator<Item = Match<'t>> {
        self.with_zone.find_iter(s)
    }

    /// Whether `s` contains a complete timestamp, zone included.
    pub fn has_zone(&self, s: &str) -> bool {
        self.with_zone.is_match(s)
    }

    /// Whether `s` contains a timestamp, with or without zone.
    pub fn is_timestamp(&self, s: &str) -> bool {
        self.without_zone.is_match(s)
    }

    /// The zone label as appended to a timestamp, e.g. `" (UTC)"`.
    pub fn zone_suffix(&self) -> &str {
        &self.zone_suffix
    }

    /// Parses the first timestamp found in `s`. Dates are read as UTC.
    pub fn parse(&self, s: &str) -> Option<DateTime<Utc>> {
        let caps = self.without_zone.captures(s)?;
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        let month = self.month_names.iter().position(|m| m == &caps[4])? as u32 + 1;
        let year: i32 = caps[5].parse().ok()?;

        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
        Some(date.and_time(time).and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn format() -> TimestampFormat {
        TimestampFormat::new(&TimestampConfig::default()).unwrap()
    }

    #[test]
    fn finds_zoned_timestamps_only() {
        let f = format();
        let line = "a 09:05, 3 March 2024 (UTC) b 10:00, 4 March 2024 c";
        let found: Vec<_> = f.find_iter(line).map(|m| m.as_str()).collect();

        assert_eq!(found, vec!["09:05, 3 March 2024 (UTC)"]);
        assert!(f.is_timestamp("10:00, 4 March 2024"));
        assert!(!f.has_zone("10:00, 4 March 2024"));
    }

    #[rstest]
    #[case("09:05, 3 March 2024 (UTC)", Some((2024, 3, 3, 9, 5)))]
    #[case("23:59, 31 December 1999", Some((1999, 12, 31, 23, 59)))]
    #[case("25:00, 1 January 2020 (UTC)", None)]
    #[case("12:00, 30 February 2020 (UTC)", None)]
    #[case("12:00, 1 Smarch 2020 (UTC)", None)]
    fn parses_dates(#[case] s: &str, #[case] expected: Option<(i32, u32, u32, u32, u32)>) {
        let expected =
            expected.map(|(y, mo, d, h, mi)| Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap());
        assert_eq!(format().parse(s), expected);
    }

    #[test]
    fn localized_month_names_and_zone() {
        let config = TimestampConfig {
            month_names: [
                "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août",
                "septembre", "octobre", "novembre", "décembre",
            ]
            .map(String::from)
            .to_vec(),
            timezone: "CET".to_string(),
        };
        let f = TimestampFormat::new(&config).unwrap();

        assert!(f.has_zone("14:30, 2 août 2023 (CET)"));
        assert_eq!(f.zone_suffix(), " (CET)");
        assert_eq!(
            f.parse("14:30, 2 août 2023 (CET)"),
            Some(Utc.with_ymd_and_hms(2023, 8, 2, 14, 30, 0).unwrap())
        );
    }

    #[test]
    fn rejects_wrong_month_count() {
        let config = TimestampConfig {
            month_names: vec!["Only".to_string()],
            ..TimestampConfig::default()
        };
        assert!(matches!(
            TimestampFormat::new(&config),
            Err(EngineError::InvalidMonthNames { count: 1 })
        ));
    }
}
