use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of the merged `crash_date crash_time` column.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionRecord {
    pub crash_datetime: String,
    pub latitude: f64,
    pub longitude: f64,
    pub injured_persons: u32,
    pub injured_pedestrians: u32,
    pub injured_cyclists: u32,
    pub injured_motorists: u32,
    pub on_street_name: Option<String>,
}

impl CollisionRecord {
    /// Parsed crash timestamp, `None` when the merged text is not a valid
    /// `MM/DD/YYYY HH:MM` value.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.crash_datetime.trim(), TIMESTAMP_FORMAT).ok()
    }

    pub fn injured(&self, category: PersonCategory) -> u32 {
        match category {
            PersonCategory::Pedestrians => self.injured_pedestrians,
            PersonCategory::Cyclists => self.injured_cyclists,
            PersonCategory::Motorists => self.injured_motorists,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonCategory {
    Pedestrians,
    Cyclists,
    Motorists,
}

impl PersonCategory {
    pub const ALL: [PersonCategory; 3] = [
        PersonCategory::Pedestrians,
        PersonCategory::Cyclists,
        PersonCategory::Motorists,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PersonCategory::Pedestrians => "Pedestrians",
            PersonCategory::Cyclists => "Cyclists",
            PersonCategory::Motorists => "Motorists",
        }
    }

    /// Name of the source column holding this category's count.
    pub fn column(&self) -> &'static str {
        match self {
            PersonCategory::Pedestrians => "injured_pedestrians",
            PersonCategory::Cyclists => "injured_cyclists",
            PersonCategory::Motorists => "injured_motorists",
        }
    }
}

impl fmt::Display for PersonCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PersonCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        PersonCategory::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                format!("unknown person category '{value}' (expected pedestrians, cyclists or motorists)")
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteBucket {
    pub minute: u32,
    pub crashes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreetRanking {
    pub rank: usize,
    pub street: String,
    pub injured: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn record(crash_datetime: &str) -> CollisionRecord {
        CollisionRecord {
            crash_datetime: crash_datetime.to_string(),
            latitude: 40.7,
            longitude: -73.9,
            injured_persons: 2,
            injured_pedestrians: 1,
            injured_cyclists: 0,
            injured_motorists: 1,
            on_street_name: None,
        }
    }

    #[test]
    fn parses_month_day_year_timestamps() {
        let ts = record("07/14/2019 08:47").timestamp().unwrap();
        assert_eq!(ts.hour(), 8);
        assert_eq!(ts.minute(), 47);
    }

    #[test]
    fn accepts_single_digit_hours() {
        let ts = record("01/02/2018 9:05").timestamp().unwrap();
        assert_eq!(ts.hour(), 9);
        assert_eq!(ts.minute(), 5);
    }

    #[test]
    fn malformed_timestamps_are_null() {
        assert!(record("2019-07-14 08:47").timestamp().is_none());
        assert!(record(" ").timestamp().is_none());
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Cyclists".parse::<PersonCategory>(), Ok(PersonCategory::Cyclists));
        assert_eq!("motorists".parse::<PersonCategory>(), Ok(PersonCategory::Motorists));
        assert!("drivers".parse::<PersonCategory>().is_err());
    }

    #[test]
    fn injured_reads_the_category_count() {
        let r = record("07/14/2019 08:47");
        assert_eq!(r.injured(PersonCategory::Pedestrians), 1);
        assert_eq!(r.injured(PersonCategory::Cyclists), 0);
        assert_eq!(r.injured(PersonCategory::Motorists), 1);
    }
}
