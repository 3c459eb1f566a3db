use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Month};

use crate::ValidationError;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// Month-day row label ("MM-DD"), ordered by calendar position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayLabel {
    month: u8,
    day: u8,
}

impl DayLabel {
    pub fn from_date(date: Date) -> Self {
        Self {
            month: date.month() as u8,
            day: date.day(),
        }
    }

    pub const fn month(self) -> u8 {
        self.month
    }

    pub const fn day(self) -> u8 {
        self.day
    }

    pub const fn is_leap_day(self) -> bool {
        self.month == 2 && self.day == 29
    }
}

impl Display for DayLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for DayLabel {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidDayLabel {
            value: value.to_owned(),
        };

        let (month, day) = value.split_once('-').ok_or_else(invalid)?;
        if month.len() != 2 || day.len() != 2 {
            return Err(invalid());
        }
        let month = month.parse::<u8>().map_err(|_| invalid())?;
        let day = day.parse::<u8>().map_err(|_| invalid())?;

        // 2000 is a leap year, so 02-29 is accepted.
        let month = Month::try_from(month).map_err(|_| invalid())?;
        let date = Date::from_calendar_date(2000, month, day).map_err(|_| invalid())?;
        Ok(Self::from_date(date))
    }
}

impl Serialize for DayLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(D::Error::custom)
    }
}

pub fn validate_year(year: i32) -> Result<i32, ValidationError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(ValidationError::YearOutOfRange {
            year,
            min: MIN_YEAR,
            max: MAX_YEAR,
        })
    }
}

/// Every calendar day of `year`, January 1 through December 31.
pub fn days_of_year(year: i32) -> Result<Vec<Date>, ValidationError> {
    let year = validate_year(year)?;
    let mut current = first_day(year)?;
    let mut days = Vec::with_capacity(366);
    while current.year() == year {
        days.push(current);
        match current.next_day() {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(days)
}

pub fn first_day(year: i32) -> Result<Date, ValidationError> {
    Date::from_calendar_date(validate_year(year)?, Month::January, 1).map_err(|_| {
        ValidationError::YearOutOfRange {
            year,
            min: MIN_YEAR,
            max: MAX_YEAR,
        }
    })
}
