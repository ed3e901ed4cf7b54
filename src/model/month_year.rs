//! Calendar month values written as `MM-YYYY`.
//!
//! Stored in Postgres as the first day of the month so that range
//! comparisons in SQL are chronological rather than lexical.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
    Decode, Encode, Postgres, Type,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected MM-YYYY, got '{0}'")]
pub struct ParseMonthYearError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthYear(NaiveDate);

impl MonthYear {
    pub fn new(month: u32, year: i32) -> Option<MonthYear> {
        if !(1..=9999).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, 1).map(MonthYear)
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for MonthYear {
    fn from(date: NaiveDate) -> Self {
        MonthYear(date - Days::new(u64::from(date.day0())))
    }
}

impl FromStr for MonthYear {
    type Err = ParseMonthYearError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let err = || ParseMonthYearError(value.to_owned());

        let (month, year) = value.split_once('-').ok_or_else(err)?;
        let digits = |s: &str, len: usize| {
            s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(month, 2) || !digits(year, 4) {
            return Err(err());
        }

        let month: u32 = month.parse().map_err(|_| err())?;
        let year: i32 = year.parse().map_err(|_| err())?;

        MonthYear::new(month, year).ok_or_else(err)
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month(), self.year())
    }
}

impl Serialize for MonthYear {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthYear {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}

impl Type<Postgres> for MonthYear {
    fn type_info() -> PgTypeInfo {
        <NaiveDate as Type<Postgres>>::type_info()
    }
}

impl<'q> Encode<'q, Postgres> for MonthYear {
    fn encode_by_ref(
        &self,
        buf: &mut PgArgumentBuffer,
    ) -> Result<IsNull, BoxDynError> {
        <NaiveDate as Encode<'q, Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> Decode<'r, Postgres> for MonthYear {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let date = <NaiveDate as Decode<'r, Postgres>>::decode(value)?;
        Ok(MonthYear::from(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn my(value: &str) -> MonthYear {
        value.parse().unwrap()
    }

    #[test]
    fn test_parse_valid() {
        let value = my("03-2024");
        assert_eq!(value.month(), 3);
        assert_eq!(value.year(), 2024);
        assert_eq!(
            value.first_day(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for value in [
            "", "3-2024", "03-24", "2024-03", "13-2024", "00-2024", "03/2024",
            "03-2024-01", "+3-2024", "03-+024", "ab-2024", " 03-2024",
            "03-0000",
        ] {
            assert!(
                value.parse::<MonthYear>().is_err(),
                "accepted '{}'",
                value
            );
        }
    }

    #[test]
    fn test_ordering_is_chronological() {
        assert!(my("12-2023") < my("01-2024"));
        assert!(my("02-2024") > my("11-2023"));
        assert!(my("05-2023") <= my("05-2023"));
    }

    #[test]
    fn test_display_round_trips_text() {
        assert_eq!(my("07-2025").to_string(), "07-2025");
        assert_eq!(MonthYear::new(1, 999).unwrap().to_string(), "01-0999");
    }

    #[test]
    fn test_from_date_normalizes_to_first_day() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(MonthYear::from(date), my("02-2024"));
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&my("10-2025")).unwrap();
        assert_eq!(json, r#""10-2025""#);

        let parsed: MonthYear = serde_json::from_str(r#""01-2026""#).unwrap();
        assert_eq!(parsed, my("01-2026"));

        assert!(serde_json::from_str::<MonthYear>(r#""2026-01""#).is_err());
    }
}
