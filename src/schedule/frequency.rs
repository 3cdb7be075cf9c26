//! Frequencies and directions of recurring schedules, and the calendar
//! arithmetic for stepping between occurrences.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month};

use crate::Error;

/// How often a recurring schedule happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every 7 days.
    Weekly,
    /// Every 14 days.
    Biweekly,
    /// Every calendar month.
    Monthly,
    /// Every three calendar months.
    Quarterly,
    /// Every twelve calendar months.
    Yearly,
}

impl Frequency {
    /// The tag used for this frequency in the database and in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// The next date one period after `date`.
    ///
    /// Calendar-month frequencies clamp to the end of the target month, e.g.
    /// stepping monthly from 31 January gives 28 (or 29) February.
    ///
    /// Returns `None` if the result is outside the range of [Date].
    pub fn step(self, date: Date) -> Option<Date> {
        self.nth_from(date, 1)
    }

    /// The date `n` periods after `start`.
    ///
    /// Occurrences are anchored on `start` so the day of month does not drift
    /// after passing through a short month: the monthly occurrences of a
    /// schedule starting 31 January are 31 Jan, 29 Feb (2024), 31 Mar, 30 Apr.
    ///
    /// Returns `None` if the result is outside the range of [Date].
    pub fn nth_from(self, start: Date, n: u32) -> Option<Date> {
        let n = i64::from(n);

        match self {
            Self::Weekly => start.checked_add(Duration::weeks(n)),
            Self::Biweekly => start.checked_add(Duration::weeks(2 * n)),
            Self::Monthly => add_months_clamped(start, n),
            Self::Quarterly => add_months_clamped(start, 3 * n),
            Self::Yearly => add_months_clamped(start, 12 * n),
        }
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            other => Err(Error::InvalidFrequency(other.to_owned())),
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for Frequency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Frequency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// Whether money is earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money coming in, e.g. wages.
    Income,
    /// Money going out, e.g. rent.
    Expense,
}

impl Direction {
    /// The tag used for this direction in the database and in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Apply the sign of the direction to a positive `amount`.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(Error::InvalidDirection(other.to_owned())),
        }
    }
}

impl ToSql for Direction {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Direction {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

fn add_months_clamped(date: Date, months: i64) -> Option<Date> {
    let month_index =
        i64::from(date.year()) * 12 + i64::from(u8::from(date.month()) - 1) + months;

    let year = i32::try_from(month_index.div_euclid(12)).ok()?;
    let month_number = u8::try_from(month_index.rem_euclid(12) + 1).ok()?;
    let month = Month::try_from(month_number).ok()?;
    let day = date.day().min(last_day_of_month(year, month));

    Date::from_calendar_date(year, month, day).ok()
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if time::util::is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}
