//! Merging calendar events with the occurrences of recurring schedules.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    calendar::CalendarEvent,
    occurrence::{ProjectedOccurrence, project_between, schedule_dates},
    schedule::RecurringSchedule,
};

/// The most days a calendar can cover, enough for a leap year.
pub const MAX_CALENDAR_DAYS: i64 = 366;

/// An inclusive range of days shown on a calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarRange {
    start: Date,
    end: Date,
}

impl CalendarRange {
    /// Create the range `start..=end`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidDateRange] if `end` is before `start`,
    /// - or [Error::DateRangeTooLong] if the range covers more than
    ///   [MAX_CALENDAR_DAYS] days.
    pub fn new(start: Date, end: Date) -> Result<Self, Error> {
        if end < start {
            return Err(Error::InvalidDateRange { start, end });
        }

        if (end - start).whole_days() + 1 > MAX_CALENDAR_DAYS {
            return Err(Error::DateRangeTooLong {
                start,
                end,
                max_days: MAX_CALENDAR_DAYS,
            });
        }

        Ok(Self { start, end })
    }

    /// The first day of the range.
    pub fn start(&self) -> Date {
        self.start
    }

    /// The last day of the range.
    pub fn end(&self) -> Date {
        self.end
    }

    /// Whether `date` falls within the range.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One entry on a calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarEntry {
    /// A one-off event created by the user.
    Event(CalendarEvent),
    /// An occurrence of a recurring schedule.
    Occurrence(ProjectedOccurrence),
}

impl CalendarEntry {
    /// The day the entry falls on.
    pub fn date(&self) -> Date {
        match self {
            Self::Event(event) => event.date,
            Self::Occurrence(occurrence) => occurrence.date,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Event(_) => 0,
            Self::Occurrence(_) => 1,
        }
    }
}

/// The entries of a calendar covering `range`.
///
/// Combines the `events` in the range with every occurrence of the active
/// `schedules` in the range, whether or not the occurrence has been recorded
/// as a transaction. Entries are sorted by date. Events come before
/// occurrences on the same day.
pub fn build_calendar(
    events: &[CalendarEvent],
    schedules: &[RecurringSchedule],
    range: CalendarRange,
) -> Vec<CalendarEntry> {
    let mut entries: Vec<CalendarEntry> = events
        .iter()
        .filter(|event| range.contains(event.date))
        .cloned()
        .map(CalendarEntry::Event)
        .chain(
            project_between(schedules, range.start(), range.end(), schedule_dates)
                .into_iter()
                .map(CalendarEntry::Occurrence),
        )
        .collect();

    entries.sort_by_key(|entry| (entry.date(), entry.rank()));

    entries
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        calendar::{CalendarEntry, CalendarEvent, CalendarRange, MAX_CALENDAR_DAYS, build_calendar},
        occurrence::{ProjectedOccurrence, test_utils::schedule},
        schedule::Frequency,
        user::UserId,
    };

    fn event(id: i64, date: time::Date) -> CalendarEvent {
        CalendarEvent {
            id,
            user_id: UserId::new(1),
            title: format!("Event {id}"),
            description: String::new(),
            date,
        }
    }

    #[test]
    fn range_rejects_end_before_start() {
        let result = CalendarRange::new(date!(2024 - 06 - 02), date!(2024 - 06 - 01));

        assert_eq!(
            result,
            Err(Error::InvalidDateRange {
                start: date!(2024 - 06 - 02),
                end: date!(2024 - 06 - 01),
            })
        );
    }

    #[test]
    fn single_day_range_is_valid() {
        let range = CalendarRange::new(date!(2024 - 06 - 01), date!(2024 - 06 - 01)).unwrap();

        assert!(range.contains(date!(2024 - 06 - 01)));
        assert!(!range.contains(date!(2024 - 06 - 02)));
    }

    #[test]
    fn leap_year_range_is_valid() {
        let range = CalendarRange::new(date!(2024 - 01 - 01), date!(2024 - 12 - 31)).unwrap();

        assert!(range.contains(date!(2024 - 02 - 29)));
    }

    #[test]
    fn range_rejects_more_than_max_days() {
        let result = CalendarRange::new(date!(2024 - 01 - 01), date!(2025 - 01 - 01));

        assert_eq!(
            result,
            Err(Error::DateRangeTooLong {
                start: date!(2024 - 01 - 01),
                end: date!(2025 - 01 - 01),
                max_days: MAX_CALENDAR_DAYS,
            })
        );
    }

    #[test]
    fn range_rejects_every_representable_year() {
        let result = CalendarRange::new(date!(0001 - 01 - 01), date!(9999 - 12 - 31));

        assert!(matches!(result, Err(Error::DateRangeTooLong { .. })));
    }

    #[test]
    fn merges_events_and_occurrences_by_date() {
        let range = CalendarRange::new(date!(2024 - 06 - 01), date!(2024 - 06 - 14)).unwrap();
        let weekly = schedule(1, Frequency::Weekly, date!(2024 - 05 - 27));
        let exam = event(1, date!(2024 - 06 - 03));
        let birthday = event(2, date!(2024 - 06 - 05));
        let outside = event(3, date!(2024 - 06 - 20));

        let events = [birthday.clone(), exam.clone(), outside];
        let occurrence = |date| CalendarEntry::Occurrence(ProjectedOccurrence::new(&weekly, date));

        let got = build_calendar(&events, &[weekly.clone()], range);

        assert_eq!(
            got,
            vec![
                CalendarEntry::Event(exam),
                occurrence(date!(2024 - 06 - 03)),
                CalendarEntry::Event(birthday),
                occurrence(date!(2024 - 06 - 10)),
            ]
        );
    }

    #[test]
    fn includes_recorded_occurrences_and_skips_inactive() {
        let range = CalendarRange::new(date!(2024 - 06 - 01), date!(2024 - 06 - 30)).unwrap();
        let mut recorded = schedule(1, Frequency::Monthly, date!(2024 - 01 - 15));
        recorded.last_generated = Some(date!(2024 - 06 - 15));
        let mut inactive = schedule(2, Frequency::Weekly, date!(2024 - 06 - 01));
        inactive.is_active = false;

        let got = build_calendar(&[], &[recorded, inactive], range);

        let dates: Vec<_> = got.iter().map(CalendarEntry::date).collect();
        assert_eq!(dates, vec![date!(2024 - 06 - 15)]);
    }

    #[test]
    fn entries_are_tagged_by_kind() {
        let entry = CalendarEntry::Event(event(1, date!(2024 - 06 - 03)));

        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["kind"], "event");
        assert_eq!(json["date"], "2024-06-03");
    }
}
