//! Projecting the occurrence dates of recurring schedules.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    database_id::ScheduleId,
    schedule::{Direction, Frequency, RecurringSchedule},
};

/// A single occurrence of a recurring schedule, derived from the schedule
/// and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedOccurrence {
    /// The schedule the occurrence belongs to.
    pub schedule_id: ScheduleId,
    /// The title of the schedule.
    pub title: String,
    /// The date the occurrence falls on.
    pub date: Date,
    /// The positive amount of the occurrence.
    pub amount: f64,
    /// Whether the occurrence is income or an expense.
    pub direction: Direction,
    /// The category label of the schedule.
    pub category: String,
    /// The description of the schedule.
    pub description: String,
    /// How often the schedule repeats.
    pub frequency: Frequency,
}

impl ProjectedOccurrence {
    /// Create the occurrence of `schedule` on `date`.
    pub fn new(schedule: &RecurringSchedule, date: Date) -> Self {
        Self {
            schedule_id: schedule.id,
            title: schedule.title.clone(),
            date,
            amount: schedule.amount,
            direction: schedule.direction,
            category: schedule.category.clone(),
            description: schedule.description.clone(),
            frequency: schedule.frequency,
        }
    }

    /// The amount with the sign of the direction applied.
    pub fn signed_amount(&self) -> f64 {
        self.direction.signed(self.amount)
    }
}

/// An iterator over the occurrence dates of a schedule in ascending order.
///
/// The iterator ends after the schedule's end date, or when the next date
/// cannot be represented.
#[derive(Debug, Clone)]
pub struct OccurrenceDates {
    frequency: Frequency,
    start_date: Date,
    end_date: Option<Date>,
    after: Option<Date>,
    n: Option<u32>,
}

impl Iterator for OccurrenceDates {
    type Item = Date;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let n = self.n?;
            let Some(date) = self.frequency.nth_from(self.start_date, n) else {
                self.n = None;
                return None;
            };
            self.n = n.checked_add(1);

            if self.end_date.is_some_and(|end_date| date > end_date) {
                self.n = None;
                return None;
            }

            if self.after.is_some_and(|after| date <= after) {
                continue;
            }

            return Some(date);
        }
    }
}

/// Every occurrence date of `schedule`, starting at its start date.
///
/// Ignores whether the schedule is active and whether occurrences have
/// already been materialized.
pub fn schedule_dates(schedule: &RecurringSchedule) -> OccurrenceDates {
    OccurrenceDates {
        frequency: schedule.frequency,
        start_date: schedule.start_date,
        end_date: schedule.end_date,
        after: None,
        n: Some(0),
    }
}

/// The occurrence dates of `schedule` that have not been materialized yet,
/// i.e. those strictly after `last_generated`.
///
/// If the schedule has never been materialized the first date is the start
/// date.
pub fn pending_dates(schedule: &RecurringSchedule) -> OccurrenceDates {
    OccurrenceDates {
        after: schedule.last_generated,
        ..schedule_dates(schedule)
    }
}

/// The occurrences of the active `schedules` that fall in `from..=to`,
/// sorted by date and then by schedule ID.
///
/// `dates` selects which occurrences of each schedule are considered, e.g.
/// [pending_dates] or [schedule_dates].
pub(crate) fn project_between(
    schedules: &[RecurringSchedule],
    from: Date,
    to: Date,
    dates: fn(&RecurringSchedule) -> OccurrenceDates,
) -> Vec<ProjectedOccurrence> {
    let mut occurrences: Vec<ProjectedOccurrence> = schedules
        .iter()
        .filter(|schedule| schedule.is_active)
        .flat_map(|schedule| {
            dates(schedule)
                .skip_while(move |date| *date < from)
                .take_while(move |date| *date <= to)
                .map(move |date| ProjectedOccurrence::new(schedule, date))
        })
        .collect();

    occurrences.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.schedule_id.cmp(&b.schedule_id))
    });

    occurrences
}


#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        occurrence::projection::{
            ProjectedOccurrence, pending_dates, project_between, schedule_dates,
            test_utils::schedule,
        },
        schedule::Frequency,
    };

    const ALL_FREQUENCIES: [Frequency; 5] = [
        Frequency::Weekly,
        Frequency::Biweekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Yearly,
    ];

    #[test]
    fn first_occurrence_is_start_date() {
        let schedule = schedule(1, Frequency::Monthly, date!(2024 - 01 - 15));

        assert_eq!(pending_dates(&schedule).next(), Some(date!(2024 - 01 - 15)));
    }

    #[test]
    fn next_occurrence_follows_last_generated() {
        let mut schedule = schedule(1, Frequency::Monthly, date!(2024 - 01 - 15));
        schedule.last_generated = Some(date!(2024 - 04 - 15));

        assert_eq!(pending_dates(&schedule).next(), Some(date!(2024 - 05 - 15)));
    }

    #[test]
    fn feeding_projection_back_is_strictly_later() {
        for frequency in ALL_FREQUENCIES {
            let mut schedule = schedule(1, frequency, date!(2024 - 01 - 31));

            for _ in 0..40 {
                let next = pending_dates(&schedule).next().unwrap();
                if let Some(last) = schedule.last_generated {
                    assert!(next > last, "{frequency}: {next} is not after {last}");
                }
                schedule.last_generated = Some(next);
            }
        }
    }

    #[test]
    fn dates_are_non_decreasing() {
        for frequency in ALL_FREQUENCIES {
            let schedule = schedule(1, frequency, date!(2023 - 08 - 31));
            let dates: Vec<_> = schedule_dates(&schedule).take(100).collect();

            assert_eq!(dates.len(), 100);
            assert!(
                dates.windows(2).all(|pair| pair[0] <= pair[1]),
                "{frequency} dates went backwards: {dates:?}"
            );
        }
    }

    #[test]
    fn monthly_dates_do_not_drift_after_short_month() {
        let schedule = schedule(1, Frequency::Monthly, date!(2024 - 01 - 31));

        let dates: Vec<_> = schedule_dates(&schedule).take(4).collect();

        assert_eq!(
            dates,
            vec![
                date!(2024 - 01 - 31),
                date!(2024 - 02 - 29),
                date!(2024 - 03 - 31),
                date!(2024 - 04 - 30),
            ]
        );
    }

    #[test]
    fn dates_stop_at_end_date() {
        let mut schedule = schedule(1, Frequency::Weekly, date!(2024 - 01 - 01));
        schedule.end_date = Some(date!(2024 - 01 - 15));

        let dates: Vec<_> = pending_dates(&schedule).collect();

        assert_eq!(
            dates,
            vec![date!(2024 - 01 - 01), date!(2024 - 01 - 08), date!(2024 - 01 - 15)]
        );
    }

    #[test]
    fn ended_schedule_has_no_next_occurrence() {
        let mut schedule = schedule(1, Frequency::Weekly, date!(2024 - 01 - 01));
        schedule.end_date = Some(date!(2024 - 01 - 15));
        schedule.last_generated = Some(date!(2024 - 01 - 15));

        assert_eq!(pending_dates(&schedule).next(), None);
    }

    #[test]
    fn dates_end_at_maximum_date() {
        let schedule = schedule(1, Frequency::Yearly, date!(9998 - 06 - 01));

        let dates: Vec<_> = schedule_dates(&schedule).collect();

        assert_eq!(dates, vec![date!(9998 - 06 - 01), date!(9999 - 06 - 01)]);
    }

    #[test]
    fn project_between_skips_inactive_and_sorts() {
        let weekly = schedule(2, Frequency::Weekly, date!(2024 - 03 - 01));
        let monthly = schedule(1, Frequency::Monthly, date!(2024 - 02 - 08));
        let mut inactive = schedule(3, Frequency::Weekly, date!(2024 - 03 - 01));
        inactive.is_active = false;

        let got = project_between(
            &[weekly.clone(), monthly.clone(), inactive],
            date!(2024 - 03 - 01),
            date!(2024 - 03 - 10),
            schedule_dates,
        );

        assert_eq!(
            got,
            vec![
                ProjectedOccurrence::new(&weekly, date!(2024 - 03 - 01)),
                ProjectedOccurrence::new(&monthly, date!(2024 - 03 - 08)),
                ProjectedOccurrence::new(&weekly, date!(2024 - 03 - 08)),
            ]
        );
    }
}
