//! Forecasting the upcoming occurrences of recurring schedules.

use time::{Date, Duration};

use crate::{
    occurrence::{
        ProjectedOccurrence,
        projection::{pending_dates, project_between},
    },
    schedule::RecurringSchedule,
};

/// How many days past today the upcoming occurrences forecast covers.
pub const FORECAST_WINDOW_DAYS: u32 = 30;

/// The last day of a forecast starting on `today`.
pub fn forecast_end(today: Date, window_days: u32) -> Date {
    today
        .checked_add(Duration::days(i64::from(window_days)))
        .unwrap_or(Date::MAX)
}

/// The occurrences of the active `schedules` from `today` to `window_days`
/// days after `today`, inclusive.
///
/// Occurrences that have already been materialized or that fall after a
/// schedule's end date are left out. The result is sorted by date, and by
/// schedule ID for occurrences on the same date.
pub fn forecast_upcoming(
    schedules: &[RecurringSchedule],
    today: Date,
    window_days: u32,
) -> Vec<ProjectedOccurrence> {
    project_between(
        schedules,
        today,
        forecast_end(today, window_days),
        pending_dates,
    )
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::date};

    use crate::{
        occurrence::{
            FORECAST_WINDOW_DAYS, forecast_upcoming, projection::test_utils::schedule,
        },
        schedule::Frequency,
    };

    #[test]
    fn weekly_from_today_is_seven_days_apart() {
        let today = date!(2024 - 05 - 01);
        let schedule = schedule(1, Frequency::Weekly, today);

        let got = forecast_upcoming(&[schedule], today, FORECAST_WINDOW_DAYS);

        assert!(
            (4..=5).contains(&got.len()),
            "want 4 or 5 occurrences, got {}",
            got.len()
        );
        assert_eq!(got[0].date, today);
        assert!(
            got.windows(2)
                .all(|pair| pair[1].date - pair[0].date == Duration::days(7))
        );
    }

    #[test]
    fn window_includes_both_ends() {
        let today = date!(2024 - 05 - 01);
        let schedule = schedule(1, Frequency::Monthly, date!(2024 - 01 - 31));

        let got = forecast_upcoming(&[schedule], today, FORECAST_WINDOW_DAYS);

        // 30 days after 1 May is 31 May.
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].date, date!(2024 - 05 - 31));
    }

    #[test]
    fn inactive_schedules_are_not_forecast() {
        let today = date!(2024 - 05 - 01);
        let mut schedule = schedule(1, Frequency::Weekly, today);
        schedule.is_active = false;

        assert!(forecast_upcoming(&[schedule], today, FORECAST_WINDOW_DAYS).is_empty());
    }

    #[test]
    fn materialized_occurrences_are_not_forecast() {
        let today = date!(2024 - 05 - 01);
        let mut schedule = schedule(1, Frequency::Weekly, date!(2024 - 04 - 24));
        schedule.last_generated = Some(today);

        let got = forecast_upcoming(&[schedule], today, FORECAST_WINDOW_DAYS);

        assert_eq!(got[0].date, date!(2024 - 05 - 08));
    }

    #[test]
    fn ended_schedules_are_not_forecast() {
        let today = date!(2024 - 05 - 01);
        let mut schedule = schedule(1, Frequency::Weekly, date!(2024 - 01 - 01));
        schedule.end_date = Some(date!(2024 - 04 - 30));

        assert!(forecast_upcoming(&[schedule], today, FORECAST_WINDOW_DAYS).is_empty());
    }

    #[test]
    fn sorted_by_date_then_schedule() {
        let today = date!(2024 - 05 - 01);
        let monthly = schedule(7, Frequency::Monthly, date!(2024 - 05 - 08));
        let weekly = schedule(3, Frequency::Weekly, date!(2024 - 05 - 01));

        let got = forecast_upcoming(&[monthly, weekly], today, 7);

        let keys: Vec<_> = got.iter().map(|o| (o.date, o.schedule_id)).collect();
        assert_eq!(
            keys,
            vec![
                (date!(2024 - 05 - 01), 3),
                (date!(2024 - 05 - 08), 3),
                (date!(2024 - 05 - 08), 7),
            ]
        );
    }
}
