//! Core recurring schedule domain types.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::ScheduleId,
    schedule::{Direction, Frequency},
    user::UserId,
};

/// A user-defined income or expense that repeats on a regular basis (e.g.,
/// wages, phone bill, rent).
///
/// To create a new `RecurringSchedule`, use [RecurringSchedule::build] and
/// [crate::schedule::create_schedule].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringSchedule {
    /// The ID of the schedule.
    pub id: ScheduleId,
    /// The user that owns the schedule.
    pub user_id: UserId,
    /// A short name for the schedule, e.g. "Rent".
    pub title: String,
    /// The positive amount of money for each occurrence.
    pub amount: f64,
    /// Whether each occurrence is income or an expense.
    pub direction: Direction,
    /// The category label copied onto each materialized transaction.
    pub category: String,
    /// Free-text notes copied onto each materialized transaction.
    pub description: String,
    /// How often the schedule repeats.
    pub frequency: Frequency,
    /// The date of the first occurrence.
    pub start_date: Date,
    /// The last day an occurrence may fall on. `None` repeats indefinitely.
    pub end_date: Option<Date>,
    /// The date of the most recent occurrence that has been materialized.
    pub last_generated: Option<Date>,
    /// Inactive schedules are neither materialized nor forecast.
    pub is_active: bool,
    /// When the schedule was created.
    pub created_at: OffsetDateTime,
    /// When the schedule was last changed.
    pub updated_at: OffsetDateTime,
}

impl RecurringSchedule {
    /// Start building a new schedule.
    ///
    /// Shortcut for [ScheduleBuilder] for discoverability.
    pub fn build(
        title: &str,
        amount: f64,
        direction: Direction,
        frequency: Frequency,
        start_date: Date,
    ) -> ScheduleBuilder {
        ScheduleBuilder {
            title: title.to_owned(),
            amount,
            direction,
            category: "Uncategorized".to_owned(),
            description: String::new(),
            frequency,
            start_date,
            end_date: None,
            is_active: true,
        }
    }

    /// The amount with the sign of the schedule's direction applied.
    pub fn signed_amount(&self) -> f64 {
        self.direction.signed(self.amount)
    }
}

/// The user-editable fields of a [RecurringSchedule].
///
/// Used both for creating and for replacing a schedule. Call
/// [ScheduleBuilder::validate] before writing it to the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleBuilder {
    /// A short name for the schedule, e.g. "Rent".
    pub title: String,
    /// The positive amount of money for each occurrence.
    pub amount: f64,
    /// Whether each occurrence is income or an expense.
    pub direction: Direction,
    /// The category label, e.g. "Housing".
    #[serde(default = "default_category")]
    pub category: String,
    /// Free-text notes.
    #[serde(default)]
    pub description: String,
    /// How often the schedule repeats.
    pub frequency: Frequency,
    /// The date of the first occurrence.
    pub start_date: Date,
    /// The last day an occurrence may fall on.
    #[serde(default)]
    pub end_date: Option<Date>,
    /// Whether the schedule is active.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_category() -> String {
    "Uncategorized".to_owned()
}

fn default_active() -> bool {
    true
}

impl ScheduleBuilder {
    /// Set the category label.
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Set the description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the last day an occurrence may fall on.
    pub fn end_date(mut self, end_date: Option<Date>) -> Self {
        self.end_date = end_date;
        self
    }

    /// Set whether the schedule is active.
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Check the range constraints on the fields and normalise whitespace.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::EmptyTitle] if the title is empty or only whitespace,
    /// - [Error::EmptyCategory] if the category is empty or only whitespace,
    /// - [Error::InvalidAmount] if the amount is not a positive, finite number,
    /// - [Error::EndBeforeStart] if the end date is before the start date.
    pub fn validate(self) -> Result<Self, Error> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::EmptyTitle);
        }

        let category = self.category.trim();
        if category.is_empty() {
            return Err(Error::EmptyCategory);
        }

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidAmount(self.amount));
        }

        if let Some(end) = self.end_date
            && end < self.start_date
        {
            return Err(Error::EndBeforeStart {
                start: self.start_date,
                end,
            });
        }

        Ok(Self {
            title: title.to_owned(),
            category: category.to_owned(),
            description: self.description.trim().to_owned(),
            ..self
        })
    }
}
