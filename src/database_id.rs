//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a recurring schedule.
pub type ScheduleId = DatabaseId;
/// The ID of a materialized or manually logged transaction.
pub type TransactionId = DatabaseId;
/// The ID of a calendar event.
pub type EventId = DatabaseId;
/// The ID of a savings goal.
pub type GoalId = DatabaseId;
