//! Recurring income and expense schedules.

mod db;
mod domain;
mod endpoints;
mod frequency;

pub use db::{
    create_schedule, create_schedule_table, delete_schedule, get_active_schedules_for_user,
    get_schedule, get_schedules_for_user, set_last_generated, set_schedule_active,
    update_schedule,
};
pub use domain::{RecurringSchedule, ScheduleBuilder};
pub use endpoints::{
    create_schedule_endpoint, delete_schedule_endpoint, get_schedule_endpoint,
    list_schedules_endpoint, set_schedule_active_endpoint, update_schedule_endpoint,
};
pub use frequency::{Direction, Frequency};
