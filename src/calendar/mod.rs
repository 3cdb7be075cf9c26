//! Calendar events and the calendar view that merges them with the
//! occurrences of recurring schedules.

mod aggregate;
mod core;
mod endpoints;

pub use aggregate::{CalendarEntry, CalendarRange, MAX_CALENDAR_DAYS, build_calendar};
pub use core::{
    CalendarEvent, create_event, create_event_table, delete_event, get_events_for_user,
    get_events_in_range,
};
pub use endpoints::{
    create_event_endpoint, delete_event_endpoint, get_calendar_endpoint, list_events_endpoint,
};
