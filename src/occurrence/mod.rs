//! Occurrences of recurring schedules.
//!
//! This module contains:
//! - The projection of a schedule's occurrence dates
//! - The generator that records elapsed occurrences as transactions
//! - The forecast of upcoming occurrences
//! - Route handlers for generating and forecasting occurrences

mod endpoints;
mod forecast;
mod generator;
mod projection;

pub use endpoints::{generate_occurrences_endpoint, upcoming_occurrences_endpoint};
pub use forecast::{FORECAST_WINDOW_DAYS, forecast_end, forecast_upcoming};
pub use generator::{GenerationSummary, generate_missing_occurrences};
pub use projection::{ProjectedOccurrence, schedule_dates};

pub(crate) use projection::project_between;

#[cfg(test)]
pub(crate) use projection::test_utils;
