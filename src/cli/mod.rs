//! Command line front end

pub mod convert;
pub mod currencies;
pub mod interactive;
pub mod setup;
pub mod ui;
