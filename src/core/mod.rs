//! Core business logic abstractions

pub mod config;
pub mod controller;
pub mod conversion;
pub mod error;
pub mod form;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use controller::FormController;
pub use conversion::{ConversionRequest, ConversionResult};
pub use error::FormError;
pub use form::{Effect, Event, FormState};
pub use rates::{FetchError, RateProvider, RateTable};
