pub mod currency;
pub mod error;

pub use currency::{from_minor_units, to_minor_units, Currency};
pub use error::{AppError, Result};
