//! Document types, line items, totals, numbering and validation.
//!
//! Everything here is synchronous and free of I/O; the async store contract
//! and the draft state machine live in [`crate::draft`].

mod builder;
pub mod currencies;
mod error;
mod input;
mod line_items;
mod numbering;
mod totals;
mod types;
pub mod units;
mod validation;

pub use builder::*;
pub use currencies::is_known_currency_code;
pub use error::*;
pub use input::*;
pub use line_items::*;
pub use numbering::*;
pub use totals::*;
pub use types::*;
pub use units::is_common_unit;
pub use validation::*;
