//! # docket
//!
//! Line items, totals and document numbering for the five document families
//! of a trading back office: orders, quotations, purchase orders, invoices
//! and RFQs.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Each row is rounded to two decimals on its own; document totals are sums of
//! rounded rows.
//!
//! ## Quick Start
//!
//! ```rust
//! use docket::core::*;
//! use rust_decimal_macros::dec;
//!
//! let mut items = LineItemCollection::new(
//!     LineItemBuilder::new("Cement bag", dec!(10), dec!(250)).build(),
//! );
//! items.append(LineItemBuilder::new("Delivery", dec!(2), dec!(100)).gst_rate(dec!(0)).build());
//!
//! let totals = TotalsCalculator::new("INR").compute(&items, None, None);
//! assert_eq!(totals.subtotal, dec!(2700));
//! assert_eq!(totals.tax_total, dec!(450));
//! assert_eq!(totals.grand_total, dec!(3150));
//! assert_eq!(DocumentNumber::new(DocumentKind::Order, 2025, 7).to_string(), "ORD-2025-0007");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Types, line items, totals, numbering, validation |
//! | `draft` (default) | Async store contract, sequence allocator, `DocumentDraft` |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "draft")]
pub mod draft;

#[cfg(feature = "core")]
pub mod settings;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
#[cfg(feature = "core")]
pub use crate::settings::EngineConfig;
