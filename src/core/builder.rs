use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::line_items::MAX_INPUT;
use super::types::*;
use crate::settings::EngineConfig;

/// Builder for LineItem.
///
/// ```
/// use docket::core::*;
/// use rust_decimal_macros::dec;
///
/// let item = LineItemBuilder::new("Steel rod", dec!(10), dec!(250))
///     .unit("Kg")
///     .hsn_code("7214")
///     .build();
/// assert_eq!(item.line_subtotal(), dec!(2500));
/// assert_eq!(item.line_tax(), dec!(450));
/// ```
pub struct LineItemBuilder {
    item_name: String,
    description: String,
    hsn_code: String,
    quantity: Decimal,
    unit: String,
    unit_price: Decimal,
    gst_rate: Decimal,
}

impl LineItemBuilder {
    /// A row in "Nos" at 18% GST.
    pub fn new(item_name: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            item_name: item_name.into(),
            description: String::new(),
            hsn_code: String::new(),
            quantity,
            unit: "Nos".to_string(),
            unit_price,
            gst_rate: Decimal::new(18, 0),
        }
    }

    /// The blank row a new draft starts with: no name, price 0, configured
    /// quantity, unit and GST rate.
    pub fn blank(config: &EngineConfig) -> Self {
        Self::new("", config.default_qty(), Decimal::ZERO)
            .unit(config.default_unit.clone())
            .gst_rate(config.default_gst())
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn gst_rate(mut self, rate: Decimal) -> Self {
        self.gst_rate = rate;
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn hsn_code(mut self, code: impl Into<String>) -> Self {
        self.hsn_code = code.into();
        self
    }

    /// Build the row with its derived amounts. Negative numbers, a GST rate
    /// above 100 and amounts above [`MAX_INPUT`] are clamped to the nearest
    /// bound and marked unconfirmed.
    pub fn build(self) -> LineItem {
        let mut unconfirmed = BTreeSet::new();
        let quantity = clamp(self.quantity, Some(MAX_INPUT), NumericField::Quantity, &mut unconfirmed);
        let unit_price = clamp(self.unit_price, Some(MAX_INPUT), NumericField::UnitPrice, &mut unconfirmed);
        let gst_rate = clamp(
            self.gst_rate,
            Some(Decimal::ONE_HUNDRED),
            NumericField::GstRate,
            &mut unconfirmed,
        );

        LineItem {
            sr_no: 1,
            item_name: self.item_name,
            description: self.description,
            hsn_code: self.hsn_code,
            quantity,
            unit: self.unit,
            unit_price,
            gst_rate,
            line_subtotal: Decimal::ZERO,
            line_tax: Decimal::ZERO,
            unconfirmed,
        }
        .recompute()
    }
}

fn clamp(
    value: Decimal,
    max: Option<Decimal>,
    field: NumericField,
    unconfirmed: &mut BTreeSet<NumericField>,
) -> Decimal {
    if value < Decimal::ZERO {
        unconfirmed.insert(field);
        return Decimal::ZERO;
    }
    match max {
        Some(m) if value > m => {
            unconfirmed.insert(field);
            m
        }
        _ => value,
    }
}

/// Builder for DocumentHeader.
#[derive(Default)]
pub struct HeaderBuilder {
    header: DocumentHeader,
}

impl HeaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer(self, customer_id: impl Into<String>) -> Self {
        self.field("customer_id", customer_id)
    }

    pub fn vendor(self, vendor_id: impl Into<String>) -> Self {
        self.field("vendor_id", vendor_id)
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.field("title", title)
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.header.set_field(name, value);
        self
    }

    pub fn status(mut self, status: DocumentStatus) -> Self {
        self.header.status = status;
        self
    }

    pub fn document_date(mut self, date: NaiveDate) -> Self {
        self.header.document_date = Some(date);
        self
    }

    pub fn valid_until(mut self, date: NaiveDate) -> Self {
        self.header.valid_until = Some(date);
        self
    }

    /// Foreign currency and its rate (1 foreign unit = `rate` home units).
    pub fn currency(mut self, code: impl Into<String>, rate: Decimal) -> Self {
        self.header.currency_code = Some(code.into());
        self.header.exchange_rate = Some(rate);
        self
    }

    pub fn terms(mut self, terms: impl Into<String>) -> Self {
        self.header.terms = Some(terms.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.header.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> DocumentHeader {
        self.header
    }
}
