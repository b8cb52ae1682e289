use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::DocketError;
use super::input::NumericInput;
use super::totals::round2;
use super::types::{LineItem, NumericField, QuantityRule};

/// Largest quantity or unit price a row may carry (10^12). Keeps
/// `quantity * unit_price` and its tax inside `Decimal` range.
pub const MAX_INPUT: Decimal = dec!(1000000000000);

/// Accepted range of a numeric field.
fn bounds(field: NumericField) -> (Decimal, Decimal) {
    match field {
        NumericField::GstRate => (Decimal::ZERO, dec!(100)),
        NumericField::Quantity | NumericField::UnitPrice => (Decimal::ZERO, MAX_INPUT),
    }
}

impl LineItem {
    pub fn sr_no(&self) -> u32 {
        self.sr_no
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn hsn_code(&self) -> &str {
        &self.hsn_code
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn gst_rate(&self) -> Decimal {
        self.gst_rate
    }

    /// `round2(quantity * unit_price)`
    pub fn line_subtotal(&self) -> Decimal {
        self.line_subtotal
    }

    /// `round2(line_subtotal * gst_rate / 100)`
    pub fn line_tax(&self) -> Decimal {
        self.line_tax
    }

    pub fn line_total(&self) -> Decimal {
        self.line_subtotal + self.line_tax
    }

    /// Numeric fields whose last input was pending or invalid.
    pub fn unconfirmed_fields(&self) -> impl Iterator<Item = NumericField> + '_ {
        self.unconfirmed.iter().copied()
    }

    pub fn is_confirmed(&self) -> bool {
        self.unconfirmed.is_empty()
    }

    /// Recompute the derived amounts from quantity, unit price and GST rate.
    /// Pure and idempotent.
    pub fn recompute(mut self) -> Self {
        self.refresh();
        self
    }

    /// Name present and quantity allowed by `rule`.
    pub fn is_valid(&self, rule: QuantityRule) -> bool {
        !self.item_name.trim().is_empty() && rule.accepts(self.quantity)
    }

    pub(crate) fn refresh(&mut self) {
        self.line_subtotal = round2(self.quantity.saturating_mul(self.unit_price));
        self.line_tax = round2(self.line_subtotal.saturating_mul(self.gst_rate) / dec!(100));
    }

    /// Re-check stored numbers against the same bounds as form input.
    /// Out-of-range values become zero and unconfirmed.
    pub(crate) fn sanitize(&mut self) {
        self.unconfirmed.clear();
        for field in [NumericField::Quantity, NumericField::UnitPrice, NumericField::GstRate] {
            let value = self.numeric(field);
            let (min, max) = bounds(field);
            if value < min || value > max {
                warn!(sr_no = self.sr_no, field = field.name(), %value, "stored value out of range, treated as zero");
                self.set_numeric(field, NumericInput::Invalid(value.to_string()));
            }
        }
        self.refresh();
    }

    fn numeric(&self, field: NumericField) -> Decimal {
        match field {
            NumericField::Quantity => self.quantity,
            NumericField::UnitPrice => self.unit_price,
            NumericField::GstRate => self.gst_rate,
        }
    }

    /// Store a numeric input. Negative numbers, rates above 100 and amounts
    /// above [`MAX_INPUT`] are kept as invalid and count as zero.
    pub(crate) fn set_numeric(&mut self, field: NumericField, input: NumericInput) {
        let (min, max) = bounds(field);
        let input = input.bounded(min, Some(max));
        let value = input.value_or_zero();
        if input.is_confirmed() {
            self.unconfirmed.remove(&field);
        } else {
            self.unconfirmed.insert(field);
        }
        match field {
            NumericField::Quantity => self.quantity = value,
            NumericField::UnitPrice => self.unit_price = value,
            NumericField::GstRate => self.gst_rate = value,
        }
        self.refresh();
    }

    pub(crate) fn apply(&mut self, field: LineField) {
        match field {
            LineField::ItemName(v) => self.item_name = v,
            LineField::Description(v) => self.description = v,
            LineField::HsnCode(v) => self.hsn_code = v,
            LineField::Unit(v) => self.unit = v,
            LineField::Quantity(v) => self.set_numeric(NumericField::Quantity, v),
            LineField::UnitPrice(v) => self.set_numeric(NumericField::UnitPrice, v),
            LineField::GstRate(v) => self.set_numeric(NumericField::GstRate, v),
        }
    }
}

/// A single-field edit of a line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineField {
    ItemName(String),
    Description(String),
    HsnCode(String),
    Unit(String),
    Quantity(NumericInput),
    UnitPrice(NumericInput),
    GstRate(NumericInput),
}

impl LineField {
    /// Map a form field name and its raw text to an edit.
    pub fn parse(name: &str, raw: &str) -> Option<Self> {
        let field = match name {
            "item_name" => Self::ItemName(raw.to_string()),
            "description" => Self::Description(raw.to_string()),
            "hsn_code" => Self::HsnCode(raw.to_string()),
            "unit" => Self::Unit(raw.to_string()),
            "quantity" => Self::Quantity(NumericInput::parse(raw)),
            "unit_price" => Self::UnitPrice(NumericInput::parse(raw)),
            "gst_rate" => Self::GstRate(NumericInput::parse(raw)),
            _ => return None,
        };
        Some(field)
    }

    /// Whether this edit changes the derived amounts.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Quantity(_) | Self::UnitPrice(_) | Self::GstRate(_)
        )
    }
}

/// Ordered line items with `sr_no` always `1..=len`.
///
/// Never empty: it is created from a first row and refuses to remove the last.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LineItemCollection {
    items: Vec<LineItem>,
}

impl LineItemCollection {
    pub fn new(first: LineItem) -> Self {
        let mut collection = Self { items: vec![first] };
        collection.renumber();
        collection.items[0].refresh();
        collection
    }

    /// Rebuild from stored rows: order by stored `sr_no`, renumber, and
    /// recompute every row. Numbers outside the form bounds are zeroed and
    /// left unconfirmed, so such a row cannot be submitted unchanged.
    /// `None` if `items` is empty.
    pub fn from_stored(mut items: Vec<LineItem>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        items.sort_by_key(|item| item.sr_no);
        for item in &mut items {
            item.sanitize();
        }
        let mut collection = Self { items };
        collection.renumber();
        Some(collection)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LineItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[LineItem] {
        &self.items
    }

    /// Append a row; it gets the next `sr_no` and fresh derived amounts.
    pub fn append(&mut self, template: LineItem) -> &LineItem {
        let mut item = template;
        item.sr_no = self.next_sr_no();
        item.refresh();
        debug!(sr_no = item.sr_no, "line item appended");
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    /// Remove the row at `index` and renumber the rest.
    pub fn remove_at(&mut self, index: usize) -> Result<LineItem, DocketError> {
        self.check_index(index)?;
        if self.items.len() == 1 {
            return Err(DocketError::LastItem);
        }
        let removed = self.items.remove(index);
        self.renumber();
        debug!(index, remaining = self.items.len(), "line item removed");
        Ok(removed)
    }

    /// Apply `field` to the row at `index`; numeric edits recompute the row.
    pub fn update_at(&mut self, index: usize, field: LineField) -> Result<&LineItem, DocketError> {
        self.check_index(index)?;
        let item = &mut self.items[index];
        item.apply(field);
        Ok(&*item)
    }

    fn check_index(&self, index: usize) -> Result<(), DocketError> {
        if index >= self.items.len() {
            return Err(DocketError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }

    fn next_sr_no(&self) -> u32 {
        u32::try_from(self.items.len() + 1).unwrap_or(u32::MAX)
    }

    fn renumber(&mut self) {
        for (pos, item) in self.items.iter_mut().enumerate() {
            item.sr_no = u32::try_from(pos + 1).unwrap_or(u32::MAX);
        }
    }
}

impl<'a> IntoIterator for &'a LineItemCollection {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
