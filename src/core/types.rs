use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The five document families that share the line-item engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentKind {
    Order,
    Quotation,
    PurchaseOrder,
    Invoice,
    Rfq,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        Self::Order,
        Self::Quotation,
        Self::PurchaseOrder,
        Self::Invoice,
        Self::Rfq,
    ];

    /// Number prefix, e.g. `ORD` in `ORD-2025-0007`.
    pub fn prefix(&self) -> &'static str {
        self.descriptor().prefix
    }

    /// Parse from a number prefix.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.prefix() == prefix)
    }

    pub fn descriptor(&self) -> &'static DocumentDescriptor {
        match self {
            Self::Order => &ORDER,
            Self::Quotation => &QUOTATION,
            Self::PurchaseOrder => &PURCHASE_ORDER,
            Self::Invoice => &INVOICE,
            Self::Rfq => &RFQ,
        }
    }

    /// Kinds a saved document of this kind can be converted into.
    pub fn can_convert_to(&self, target: DocumentKind) -> bool {
        matches!(
            (self, target),
            (Self::Quotation, Self::Order)
                | (Self::Order, Self::Invoice)
                | (Self::Rfq, Self::PurchaseOrder)
        )
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().label)
    }
}

/// Which quantities make a row valid.
///
/// RFQ rows must request something; the priced documents accept zero.
/// Whether the difference is business policy is still open with product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityRule {
    /// `quantity >= 0`
    NonNegative,
    /// `quantity > 0`
    Positive,
}

impl QuantityRule {
    pub fn accepts(&self, quantity: Decimal) -> bool {
        match self {
            Self::NonNegative => !quantity.is_sign_negative() || quantity.is_zero(),
            Self::Positive => quantity > Decimal::ZERO,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::NonNegative => "quantity must not be negative",
            Self::Positive => "quantity must be greater than zero",
        }
    }
}

/// Static per-kind parameters of the generic document engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentDescriptor {
    pub kind: DocumentKind,
    pub prefix: &'static str,
    pub label: &'static str,
    /// Header fields that must be present and non-blank before submit.
    pub required_fields: &'static [&'static str],
    pub quantity_rule: QuantityRule,
    /// Function invoked after a successful save, if any.
    pub notify_on_save: Option<&'static str>,
}

static ORDER: DocumentDescriptor = DocumentDescriptor {
    kind: DocumentKind::Order,
    prefix: "ORD",
    label: "order",
    required_fields: &["customer_id"],
    quantity_rule: QuantityRule::NonNegative,
    notify_on_save: None,
};

static QUOTATION: DocumentDescriptor = DocumentDescriptor {
    kind: DocumentKind::Quotation,
    prefix: "QUO",
    label: "quotation",
    required_fields: &["customer_id"],
    quantity_rule: QuantityRule::NonNegative,
    notify_on_save: None,
};

static PURCHASE_ORDER: DocumentDescriptor = DocumentDescriptor {
    kind: DocumentKind::PurchaseOrder,
    prefix: "PO",
    label: "purchase order",
    required_fields: &["vendor_id"],
    quantity_rule: QuantityRule::NonNegative,
    notify_on_save: None,
};

static INVOICE: DocumentDescriptor = DocumentDescriptor {
    kind: DocumentKind::Invoice,
    prefix: "INV",
    label: "invoice",
    required_fields: &["customer_id"],
    quantity_rule: QuantityRule::NonNegative,
    notify_on_save: None,
};

static RFQ: DocumentDescriptor = DocumentDescriptor {
    kind: DocumentKind::Rfq,
    prefix: "RFQ",
    label: "RFQ",
    required_fields: &["title"],
    quantity_rule: QuantityRule::Positive,
    notify_on_save: Some("send-rfq-to-vendors"),
};

/// Tenant partition and acting user, passed explicitly to scoped operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantContext {
    /// Branch the numbering sequence and store queries are partitioned by.
    pub scope_key: String,
    pub user_id: Option<String>,
    pub role: Option<String>,
}

impl TenantContext {
    pub fn new(scope_key: impl Into<String>) -> Self {
        Self {
            scope_key: scope_key.into(),
            user_id: None,
            role: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>, role: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.role = Some(role.into());
        self
    }
}

/// Business status stored in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocumentStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    /// Superseded by a document converted from this one.
    Converted,
    Cancelled,
}

/// Editing lifecycle of a [`DocumentDraft`](crate::draft::DocumentDraft).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    /// Freshly created, never saved, untouched.
    New,
    /// Being edited; also the state after a failed submit.
    Editing,
    /// Validation passed and the store write is in flight.
    Submitting,
    /// Last submit succeeded and nothing changed since.
    Saved,
}

/// Link from a converted document back to its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    pub kind: DocumentKind,
    pub id: String,
    pub number: String,
}

/// Document header: common typed fields plus kind-specific string fields
/// (`customer_id`, `vendor_id`, `title`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub status: DocumentStatus,
    pub document_date: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    /// ISO 4217 code; `None` means home currency.
    pub currency_code: Option<String>,
    /// 1 foreign unit = `exchange_rate` home units.
    pub exchange_rate: Option<Decimal>,
    pub terms: Option<String>,
    pub notes: Option<String>,
    pub source: Option<SourceLink>,
    pub fields: BTreeMap<String, String>,
}

impl DocumentHeader {
    /// A kind-specific field, `None` when absent or blank.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }
}

/// The numeric inputs of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NumericField {
    Quantity,
    UnitPrice,
    GstRate,
}

impl NumericField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Quantity => "quantity",
            Self::UnitPrice => "unit_price",
            Self::GstRate => "gst_rate",
        }
    }
}

/// One priced row of a document.
///
/// `sr_no`, `line_subtotal` and `line_tax` are derived and only change through
/// [`LineItemCollection`](super::LineItemCollection) or [`LineItem::recompute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub(crate) sr_no: u32,
    pub(crate) item_name: String,
    pub(crate) description: String,
    pub(crate) hsn_code: String,
    pub(crate) quantity: Decimal,
    pub(crate) unit: String,
    pub(crate) unit_price: Decimal,
    pub(crate) gst_rate: Decimal,
    pub(crate) line_subtotal: Decimal,
    pub(crate) line_tax: Decimal,
    /// Numeric fields whose last input was pending or invalid.
    #[serde(skip)]
    pub(crate) unconfirmed: BTreeSet<NumericField>,
}

/// Document totals, derived from the line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub tax_total: Decimal,
    pub grand_total: Decimal,
    /// Set when the document is in a foreign currency.
    pub currency_code: Option<String>,
    pub exchange_rate: Option<Decimal>,
    pub grand_total_in_currency: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn prefixes_round_trip() {
        for kind in DocumentKind::ALL {
            assert_eq!(DocumentKind::from_prefix(kind.prefix()), Some(kind));
        }
        assert_eq!(DocumentKind::from_prefix("SO"), None);
    }

    #[test]
    fn rfq_requires_positive_quantity() {
        let rfq = DocumentKind::Rfq.descriptor().quantity_rule;
        let order = DocumentKind::Order.descriptor().quantity_rule;
        assert!(!rfq.accepts(dec!(0)));
        assert!(order.accepts(dec!(0)));
        assert!(rfq.accepts(dec!(0.5)));
        assert!(!order.accepts(dec!(-1)));
    }

    #[test]
    fn conversions() {
        assert!(DocumentKind::Quotation.can_convert_to(DocumentKind::Order));
        assert!(DocumentKind::Rfq.can_convert_to(DocumentKind::PurchaseOrder));
        assert!(!DocumentKind::Invoice.can_convert_to(DocumentKind::Order));
    }

    #[test]
    fn blank_header_field_counts_as_missing() {
        let mut header = DocumentHeader::default();
        header.set_field("customer_id", "   ");
        assert_eq!(header.field("customer_id"), None);
        header.set_field("customer_id", "C-17");
        assert_eq!(header.field("customer_id"), Some("C-17"));
    }
}
