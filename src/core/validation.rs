use rust_decimal::Decimal;
use tracing::debug;

use super::currencies::is_known_currency_code;
use super::error::ValidationError;
use super::line_items::LineItemCollection;
use super::types::*;
use super::units::is_common_unit;
use crate::settings::EngineConfig;

/// Validate a document before it is handed to the store.
/// Returns all validation errors found (not just the first).
pub fn validate_document(
    kind: DocumentKind,
    number: &str,
    header: &DocumentHeader,
    items: &LineItemCollection,
    config: &EngineConfig,
) -> Vec<ValidationError> {
    let descriptor = kind.descriptor();
    let mut errors = Vec::new();

    if number.trim().is_empty() {
        errors.push(ValidationError::with_code(
            "number",
            "document number must not be empty",
            "required",
        ));
    }

    for field in descriptor.required_fields {
        if header.field(field).is_none() {
            errors.push(ValidationError::with_code(
                format!("header.{field}"),
                format!("{field} is required for a {}", descriptor.label),
                "required",
            ));
        }
    }

    validate_currency(header, config, &mut errors);

    if items.is_empty() {
        errors.push(ValidationError::with_code(
            "items",
            "document must have at least one line item",
            "required",
        ));
    }
    if items.len() > config.max_line_items {
        errors.push(ValidationError::with_code(
            "items",
            format!(
                "document cannot have more than {} line items",
                config.max_line_items
            ),
            "limit",
        ));
    }

    for (i, item) in items.iter().enumerate() {
        validate_line(item, i, descriptor.quantity_rule, &mut errors);
    }

    debug!(kind = %kind, errors = errors.len(), "document validated");
    errors
}

/// Check one row against the kind's quantity rule.
pub fn validate_line(
    item: &LineItem,
    index: usize,
    rule: QuantityRule,
    errors: &mut Vec<ValidationError>,
) {
    let prefix = format!("items[{index}]");

    if item.item_name().trim().is_empty() {
        errors.push(ValidationError::with_code(
            format!("{prefix}.item_name"),
            "item name must not be empty",
            "required",
        ));
    }

    for field in item.unconfirmed_fields() {
        errors.push(ValidationError::with_code(
            format!("{prefix}.{}", field.name()),
            format!("{} is not a valid number", field.name()),
            "unconfirmed",
        ));
    }

    if !rule.accepts(item.quantity()) {
        errors.push(ValidationError::with_code(
            format!("{prefix}.quantity"),
            rule.describe(),
            "range",
        ));
    }

    if item.unit_price() < Decimal::ZERO {
        errors.push(ValidationError::with_code(
            format!("{prefix}.unit_price"),
            "unit price must not be negative",
            "range",
        ));
    }

    if item.gst_rate() < Decimal::ZERO || item.gst_rate() > Decimal::ONE_HUNDRED {
        errors.push(ValidationError::with_code(
            format!("{prefix}.gst_rate"),
            "GST rate must be between 0 and 100",
            "range",
        ));
    }

    if !item.unit().is_empty() && !is_common_unit(item.unit()) {
        debug!(unit = item.unit(), "uncommon unit on line {}", index + 1);
    }
}

fn validate_currency(header: &DocumentHeader, config: &EngineConfig, errors: &mut Vec<ValidationError>) {
    let Some(code) = header.currency_code.as_deref().map(str::trim) else {
        return;
    };
    if code.is_empty() || config.is_home_currency(code) {
        return;
    }
    if !is_known_currency_code(&code.to_ascii_uppercase()) {
        errors.push(ValidationError::with_code(
            "header.currency_code",
            format!("currency code '{code}' is not a known ISO 4217 code"),
            "currency",
        ));
    }
    match header.exchange_rate {
        Some(rate) if rate > Decimal::ZERO => {}
        _ => errors.push(ValidationError::with_code(
            "header.exchange_rate",
            "exchange rate must be greater than zero for a foreign currency",
            "range",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::*;
    use crate::core::line_items::LineField;
    use rust_decimal_macros::dec;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn items(name: &str, qty: Decimal) -> LineItemCollection {
        LineItemCollection::new(LineItemBuilder::new(name, qty, dec!(100)).build())
    }

    #[test]
    fn line_rejects_negative_price_and_rate_above_hundred() {
        let mut item = LineItemBuilder::new("Paint", dec!(2), dec!(50)).build();
        item.unit_price = dec!(-50);
        item.gst_rate = dec!(250);
        let mut errors = Vec::new();
        validate_line(&item, 0, QuantityRule::NonNegative, &mut errors);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["items[0].unit_price", "items[0].gst_rate"]);
        assert!(errors.iter().all(|e| e.code.as_deref() == Some("range")));
    }

    #[test]
    fn valid_order() {
        let header = HeaderBuilder::new().customer("C-1").build();
        let errors = validate_document(
            DocumentKind::Order,
            "ORD-2025-0001",
            &header,
            &items("Cement", dec!(5)),
            &config(),
        );
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn reports_every_problem() {
        let header = HeaderBuilder::new().build();
        let errors = validate_document(
            DocumentKind::PurchaseOrder,
            " ",
            &header,
            &items("", dec!(1)),
            &config(),
        );
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["number", "header.vendor_id", "items[0].item_name"]);
    }

    #[test]
    fn rfq_rejects_zero_quantity_order_accepts_it() {
        let rfq_header = HeaderBuilder::new().title("Steel tender").build();
        let errors = validate_document(
            DocumentKind::Rfq,
            "RFQ-2025-0001",
            &rfq_header,
            &items("Steel", dec!(0)),
            &config(),
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "items[0].quantity");

        let order_header = HeaderBuilder::new().customer("C-1").build();
        let errors = validate_document(
            DocumentKind::Order,
            "ORD-2025-0001",
            &order_header,
            &items("Steel", dec!(0)),
            &config(),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn unconfirmed_input_blocks_submit() {
        let mut rows = items("Cement", dec!(5));
        rows.update_at(0, LineField::parse("unit_price", "12..5").unwrap())
            .unwrap();
        let header = HeaderBuilder::new().customer("C-1").build();
        let errors = validate_document(DocumentKind::Quotation, "QUO-2025-0001", &header, &rows, &config());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code.as_deref(), Some("unconfirmed"));
        assert_eq!(errors[0].field, "items[0].unit_price");
    }

    #[test]
    fn foreign_currency_needs_known_code_and_rate() {
        let header = HeaderBuilder::new()
            .vendor("V-1")
            .currency("XYZ", dec!(0))
            .build();
        let errors = validate_document(
            DocumentKind::PurchaseOrder,
            "PO-2025-0001",
            &header,
            &items("Valve", dec!(1)),
            &config(),
        );
        let codes: Vec<_> = errors.iter().filter_map(|e| e.code.as_deref()).collect();
        assert_eq!(codes, vec!["currency", "range"]);
    }

    #[test]
    fn home_currency_needs_no_rate() {
        let mut header = HeaderBuilder::new().vendor("V-1").build();
        header.currency_code = Some("INR".into());
        let errors = validate_document(
            DocumentKind::PurchaseOrder,
            "PO-2025-0001",
            &header,
            &items("Valve", dec!(1)),
            &config(),
        );
        assert!(errors.is_empty());
    }
}
