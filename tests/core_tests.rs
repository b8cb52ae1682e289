use docket::core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn calc() -> TotalsCalculator {
    TotalsCalculator::new("INR")
}

fn blank() -> LineItem {
    LineItemBuilder::blank(&docket::EngineConfig::default()).build()
}

// --- Editing scenario ---

#[test]
fn order_editing_scenario() {
    let mut items = LineItemCollection::new(blank());
    let totals = calc().compute(&items, None, None);
    assert_eq!(totals.subtotal, dec!(0));
    assert_eq!(totals.tax_total, dec!(0));
    assert_eq!(totals.grand_total, dec!(0));

    items.update_at(0, LineField::Quantity(dec!(10).into())).unwrap();
    let first = items
        .update_at(0, LineField::UnitPrice(dec!(250).into()))
        .unwrap();
    assert_eq!(first.line_subtotal(), dec!(2500));
    assert_eq!(first.line_tax(), dec!(450));
    assert_eq!(calc().compute(&items, None, None).grand_total, dec!(2950));

    let second = items.append(
        LineItemBuilder::new("Freight", dec!(2), dec!(100))
            .gst_rate(dec!(0))
            .build(),
    );
    assert_eq!(second.sr_no(), 2);
    assert_eq!(second.line_subtotal(), dec!(200));
    assert_eq!(second.line_tax(), dec!(0));

    let totals = calc().compute(&items, None, None);
    assert_eq!(totals.subtotal, dec!(2700));
    assert_eq!(totals.tax_total, dec!(450));
    assert_eq!(totals.grand_total, dec!(3150));

    items.remove_at(0).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items.get(0).unwrap().sr_no(), 1);
    let totals = calc().compute(&items, None, None);
    assert_eq!(totals.subtotal, dec!(200));
    assert_eq!(totals.tax_total, dec!(0));
    assert_eq!(totals.grand_total, dec!(200));
}

#[test]
fn form_input_while_typing() {
    let mut items = LineItemCollection::new(blank());
    items.update_at(0, LineField::parse("unit_price", "1,2").unwrap()).unwrap();
    items.update_at(0, LineField::parse("quantity", "").unwrap()).unwrap();

    let row = items.get(0).unwrap();
    assert_eq!(row.unit_price(), dec!(12));
    assert_eq!(row.quantity(), Decimal::ZERO);
    assert!(!row.is_confirmed());
    assert_eq!(calc().compute(&items, None, None).grand_total, Decimal::ZERO);

    items.update_at(0, LineField::parse("quantity", "3").unwrap()).unwrap();
    let row = items.get(0).unwrap();
    assert!(row.is_confirmed());
    assert_eq!(row.line_total(), dec!(42.48));
}

// --- Currency ---

#[test]
fn usd_purchase_order() {
    let items = LineItemCollection::new(
        LineItemBuilder::new("CNC spindle", dec!(1), dec!(8000))
            .gst_rate(dec!(0))
            .build(),
    );
    let totals = calc().compute(&items, Some("USD"), Some(dec!(80)));
    assert_eq!(totals.grand_total, dec!(8000));
    assert_eq!(totals.grand_total_in_currency, Some(dec!(100.00)));
    assert_eq!(totals.exchange_rate, Some(dec!(80)));
}

#[test]
fn conversion_rounds_to_cents() {
    let items = LineItemCollection::new(LineItemBuilder::new("Valve", dec!(1), dec!(1000)).build());
    let totals = calc().compute(&items, Some("EUR"), Some(dec!(89.37)));
    // 1180 / 89.37 = 13.2035...
    assert_eq!(totals.grand_total_in_currency, Some(dec!(13.20)));
}

// --- Validation across kinds ---

#[test]
fn every_kind_requires_its_party_field() {
    let items = LineItemCollection::new(LineItemBuilder::new("Item", dec!(1), dec!(1)).build());
    let cfg = docket::EngineConfig::default();
    for kind in DocumentKind::ALL {
        let number = DocumentNumber::new(kind, 2025, 1).to_string();
        let errors = validate_document(kind, &number, &DocumentHeader::default(), &items, &cfg);
        let expected = format!("header.{}", kind.descriptor().required_fields[0]);
        assert_eq!(errors.len(), 1, "{kind}: {errors:?}");
        assert_eq!(errors[0].field, expected);
    }
}

#[test]
fn row_limit_is_enforced() {
    let cfg = docket::EngineConfig {
        max_line_items: 2,
        ..Default::default()
    };
    let mut items = LineItemCollection::new(LineItemBuilder::new("A", dec!(1), dec!(1)).build());
    items.append(LineItemBuilder::new("B", dec!(1), dec!(1)).build());
    items.append(LineItemBuilder::new("C", dec!(1), dec!(1)).build());
    let header = HeaderBuilder::new().customer("C-1").build();
    let errors = validate_document(DocumentKind::Invoice, "INV-2025-0001", &header, &items, &cfg);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code.as_deref(), Some("limit"));
}

// --- Numbering ---

#[test]
fn number_format_is_bit_exact() {
    for (kind, seq, expected) in [
        (DocumentKind::Order, 7, "ORD-2025-0007"),
        (DocumentKind::Quotation, 42, "QUO-2025-0042"),
        (DocumentKind::PurchaseOrder, 42, "PO-2025-0042"),
        (DocumentKind::Invoice, 9999, "INV-2025-9999"),
        (DocumentKind::Rfq, 12345, "RFQ-2025-12345"),
    ] {
        let n = DocumentNumber::new(kind, 2025, seq);
        assert_eq!(n.to_string(), expected);
        assert_eq!(DocumentNumber::parse(expected).unwrap(), n);
    }
}
