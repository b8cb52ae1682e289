#![no_main]

use docket::{LineField, LineItemBuilder, LineItemCollection};
use libfuzzer_sys::fuzz_target;
use rust_decimal::Decimal;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let mut items = LineItemCollection::new(LineItemBuilder::new("Item", Decimal::ONE, Decimal::ONE).build());
    for name in ["quantity", "unit_price", "gst_rate"] {
        if let Some(field) = LineField::parse(name, s) {
            let item = items.update_at(0, field).unwrap();
            assert!(item.line_subtotal() >= Decimal::ZERO);
            assert!(item.gst_rate() <= Decimal::ONE_HUNDRED);
        }
    }
});
