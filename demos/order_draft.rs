use std::sync::Arc;

use docket::core::*;
use docket::draft::*;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), DocketError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = docket::EngineConfig::load(None)?;
    let store = Arc::new(MemoryStore::new());
    let invoker = Arc::new(RecordingInvoker::new());
    let ctx = DraftContext::new(TenantContext::new("branch-pune").with_user("u-1", "sales"), store.clone())
        .with_config(config)
        .with_invoker(invoker.clone());

    // ── 1. New order, edited like a form ──────────────────────────────
    println!("=== Order ===");
    let mut order = DocumentDraft::new(ctx.clone(), DocumentKind::Order, 2025).await?;
    order.set_field("customer_id", "CUST-0042")?;
    order.update_item_field(0, "item_name", "Cement bag 50kg")?;
    order.update_item_field(0, "quantity", "10")?;
    order.update_item_field(0, "unit_price", "250")?;
    order.append_item(
        LineItemBuilder::new("Delivery", dec!(2), dec!(100))
            .unit("Trip")
            .gst_rate(dec!(0))
            .build(),
    )?;

    for item in order.items() {
        println!(
            "  {:>2}. {:<20} {:>6} x {:>8} @ {:>3}% = {:>10}",
            item.sr_no(),
            item.item_name(),
            item.quantity(),
            item.unit_price(),
            item.gst_rate(),
            item.line_total()
        );
    }
    let totals = order.totals();
    println!("  Subtotal:    {}", totals.subtotal);
    println!("  GST:         {}", totals.tax_total);
    println!("  Grand total: {}", totals.grand_total);

    let saved = order.submit().await?;
    println!("  Saved {} as {}", saved.number, saved.id);

    // ── 2. A second order continues the sequence ──────────────────────
    let next = DocumentDraft::new(ctx.clone(), DocumentKind::Order, 2025).await?;
    println!("  Next number: {}", next.number());

    // ── 3. Rejected submit ────────────────────────────────────────────
    println!("\n=== Validation ===");
    let mut empty = DocumentDraft::new(ctx.clone(), DocumentKind::Invoice, 2025).await?;
    if let Err(err) = empty.submit().await {
        for e in err.validation_errors() {
            println!("  {e}");
        }
    }

    // ── 4. Foreign-currency purchase order ────────────────────────────
    println!("\n=== Purchase Order (USD) ===");
    let mut po = DocumentDraft::new(ctx.clone(), DocumentKind::PurchaseOrder, 2025).await?;
    po.set_field("vendor_id", "VEN-7")?;
    po.update_item_field(0, "item_name", "CNC spindle")?;
    po.update_item_field(0, "unit_price", "8,000")?;
    po.update_item_field(0, "gst_rate", "0")?;
    po.edit_header(|h| {
        h.currency_code = Some("USD".into());
        h.exchange_rate = Some(dec!(80));
    })?;
    println!(
        "  {} INR = {} USD",
        po.totals().grand_total,
        po.totals().grand_total_in_currency.unwrap_or_default()
    );
    po.submit().await?;

    // ── 5. RFQ with vendor notification ───────────────────────────────
    println!("\n=== RFQ ===");
    let mut rfq = DocumentDraft::new(ctx, DocumentKind::Rfq, 2025).await?;
    rfq.set_field("title", "TMT bars for site B")?;
    rfq.update_item_field(0, "item_name", "TMT bar 12mm")?;
    rfq.update_item_field(0, "quantity", "500")?;
    rfq.update_item_field(0, "unit", "Kg")?;
    let outcome = rfq.submit().await?;
    println!("  Saved {} ({} warnings)", outcome.number, outcome.warnings.len());
    for (name, _) in invoker.calls().await {
        println!("  Invoked {name}");
    }

    println!("\n{} documents stored", store.len().await);
    Ok(())
}
