use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use super::types::{DocumentTotals, LineItem};

/// Round to 2 decimal places, half away from zero (commercial rounding).
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Reduces line items into document totals.
///
/// Every line is rounded on its own (see [`LineItem::recompute`]); the totals
/// are sums of those rounded amounts. The same policy holds for every
/// document kind.
#[derive(Debug, Clone)]
pub struct TotalsCalculator {
    home_currency: String,
}

impl TotalsCalculator {
    pub fn new(home_currency: impl Into<String>) -> Self {
        Self {
            home_currency: home_currency.into(),
        }
    }

    pub fn home_currency(&self) -> &str {
        &self.home_currency
    }

    /// Compute totals in the home currency, plus the grand total converted into
    /// `currency_code` when it names a foreign currency.
    ///
    /// A missing, zero or negative `exchange_rate` is treated as 1.
    pub fn compute<'a, I>(
        &self,
        items: I,
        currency_code: Option<&str>,
        exchange_rate: Option<Decimal>,
    ) -> DocumentTotals
    where
        I: IntoIterator<Item = &'a LineItem>,
    {
        let (subtotal, tax) = items
            .into_iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(s, t), item| {
                (
                    s.saturating_add(item.line_subtotal),
                    t.saturating_add(item.line_tax),
                )
            });

        // Sums past Decimal::MAX saturate; validation caps the row count.
        let subtotal = round2(subtotal);
        let tax_total = round2(tax);
        let grand_total = round2(subtotal.saturating_add(tax_total));
        if grand_total == Decimal::MAX {
            warn!("document totals saturated at the Decimal maximum");
        }

        let mut totals = DocumentTotals {
            subtotal,
            tax_total,
            grand_total,
            ..DocumentTotals::default()
        };

        let foreign = currency_code
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(&self.home_currency));
        if let Some(code) = foreign {
            let rate = effective_rate(exchange_rate);
            totals.currency_code = Some(code.to_ascii_uppercase());
            totals.exchange_rate = Some(rate);
            let converted = grand_total.checked_div(rate).unwrap_or(Decimal::MAX);
            totals.grand_total_in_currency = Some(round2(converted));
        }

        debug!(
            subtotal = %totals.subtotal,
            tax_total = %totals.tax_total,
            grand_total = %totals.grand_total,
            "totals computed"
        );
        totals
    }
}

fn effective_rate(rate: Option<Decimal>) -> Decimal {
    match rate {
        Some(r) if r > Decimal::ZERO => r,
        _ => Decimal::ONE,
    }
}
