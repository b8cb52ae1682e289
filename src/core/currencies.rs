//! Currencies a trading back office invoices or imports in.
//!
//! The home currency (INR by default) never needs an exchange rate; every
//! other entry here does. Codes outside this table fail validation.

/// `(ISO 4217 code, minor units)`, sorted by code.
static TRADING_CURRENCIES: &[(&str, u8)] = &[
    ("AED", 2),
    ("AUD", 2),
    ("BDT", 2),
    ("BHD", 3),
    ("BTN", 2),
    ("CAD", 2),
    ("CHF", 2),
    ("CNY", 2),
    ("EUR", 2),
    ("GBP", 2),
    ("HKD", 2),
    ("IDR", 2),
    ("INR", 2),
    ("JPY", 0),
    ("KES", 2),
    ("KRW", 0),
    ("KWD", 3),
    ("LKR", 2),
    ("MMK", 2),
    ("MUR", 2),
    ("MVR", 2),
    ("MYR", 2),
    ("NPR", 2),
    ("NZD", 2),
    ("OMR", 3),
    ("QAR", 2),
    ("SAR", 2),
    ("SGD", 2),
    ("THB", 2),
    ("TZS", 2),
    ("USD", 2),
    ("VND", 0),
    ("ZAR", 2),
];

fn lookup(code: &str) -> Option<u8> {
    TRADING_CURRENCIES
        .binary_search_by(|(c, _)| (*c).cmp(code))
        .ok()
        .map(|i| TRADING_CURRENCIES[i].1)
}

/// Whether `code` (upper case) is a currency documents may be issued in.
pub fn is_known_currency_code(code: &str) -> bool {
    lookup(code).is_some()
}

/// Decimal places of the currency's minor unit, e.g. 3 for `KWD`.
pub fn minor_units(code: &str) -> Option<u8> {
    lookup(code)
}
