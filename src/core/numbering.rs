use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::error::DocketError;
use super::types::DocumentKind;

static NUMBER_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(ORD|QUO|PO|INV|RFQ)-(\d{4})-(\d{4,})$").expect("document number regex")
});

static TRAILING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)$").expect("trailing digits regex"));

/// Default zero-padding width of the sequence part.
pub const DEFAULT_SEQUENCE_WIDTH: usize = 4;

/// A human-readable document number, `{PREFIX}-{year}-{sequence}`.
///
/// The sequence is zero-padded to at least four digits ("ORD-2025-0007") and
/// grows unpadded past 9999 ("ORD-2025-10000").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentNumber {
    kind: DocumentKind,
    year: i32,
    sequence: u64,
    width: usize,
}

impl DocumentNumber {
    pub fn new(kind: DocumentKind, year: i32, sequence: u64) -> Self {
        Self {
            kind,
            year,
            sequence,
            width: DEFAULT_SEQUENCE_WIDTH,
        }
    }

    /// Set zero-padding width (default: 4, so "0001").
    pub fn with_padding(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Parse a number in the canonical format.
    pub fn parse(raw: &str) -> Result<Self, DocketError> {
        let caps = NUMBER_FORMAT
            .captures(raw.trim())
            .ok_or_else(|| DocketError::InvalidNumber(raw.to_string()))?;
        let kind = DocumentKind::from_prefix(&caps[1])
            .ok_or_else(|| DocketError::InvalidNumber(raw.to_string()))?;
        let year = caps[2]
            .parse()
            .map_err(|_| DocketError::InvalidNumber(raw.to_string()))?;
        let sequence = caps[3]
            .parse()
            .map_err(|_| DocketError::InvalidNumber(raw.to_string()))?;
        Ok(Self::new(kind, year, sequence))
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The following number in the same kind and year.
    pub fn next(&self) -> Self {
        Self {
            sequence: self.sequence.saturating_add(1),
            ..*self
        }
    }

    /// `{PREFIX}-{year}-`: every number of this kind and year starts with it.
    pub fn scope_prefix(kind: DocumentKind, year: i32) -> String {
        format!("{}-{}-", kind.prefix(), year)
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:0>width$}",
            self.kind.prefix(),
            self.year,
            self.sequence,
            width = self.width
        )
    }
}

impl FromStr for DocumentNumber {
    type Err = DocketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The trailing run of digits of any stored number, including legacy ones
/// like "SO/17". `None` if there are no trailing digits or they overflow.
pub fn trailing_sequence(number: &str) -> Option<u64> {
    TRAILING_DIGITS
        .captures(number.trim())
        .and_then(|caps| caps[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_padding() {
        let n = DocumentNumber::new(DocumentKind::Order, 2025, 7);
        assert_eq!(n.to_string(), "ORD-2025-0007");
        assert_eq!(n.next().to_string(), "ORD-2025-0008");
    }

    #[test]
    fn grows_past_four_digits() {
        let n = DocumentNumber::new(DocumentKind::PurchaseOrder, 2025, 9999);
        assert_eq!(n.next().to_string(), "PO-2025-10000");
    }

    #[test]
    fn custom_padding() {
        let n = DocumentNumber::new(DocumentKind::Invoice, 2024, 42).with_padding(6);
        assert_eq!(n.to_string(), "INV-2024-000042");
    }

    #[test]
    fn parses_canonical_numbers() {
        let n: DocumentNumber = "RFQ-2025-0042".parse().unwrap();
        assert_eq!(n.kind(), DocumentKind::Rfq);
        assert_eq!(n.year(), 2025);
        assert_eq!(n.sequence(), 42);
        assert_eq!(DocumentNumber::parse("QUO-2025-12345").unwrap().sequence(), 12345);
    }

    #[test]
    fn rejects_malformed_numbers() {
        for bad in ["ORD-2025-007", "SO-2025-0001", "ORD-25-0001", "ORD-2025-0001x", ""] {
            assert!(
                matches!(DocumentNumber::parse(bad), Err(DocketError::InvalidNumber(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn trailing_digits() {
        assert_eq!(trailing_sequence("ORD-2025-0009"), Some(9));
        assert_eq!(trailing_sequence("SO/17"), Some(17));
        assert_eq!(trailing_sequence("LEGACY"), None);
        assert_eq!(trailing_sequence("ORD-2025-99999999999999999999999"), None);
    }

    #[test]
    fn scope_prefix() {
        assert_eq!(DocumentNumber::scope_prefix(DocumentKind::Quotation, 2025), "QUO-2025-");
    }
}
