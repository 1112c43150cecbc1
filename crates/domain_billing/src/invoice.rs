//! Invoice number formatting
//!
//! Invoice numbers are `INV-` followed by a zero-padded sequence number. The
//! sequence value itself comes from a dedicated database sequence read inside
//! the bill creation transaction, and `bills.invoice_number` carries a unique
//! constraint as a backstop: a collision surfaces as a retryable conflict
//! rather than a silent duplicate. Gaps are expected (sequence values are
//! consumed even when a transaction rolls back); the scheme is monotonic, not
//! number-dense.

/// Invoice number prefix
pub const INVOICE_PREFIX: &str = "INV";

/// Minimum number of digits in the sequence part
const SEQUENCE_WIDTH: usize = 6;

/// Formats a sequence value as an invoice number, e.g. `INV-000042`
///
/// Sequence values past six digits widen the number instead of truncating.
pub fn format_invoice_number(sequence: i64) -> String {
    format!("{}-{:0width$}", INVOICE_PREFIX, sequence, width = SEQUENCE_WIDTH)
}

/// Parses the sequence value out of an invoice number
///
/// Returns `None` for anything that does not match the `INV-NNNNNN` shape.
pub fn parse_invoice_number(number: &str) -> Option<i64> {
    let digits = number.strip_prefix(INVOICE_PREFIX)?.strip_prefix('-')?;
    if digits.len() < SEQUENCE_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
