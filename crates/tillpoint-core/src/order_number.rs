//! # Order Numbers
//!
//! Human-readable, tenant-scoped sale identifiers.
//!
//! ## Format
//! ```text
//! prefix + zero_pad(n, 6)
//!
//!   { current_number: 41, prefix: "A-" }  ──► next is "A-000042"
//!   { current_number: 0,  prefix: ""   }  ──► next is "000001"
//!   n = 1_234_567                         ──► "1234567" (never truncated)
//! ```
//!
//! The six-digit width is parsed by other systems. Do not change it.
//!
//! Issuing numbers is the ledger's job (one atomic statement). This module
//! only formats them.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::OrderSequence;

/// Minimum digit count of the numeric part.
pub const ORDER_NUMBER_WIDTH: usize = 6;

/// A formatted order number, e.g. `A-000042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Formats an issued number with its prefix.
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::order_number::OrderNumber;
    ///
    /// assert_eq!(OrderNumber::format("A-", 42).as_str(), "A-000042");
    /// assert_eq!(OrderNumber::format("", 7).as_str(), "000007");
    /// ```
    pub fn format(prefix: &str, number: i64) -> Self {
        OrderNumber(format!(
            "{}{:0width$}",
            prefix,
            number,
            width = ORDER_NUMBER_WIDTH
        ))
    }

    /// Wraps an already formatted number read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        OrderNumber(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl OrderSequence {
    /// The number the next reservation will issue. Preview only.
    pub fn next_order_number(&self) -> OrderNumber {
        OrderNumber::format(&self.prefix, self.current_number + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sequence(current_number: i64, prefix: &str) -> OrderSequence {
        OrderSequence {
            business_id: "biz-1".to_string(),
            current_number,
            prefix: prefix.to_string(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_next_after_41_with_prefix() {
        assert_eq!(sequence(41, "A-").next_order_number().as_str(), "A-000042");
    }

    #[test]
    fn test_fresh_sequence_without_prefix() {
        assert_eq!(sequence(0, "").next_order_number().as_str(), "000001");
    }

    #[test]
    fn test_width_is_exactly_six_below_a_million() {
        for n in [1, 9, 10, 99_999, 100_000, 999_999] {
            assert_eq!(OrderNumber::format("", n).as_str().len(), ORDER_NUMBER_WIDTH);
        }
    }

    #[test]
    fn test_wide_numbers_are_not_truncated() {
        assert_eq!(OrderNumber::format("B", 1_234_567).as_str(), "B1234567");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&OrderNumber::format("A-", 42)).unwrap();
        assert_eq!(json, "\"A-000042\"");
    }
}
