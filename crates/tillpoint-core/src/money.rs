//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │    Math.round(1.005 * 100) / 100 = 1  (should be 1.01)                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "1.005" is parsed digit by digit → 101 cents (half-up)               │
//! │    Every comparison against the cart total is exact                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operator Input
//! Amounts typed into the tender screen go through two steps:
//!
//! ```text
//! keystrokes ──► sanitize_amount_input() ──► "25.5"  (kept in the input box)
//!                                               │
//!                                               ▼
//!                              Money::parse_amount() ──► Money(2550)
//! ```
//!
//! ## Usage
//! ```rust
//! use tillpoint_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let doubled = price * 2;             // $21.98
//! assert_eq!(doubled.cents(), 2198);
//!
//! let received = Money::parse_amount("30");
//! assert_eq!(received.cents(), 3000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: change and differences can go negative before clamping
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  CatalogProduct.price ──► CartLine.unit_price ──► CartLine.line_total  │
/// │                                                                         │
/// │  Cart.total() ──► PaymentPlan (received / split amounts) ──► change    │
/// │                                                                         │
/// │  SaleDraft.subtotal / total ──► SaleRecord ──► ledger (cents columns)  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Arithmetic saturates at the `i64` bounds instead of panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::money::Money;
    ///
    /// let price = Money::from_major_minor(10, 99);
    /// assert_eq!(price.cents(), 1099);
    ///
    /// let negative = Money::from_major_minor(-5, 50);
    /// assert_eq!(negative.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Parses an operator-entered amount into cents.
    ///
    /// ## Rules
    /// - `,` is accepted as the decimal separator
    /// - Parsing stops at the first character that cannot continue a number
    ///   (`"12.5abc"` reads as `12.50`)
    /// - Digits past the second decimal are rounded half-up
    /// - Empty or unreadable input is zero; this never fails
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::money::Money;
    ///
    /// assert_eq!(Money::parse_amount("25.5").cents(), 2550);
    /// assert_eq!(Money::parse_amount("1,005").cents(), 101);
    /// assert_eq!(Money::parse_amount("").cents(), 0);
    /// ```
    pub fn parse_amount(input: &str) -> Money {
        let normalized = input.trim().replace(',', ".");
        let (negative, body) = match normalized.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, normalized.strip_prefix('+').unwrap_or(&normalized)),
        };

        let mut whole: i64 = 0;
        let mut fraction: i64 = 0;
        let mut fraction_digits = 0usize;
        let mut round_up = false;
        let mut seen_digit = false;
        let mut in_fraction = false;

        for c in body.chars() {
            match c {
                '.' if !in_fraction => in_fraction = true,
                '0'..='9' => {
                    let digit = i64::from(c as u8 - b'0');
                    seen_digit = true;
                    if !in_fraction {
                        whole = match whole.checked_mul(10).and_then(|w| w.checked_add(digit)) {
                            Some(w) => w,
                            // Absurdly large input is treated like unreadable input
                            None => return Money::zero(),
                        };
                    } else if fraction_digits < 2 {
                        fraction = fraction * 10 + digit;
                        fraction_digits += 1;
                    } else if fraction_digits == 2 {
                        round_up = digit >= 5;
                        fraction_digits += 1;
                    }
                }
                _ => break,
            }
        }

        if !seen_digit {
            return Money::zero();
        }

        // "12.5" has one fraction digit: scale it to cents
        if fraction_digits == 1 {
            fraction *= 10;
        }

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .and_then(|c| c.checked_add(i64::from(round_up)));

        match cents {
            Some(c) if negative => Money(-c),
            Some(c) => Money(c),
            None => Money::zero(),
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).dollars(), 10);
    /// assert_eq!(Money::from_cents(-550).dollars(), -5);
    /// ```
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Subtracts `other`, flooring the result at zero.
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::money::Money;
    ///
    /// let change = Money::from_cents(3000).saturating_sub_to_zero(Money::from_cents(2550));
    /// assert_eq!(change.cents(), 450);
    ///
    /// let short = Money::from_cents(2000).saturating_sub_to_zero(Money::from_cents(2550));
    /// assert!(short.is_zero());
    /// ```
    #[inline]
    pub fn saturating_sub_to_zero(self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Renders the amount as a plain decimal string (`"25.50"`).
    ///
    /// Used to prefill the "received" box with the exact total.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

// =============================================================================
// Input Sanitizing
// =============================================================================

/// Restricts raw keystrokes to an amount with at most two decimals.
///
/// ## Rules
/// - Only ASCII digits and `.` survive
/// - Everything after a second `.` is dropped
/// - The fraction is cut (not rounded) to two digits
/// - A trailing `.` is kept so the operator can keep typing
///
/// ## Example
/// ```rust
/// use tillpoint_core::money::sanitize_amount_input;
///
/// assert_eq!(sanitize_amount_input("$12.345"), "12.34");
/// assert_eq!(sanitize_amount_input("1a2"), "12");
/// assert_eq!(sanitize_amount_input("5."), "5.");
/// assert_eq!(sanitize_amount_input("1.2.3"), "1.2");
/// ```
pub fn sanitize_amount_input(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut parts = kept.split('.');
    let integer_part = parts.next().unwrap_or_default();

    match parts.next() {
        None => integer_part.to_string(),
        Some(decimals) => {
            let decimals: String = decimals.chars().take(2).collect();
            format!("{}.{}", integer_part, decimals)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and receipts. Localized formatting belongs to the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let big = Money::from_cents(i64::MAX / 10);

        assert_eq!(big.multiply_quantity(i64::MAX).cents(), i64::MAX);
        assert_eq!((big * 20).cents(), i64::MAX);
        assert_eq!((big + Money::from_cents(i64::MAX)).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - big).cents(), i64::MIN);

        let mut acc = Money::from_cents(i64::MAX - 1);
        acc += Money::from_cents(10);
        assert_eq!(acc.cents(), i64::MAX);

        let total: Money = [big, big, big, big, big, big, big, big, big, big, big]
            .iter()
            .sum();
        assert_eq!(total.cents(), i64::MAX);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_cents(1500), Money::from_cents(1050)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.cents(), 2550);

        let empty: Vec<Money> = Vec::new();
        assert!(empty.into_iter().sum::<Money>().is_zero());
    }

    #[test]
    fn test_parse_amount_plain() {
        assert_eq!(Money::parse_amount("30").cents(), 3000);
        assert_eq!(Money::parse_amount("30.00").cents(), 3000);
        assert_eq!(Money::parse_amount("25.5").cents(), 2550);
        assert_eq!(Money::parse_amount(".5").cents(), 50);
        assert_eq!(Money::parse_amount("5.").cents(), 500);
        assert_eq!(Money::parse_amount("  10.50 ").cents(), 1050);
    }

    #[test]
    fn test_parse_amount_rounds_half_up() {
        assert_eq!(Money::parse_amount("1.005").cents(), 101);
        assert_eq!(Money::parse_amount("1.004").cents(), 100);
        assert_eq!(Money::parse_amount("1.0049").cents(), 100);
        assert_eq!(Money::parse_amount("0.995").cents(), 100);
        assert_eq!(Money::parse_amount("2.675").cents(), 268);
    }

    #[test]
    fn test_parse_amount_comma_separator() {
        assert_eq!(Money::parse_amount("12,34").cents(), 1234);
    }

    #[test]
    fn test_parse_amount_garbage_is_zero() {
        assert!(Money::parse_amount("").is_zero());
        assert!(Money::parse_amount("abc").is_zero());
        assert!(Money::parse_amount(".").is_zero());
        assert!(Money::parse_amount("99999999999999999999999").is_zero());
        assert_eq!(Money::parse_amount("12.5abc").cents(), 1250);
    }

    #[test]
    fn test_parse_amount_negative() {
        assert_eq!(Money::parse_amount("-3").cents(), -300);
    }

    #[test]
    fn test_sanitize_amount_input() {
        assert_eq!(sanitize_amount_input("25.50"), "25.50");
        assert_eq!(sanitize_amount_input("$12.345"), "12.34");
        assert_eq!(sanitize_amount_input("1a2"), "12");
        assert_eq!(sanitize_amount_input("5."), "5.");
        assert_eq!(sanitize_amount_input(".75"), ".75");
        assert_eq!(sanitize_amount_input("1.2.3"), "1.2");
        assert_eq!(sanitize_amount_input("-4"), "4");
        assert_eq!(sanitize_amount_input(""), "");
    }

    #[test]
    fn test_saturating_sub_to_zero() {
        let total = Money::from_cents(2550);
        assert_eq!(Money::from_cents(3000).saturating_sub_to_zero(total).cents(), 450);
        assert!(Money::from_cents(100).saturating_sub_to_zero(total).is_zero());
    }

    #[test]
    fn test_to_decimal_string() {
        assert_eq!(Money::from_cents(2550).to_decimal_string(), "25.50");
        assert_eq!(Money::from_cents(7).to_decimal_string(), "0.07");
        assert_eq!(Money::from_cents(-550).to_decimal_string(), "-5.50");
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    }
}
