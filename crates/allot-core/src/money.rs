//! # Money Module
//!
//! Provides the `Money` type and the rounding helpers every other module
//! uses when it touches money or quantities.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    2.135 * 100 = 213.49999999999997  ❌ NOT A TIE ANY MORE!             │
//! │                                                                         │
//! │  In a greedy allocator:                                                 │
//! │    credit / price compared as floats drifts after many small lines      │
//! │                                                                         │
//! │  OUR SOLUTION: Round once, then Integer Cents                           │
//! │    round_half_even(x, 2) absorbs representation error (1e-10)           │
//! │    everything after that is i64 cents: floor(50000 / 1000) = 50        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use allot_core::money::{round_half_even, Money};
//!
//! assert_eq!(round_half_even(2.125, 2), 2.12);
//!
//! let credit = Money::from_cents(50_000); // $500.00
//! let price = Money::from_cents(1_000);   // $10.00
//! assert_eq!(credit.units_affordable(price), 50);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Distance from an exact `.5` at the rounding digit that still counts as a tie.
pub const TIE_EPSILON: f64 = 1e-10;

// =============================================================================
// Rounding Helpers
// =============================================================================

/// Rounds `value` to `decimals` places using round-half-to-even.
///
/// ## Bankers Rounding Explained
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────┐
/// │  BANKERS ROUNDING (Round Half to Even)                              │
/// │                                                                     │
/// │  Standard rounding always rounds 0.5 UP, causing systematic bias:  │
/// │    0.5 → 1, 1.5 → 2, 2.5 → 3, 3.5 → 4 (always up = +bias)         │
/// │                                                                     │
/// │  Bankers Rounding rounds 0.5 to nearest EVEN number:               │
/// │    0.5 → 0, 1.5 → 2, 2.5 → 2, 3.5 → 4 (alternates = no bias)      │
/// └─────────────────────────────────────────────────────────────────────┘
/// ```
///
/// A fractional part within [`TIE_EPSILON`] of one half is treated as a tie,
/// so `2.135` (stored as `2.13499999...`) still rounds to `2.14`.
///
/// ## Example
/// ```rust
/// use allot_core::money::round_half_even;
///
/// assert_eq!(round_half_even(2.125, 2), 2.12);
/// assert_eq!(round_half_even(2.135, 2), 2.14);
/// assert_eq!(round_half_even(0.005, 2), 0.0);
/// assert_eq!(round_half_even(1.006, 2), 1.01);
/// ```
pub fn round_half_even(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    let floor = scaled.floor();
    let diff = scaled - floor;

    if diff > 0.5 + TIE_EPSILON {
        return scaled.round() / factor;
    }
    if diff < 0.5 - TIE_EPSILON {
        return floor / factor;
    }

    // Tie: pick the even neighbour
    if floor % 2.0 == 0.0 {
        floor / factor
    } else {
        (floor + 1.0) / factor
    }
}

/// Converts a decimal amount to integer cents (rounded half-to-even first).
///
/// ## Example
/// ```rust
/// use allot_core::money::to_cents;
///
/// assert_eq!(to_cents(10.0), 1000);
/// assert_eq!(to_cents(12.345), 1234);
/// ```
pub fn to_cents(amount: f64) -> i64 {
    (round_half_even(amount, 2) * 100.0).round() as i64
}

/// Converts integer cents back to a 2-decimal amount.
pub fn from_cents(cents: i64) -> f64 {
    round_half_even(cents as f64 / 100.0, 2)
}

/// Truncates a raw quantity toward zero and clamps it to non-negative.
///
/// Operator input can be fractional or garbage; quantities inside the
/// engine are always whole, non-negative units.
///
/// ## Example
/// ```rust
/// use allot_core::money::normalize_quantity;
///
/// assert_eq!(normalize_quantity(12.9), 12);
/// assert_eq!(normalize_quantity(-3.0), 0);
/// assert_eq!(normalize_quantity(f64::NAN), 0);
/// ```
pub fn normalize_quantity(raw: f64) -> i64 {
    if raw.is_nan() || raw <= 0.0 {
        return 0;
    }
    // `as` saturates at i64::MAX for huge or infinite input
    raw.trunc() as i64
}

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate refunds are plain additions; ledgers are
///   clamped to zero at the point of deduction
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  PriceRule.base × multiplier ──► round_half_even ──► unit price (cents) │
/// │                                                          │              │
/// │  CustomerCredit ──► units_affordable(unit price) ◄───────┘              │
/// │        │                                                                │
/// │        └──► -= qty × unit price ──► AllocationLine.amount               │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use allot_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount, rounding half-to-even
    /// to whole cents.
    ///
    /// This is the only door from floating point into `Money`. Scenario
    /// files and price multipliers go through it exactly once.
    ///
    /// ## Example
    /// ```rust
    /// use allot_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(2000.0).cents(), 200_000);
    /// assert_eq!(Money::from_decimal(0.125).cents(), 12);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        Money(to_cents(amount))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value as a 2-decimal amount (for display and export only).
    pub fn to_decimal(&self) -> f64 {
        from_cents(self.0)
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Returns the value, or zero if it is negative.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// Operator quantities can be arbitrarily large; an oversized line
    /// prices at `i64::MAX` cents and fails the credit check.
    ///
    /// ## Example
    /// ```rust
    /// use allot_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1000); // $10.00
    /// let amount = unit_price.multiply_quantity(100);
    /// assert_eq!(amount.cents(), 100_000); // $1000.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Scales money by a rate (e.g. an urgency multiplier) and rounds the
    /// result half-to-even to whole cents.
    ///
    /// ## Example
    /// ```rust
    /// use allot_core::money::Money;
    ///
    /// let base = Money::from_cents(1000); // $10.00
    /// assert_eq!(base.scale(1.25).cents(), 1250);
    ///
    /// // $0.17 × 1.25 = $0.2125 → $0.21
    /// assert_eq!(Money::from_cents(17).scale(1.25).cents(), 21);
    /// ```
    pub fn scale(&self, rate: f64) -> Money {
        Money::from_decimal(self.to_decimal() * rate)
    }

    /// How many whole units at `unit_price` this amount can pay for.
    ///
    /// ## Integer Only
    /// `floor(credit_cents / price_cents)` - no floating comparison, so many
    /// small allocations never drift past the available credit.
    ///
    /// ## Example
    /// ```rust
    /// use allot_core::money::Money;
    ///
    /// let credit = Money::from_cents(50_000);
    /// assert_eq!(credit.units_affordable(Money::from_cents(1_000)), 50);
    /// assert_eq!(credit.units_affordable(Money::from_cents(30_001)), 1);
    /// assert_eq!(credit.units_affordable(Money::zero()), 0);
    /// ```
    pub const fn units_affordable(&self, unit_price: Money) -> i64 {
        if unit_price.0 <= 0 || self.0 <= 0 {
            return 0;
        }
        self.0 / unit_price.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and warnings. The UI formats money itself.
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

/// Default money is zero.
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
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
