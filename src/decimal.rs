//! Fixed-point amount handling.
//!
//! Ledger amounts arrive as unsigned 256-bit integers scaled by the asset's
//! decimal exponent. They are accumulated exactly as `SignedAmount` (512-bit,
//! so any `U256` and any realistic sum of them fits) and only turned into a
//! `Decimal` when a value is about to be shown.

use std::str::FromStr;

use alloy::primitives::aliases::I512;
use alloy::primitives::{U256, U512};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

/// Fraction digits kept when a scaled integer is rendered.
pub const MAX_FRACTION_DIGITS: usize = 6;

/// Fraction digits of every value handed to the presentation layer.
pub const DISPLAY_DIGITS: u32 = 2;

/// Signed accumulator for scaled ledger amounts
pub type SignedAmount = I512;

/// Parse a raw ledger amount. Anything that is not a plain run of ASCII
/// digits fitting in 256 bits counts as zero.
pub fn parse_amount(raw: &str) -> U256 {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return U256::ZERO;
    }
    U256::from_str_radix(raw, 10).unwrap_or(U256::ZERO)
}

/// Signed effect of one transfer on `observed`.
///
/// The outgoing and incoming sides are independent contributions, so a
/// transfer from the account to itself nets to zero.
pub fn signed_delta(amount: U256, from: &str, to: &str, observed: &str) -> SignedAmount {
    let magnitude = widen(amount);

    let mut delta = SignedAmount::ZERO;
    if from.eq_ignore_ascii_case(observed) {
        delta -= magnitude;
    }
    if to.eq_ignore_ascii_case(observed) {
        delta += magnitude;
    }
    delta
}

/// Lossless: a `U256` is always below 2^511.
pub fn widen(amount: U256) -> SignedAmount {
    SignedAmount::from_raw(U512::from(amount))
}

/// Place the implicit decimal point `decimals` digits from the right.
///
/// The whole-number part is rendered from the exact integer; the fraction is
/// truncated toward zero to `MAX_FRACTION_DIGITS`.
pub fn to_decimal(value: SignedAmount, decimals: i32) -> Decimal {
    let digits = value.unsigned_abs().to_string();
    let sign = if value.is_negative() { "-" } else { "" };

    let text = if decimals <= 0 {
        format!("{sign}{digits}")
    } else {
        let decimals = decimals as usize;
        if decimals >= digits.len() + MAX_FRACTION_DIGITS {
            // every kept fraction digit is a leading zero
            return Decimal::ZERO;
        }
        let padded = format!("{digits:0>width$}", width = decimals + 1);
        let (whole, fraction) = padded.split_at(padded.len() - decimals);
        let kept = &fraction[..decimals.min(MAX_FRACTION_DIGITS)];
        format!("{sign}{whole}.{kept}")
    };

    match Decimal::from_str(&text) {
        Ok(d) if d.is_zero() => Decimal::ZERO,
        Ok(d) => d,
        Err(e) => {
            warn!("Amount {} out of decimal range ({}), saturating", text, e);
            if value.is_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            }
        }
    }
}

/// Render an unsigned balance.
pub fn format_units(amount: U256, decimals: i32) -> Decimal {
    to_decimal(widen(amount), decimals)
}

/// Display rounding: exactly two fraction digits, halves away from zero.
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(DISPLAY_DIGITS, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DISPLAY_DIGITS);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn int(s: &str) -> SignedAmount {
        SignedAmount::from_dec_str(s).unwrap()
    }

    #[test]
    fn parses_plain_digits() {
        assert_eq!(parse_amount("0"), U256::ZERO);
        assert_eq!(parse_amount("1000000000000000000"), U256::from(10u64.pow(18)));
        assert_eq!(parse_amount("007"), U256::from(7u64));
    }

    #[test]
    fn malformed_amounts_are_zero() {
        for raw in ["", " 1", "1.5", "-3", "0x10", "Max rate limit reached", "1e18"] {
            assert_eq!(parse_amount(raw), U256::ZERO, "{raw:?}");
        }
        // 2^256 does not fit
        let too_big =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert_eq!(parse_amount(too_big), U256::ZERO);
    }

    #[test]
    fn delta_direction() {
        let amount = U256::from(5u64);
        assert_eq!(signed_delta(amount, "0xaa", "0xBB", "0xbb"), int("5"));
        assert_eq!(signed_delta(amount, "0xAA", "0xbb", "0xaA"), int("-5"));
        assert_eq!(signed_delta(amount, "0xAA", "0xBB", "0xcc"), SignedAmount::ZERO);
    }

    #[test]
    fn self_transfer_cancels() {
        let amount = U256::MAX;
        assert_eq!(signed_delta(amount, "0xAb", "0xaB", "0xAB"), SignedAmount::ZERO);
    }

    #[test]
    fn full_width_amounts_are_not_clamped() {
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        assert_eq!(signed_delta(U256::MAX, "0xaa", "0xbb", "0xbb"), int(max));
        assert_eq!(signed_delta(U256::MAX, "0xbb", "0xaa", "0xbb"), -int(max));
        // 2^255 is past the signed 256-bit range
        let half = U256::from(1u64) << 255;
        assert_eq!(widen(half).unsigned_abs(), U512::from(half));
    }

    #[test]
    fn scales_by_decimals() {
        assert_eq!(to_decimal(int("1000000000000000000"), 18), dec!(1));
        assert_eq!(to_decimal(int("1500000"), 6), dec!(1.5));
        assert_eq!(to_decimal(int("-2500000000000000000"), 18), dec!(-2.5));
        assert_eq!(to_decimal(int("5"), 3), dec!(0.005));
    }

    #[test]
    fn fraction_is_truncated_to_six_digits() {
        assert_eq!(to_decimal(int("1234567891"), 9), dec!(1.234567));
        assert_eq!(to_decimal(int("-1234567891"), 9), dec!(-1.234567));
        // below the kept precision
        assert_eq!(to_decimal(int("-1"), 18), Decimal::ZERO);
        assert!(!to_decimal(int("-1"), 18).is_sign_negative());
    }

    #[test]
    fn non_positive_decimals_keep_integer() {
        assert_eq!(to_decimal(int("42"), 0), dec!(42));
        assert_eq!(to_decimal(int("42"), -3), dec!(42));
        assert_eq!(round2(to_decimal(int("42"), 0)).to_string(), "42.00");
    }

    #[test]
    fn whole_part_is_exact_beyond_f64() {
        // 2^53 + 1 is not representable as f64
        assert_eq!(
            to_decimal(int("9007199254740993"), 0).to_string(),
            "9007199254740993"
        );
        assert_eq!(
            to_decimal(int("9007199254740993000000000000000000"), 18).to_string(),
            "9007199254740993.000000"
        );
    }

    #[test]
    fn saturates_past_decimal_range() {
        assert_eq!(to_decimal(widen(U256::MAX), 0), Decimal::MAX);
        assert_eq!(to_decimal(-widen(U256::MAX), 0), Decimal::MIN);
    }

    #[test]
    fn format_units_renders_balances() {
        assert_eq!(format_units(U256::from(123_456_789u64), 6), dec!(123.456789));
        assert_eq!(format_units(U256::ZERO, 18), Decimal::ZERO);
    }

    #[test]
    fn rounds_for_display() {
        assert_eq!(round2(dec!(1.005)).to_string(), "1.01");
        assert_eq!(round2(dec!(-1.005)).to_string(), "-1.01");
        assert_eq!(round2(dec!(1.004999)).to_string(), "1.00");
        assert_eq!(round2(dec!(3)).to_string(), "3.00");
    }
}
