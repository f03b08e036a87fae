//! Modular Arithmetic
//!
//! Exact modular exponentiation over arbitrary-precision integers.
//!
//! ```text
//! mod_exp(b, 0, m) = 1 mod m
//! mod_exp(b, 1, m) = b mod m
//! mod_exp(b, e, m) = mod_exp(b² mod m, e / 2, m) · mod_exp(b, e mod 2, m)  mod m
//! ```
//!
//! Every product is formed at full width before reduction, so the result does
//! not depend on machine word size.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::GroupError;

/// Compute `base^exponent mod modulus` using square-and-multiply.
///
/// # Arguments
/// * `base` - Any non-negative integer (reduced mod `modulus` first)
/// * `exponent` - Any non-negative integer
/// * `modulus` - Must be greater than 1
///
/// # Returns
/// A value in `[0, modulus)`
pub fn mod_exp(
    base: &BigUint,
    exponent: &BigUint,
    modulus: &BigUint,
) -> Result<BigUint, GroupError> {
    if *modulus <= BigUint::one() {
        return Err(GroupError::InvalidArithmeticInput(format!(
            "modulus must be greater than 1, got {}",
            modulus
        )));
    }

    let mut result = BigUint::one();
    let mut square = base % modulus;
    let mut exp = exponent.clone();

    // Walk the exponent from its least significant bit
    while !exp.is_zero() {
        if exp.bit(0) {
            result = (&result * &square) % modulus;
        }
        square = (&square * &square) % modulus;
        exp >>= 1u32;
    }

    Ok(result)
}

/// Convenience wrapper for small operands
pub fn mod_exp_u64(base: u64, exponent: u64, modulus: u64) -> Result<BigUint, GroupError> {
    mod_exp(
        &BigUint::from(base),
        &BigUint::from(exponent),
        &BigUint::from(modulus),
    )
}

/// Parse an integer from decimal or `0x`-prefixed hex
pub fn parse_biguint(literal: &str) -> Result<BigUint, GroupError> {
    let trimmed = literal.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex_digits) => BigUint::parse_bytes(hex_digits.as_bytes(), 16),
        None => BigUint::parse_bytes(trimmed.as_bytes(), 10),
    };
    parsed.ok_or_else(|| GroupError::InvalidInteger(literal.to_string()))
}
