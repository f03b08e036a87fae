//! Group Parameters
//!
//! The finite cyclic group `<g>` of prime order `q` inside `Z_p*` that committee
//! keys live in.

use num_bigint::BigUint;
use num_traits::One;

use crate::arith::{mod_exp, parse_biguint};
use crate::error::GroupError;

/// RFC 3526 1536-bit MODP prime (group 5)
const MODP_1536_PRIME: &str = "0xFFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804F1746C08CA237327FFFFFFFFFFFFFFFF";

/// Generator of the order-q subgroup of the MODP group
const MODP_1536_GENERATOR: u32 = 2;

/// Public group parameters shared by every committee member and verifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupParams {
    modulus: BigUint,
    generator: BigUint,
    order: BigUint,
}

impl GroupParams {
    /// Create validated group parameters
    ///
    /// Requires `p > 2`, `1 < g < p`, `1 < q < p` and `g^q = 1 (mod p)`.
    pub fn new(modulus: BigUint, generator: BigUint, order: BigUint) -> Result<Self, GroupError> {
        let one = BigUint::one();

        if modulus <= BigUint::from(2u32) {
            return Err(GroupError::InvalidGroupParams(format!(
                "modulus too small: {}",
                modulus
            )));
        }
        if generator <= one || generator >= modulus {
            return Err(GroupError::InvalidGroupParams(format!(
                "generator {} outside (1, p)",
                generator
            )));
        }
        if order <= one || order >= modulus {
            return Err(GroupError::InvalidGroupParams(format!(
                "order {} outside (1, p)",
                order
            )));
        }
        if !mod_exp(&generator, &order, &modulus)?.is_one() {
            return Err(GroupError::InvalidGroupParams(
                "generator does not have the stated order".into(),
            ));
        }

        Ok(Self {
            modulus,
            generator,
            order,
        })
    }

    /// Parse parameters from decimal or `0x` hex literals
    pub fn from_literals(modulus: &str, generator: &str, order: &str) -> Result<Self, GroupError> {
        Self::new(
            parse_biguint(modulus)?,
            parse_biguint(generator)?,
            parse_biguint(order)?,
        )
    }

    /// The RFC 3526 1536-bit MODP group with `g = 2` and `q = (p - 1) / 2`
    pub fn modp_1536() -> Self {
        let modulus = parse_biguint(MODP_1536_PRIME).expect("Invalid MODP prime");
        let order = (&modulus - BigUint::one()) >> 1u32;
        Self {
            modulus,
            generator: BigUint::from(MODP_1536_GENERATOR),
            order,
        }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    pub fn order(&self) -> &BigUint {
        &self.order
    }

    /// Size of the modulus in bits
    pub fn bits(&self) -> u64 {
        self.modulus.bits()
    }

    /// Compute `g^exponent mod p`
    pub fn power(&self, exponent: &BigUint) -> Result<BigUint, GroupError> {
        mod_exp(&self.generator, exponent, &self.modulus)
    }
}

impl Default for GroupParams {
    fn default() -> Self {
        Self::modp_1536()
    }
}
