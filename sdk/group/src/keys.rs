//! Committee Member Keys
//!
//! ```text
//! sk ←$ [1, q)
//! pk  = g^sk mod p
//! ```

use std::fmt;

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::Rng;

use crate::error::GroupError;
use crate::params::GroupParams;

/// A member's secret exponent
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(BigUint);

impl SecretKey {
    /// Sample a secret key uniformly from `[1, q)`
    pub fn random<R: Rng + ?Sized>(params: &GroupParams, rng: &mut R) -> Self {
        Self(rng.gen_biguint_range(&BigUint::one(), params.order()))
    }

    /// Wrap an existing exponent, rejecting values outside `[1, q)`
    pub fn from_biguint(params: &GroupParams, value: BigUint) -> Result<Self, GroupError> {
        if value.is_zero() || &value >= params.order() {
            return Err(GroupError::InvalidArithmeticInput(
                "secret key must lie in [1, q)".into(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Derive the matching public key
    pub fn public_key(&self, params: &GroupParams) -> Result<PublicKey, GroupError> {
        params.power(&self.0).map(PublicKey)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey").finish_non_exhaustive()
    }
}

/// A member's public key, an element of `<g>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey(BigUint);

impl PublicKey {
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }
}

impl From<PublicKey> for BigUint {
    fn from(pk: PublicKey) -> Self {
        pk.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Secret and public key of one committee member
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub secret: SecretKey,
    pub public: PublicKey,
}

impl KeyPair {
    /// Generate a fresh random key pair
    pub fn generate<R: Rng + ?Sized>(params: &GroupParams, rng: &mut R) -> Result<Self, GroupError> {
        Self::from_secret(params, SecretKey::random(params, rng))
    }

    /// Build a key pair from an existing secret
    pub fn from_secret(params: &GroupParams, secret: SecretKey) -> Result<Self, GroupError> {
        let public = secret.public_key(params)?;
        Ok(Self { secret, public })
    }
}

impl GroupParams {
    /// Check that `pk` is the public key belonging to `sk`
    pub fn verify(&self, secret: &SecretKey, public: &PublicKey) -> Result<bool, GroupError> {
        Ok(secret.public_key(self)? == *public)
    }
}
