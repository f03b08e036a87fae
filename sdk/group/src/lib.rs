//! PVSS Group Arithmetic
//!
//! Exact big-integer arithmetic for the finite cyclic group that committee
//! public keys are drawn from.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  GroupParams (p, g, q)                                   │
//! │        │                                                 │
//! │        ▼                                                 │
//! │  SecretKey sk ∈ [1, q) ──mod_exp(g, sk, p)──▶ PublicKey  │
//! │                                                  │       │
//! │                                                  ▼       │
//! │                              submitted to the committee  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod arith;
pub mod error;
pub mod keys;
pub mod params;

pub use arith::{mod_exp, mod_exp_u64, parse_biguint};
pub use error::GroupError;
pub use keys::{KeyPair, PublicKey, SecretKey};
pub use params::GroupParams;

pub use num_bigint::BigUint;
