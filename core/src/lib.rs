//! PVSS Core
//!
//! Runs the committee key collection phase: members register public keys
//! through [`KeyCollectionService`], and the share distribution layer waits on
//! its completion signal before proceeding.

pub mod service;

pub use service::{CollectionStatus, KeyCollectionService};
