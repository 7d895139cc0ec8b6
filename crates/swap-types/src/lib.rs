//! Shared data model and capability traits for the swap client.
//!
//! Everything above the chain-adapter boundary works exclusively with the
//! types defined here; adapters normalize their chain's native shapes into
//! this model before anything else sees them.

pub mod chain;
pub mod common;
pub mod errors;
pub mod fees;
pub mod swap;
pub mod transaction;
pub mod wallet;

pub use chain::*;
pub use common::*;
pub use errors::*;
pub use fees::*;
pub use swap::*;
pub use transaction::*;
pub use wallet::*;
