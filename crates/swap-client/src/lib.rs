//! Provider stack and client façade.
//!
//! The stack is the indirection that keeps the swap engine chain-agnostic:
//! callers and providers alike resolve capabilities through it rather than
//! depending on concrete adapter types.

pub mod client;
pub mod stack;

pub use client::Client;
pub use stack::{Provider, ProviderStack, ProviderStackBuilder, StackAnchor};
