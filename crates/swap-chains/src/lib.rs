//! Chain adapters.
//!
//! Each adapter is a thin shim translating the generic read/send surface of
//! [`swap_types::ChainCapability`] into one node family's RPC calls, and
//! normalizing results into the shared data model before anything above the
//! boundary sees them.

pub mod fees;
pub mod transport;

pub mod implementations {
	pub mod jsonrpc;
}

pub use implementations::jsonrpc::JsonRpcChainProvider;
pub use transport::{HttpTransport, JsonRpcTransport, TransportError};
