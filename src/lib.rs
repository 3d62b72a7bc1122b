//! Query client for the Moralis Web3 data APIs.
//!
//! [`Web3Client`] resolves chains, detects EVM or Solana addresses, builds the
//! request and executes it with a per-attempt deadline and exponential-backoff
//! retry. On top of single queries it offers cursor pagination
//! ([`Web3Client::paginate`]), windowed batching ([`Web3Client::batch_query`]),
//! token search and Streams API calls. Request counters are available through
//! [`Web3Client::metrics`].

mod batch;
pub mod bootstrap;
pub mod chain;
mod client;
pub mod config;
pub mod credentials;
pub mod date_block;
pub mod detect;
mod endpoint;
pub mod errors;
mod metrics;
mod paginate;
mod response;
mod search;
mod streams;
mod tracing;
pub mod transport;

pub use batch::*;
pub use chain::ChainId;
pub use client::*;
pub use config::{ClientConfig, ClientConfigBuilder, RateLimit};
pub use credentials::{ApiKey, CredentialProvider, EnvFileCredentials, StaticCredentials};
pub use detect::{BlockchainContext, DetectionHints};
pub use endpoint::*;
pub use errors::{
    ApiError, CredentialsError, QueryError, TimeoutError, TransportError, TransportErrorKind,
    ValidationError,
};
pub use metrics::*;
pub use response::*;
pub use search::*;
