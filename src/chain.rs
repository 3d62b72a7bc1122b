// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain name resolution and endpoint compatibility checks.
//!
//! The API identifies EVM chains by hex chain id (`0x1`, `0x89`, ...). This module
//! maps the human-readable names callers use onto those ids and checks that a
//! resolved chain is accepted by the endpoint being called.
//!
//! # Example
//!
//! ```rust
//! use web3_query::chain::{resolve_chain, ChainId};
//!
//! assert_eq!(resolve_chain(Some("Polygon")), ChainId::new("0x89"));
//! assert_eq!(resolve_chain(Some("0x2105")), ChainId::new("0x2105"));
//! assert_eq!(resolve_chain(None), ChainId::ethereum());
//! ```

use serde::{Deserialize, Serialize};

use crate::endpoint::EndpointClass;
use crate::errors::ValidationError;

/// Canonical hex id of Ethereum mainnet, the default chain.
pub const ETHEREUM_CHAIN_ID: &str = "0x1";

/// Name to canonical id table.
///
/// Solana aliases map to opaque tags rather than hex ids.
const CHAIN_TABLE: &[(&str, &str)] = &[
    ("eth", "0x1"),
    ("ethereum", "0x1"),
    ("goerli", "0x5"),
    ("sepolia", "0xaa36a7"),
    ("polygon", "0x89"),
    ("mumbai", "0x13881"),
    ("bsc", "0x38"),
    ("bsc_testnet", "0x61"),
    ("avalanche", "0xa86a"),
    ("fuji", "0xa869"),
    ("fantom", "0xfa"),
    ("arbitrum", "0xa4b1"),
    ("arbitrum_testnet", "0x66eee"),
    ("optimism", "0xa"),
    ("optimism_testnet", "0x45"),
    ("base", "0x2105"),
    ("base_testnet", "0x14a34"),
    ("celo", "0xa4ec"),
    ("gnosis", "0x64"),
    ("moonbeam", "0x504"),
    ("moonriver", "0x505"),
    ("cronos", "0x19"),
    ("aurora", "0x4e454152"),
    ("polygon_zkevm", "0x144"),
    ("amoy", "0x13882"),
    ("zkevm", "0x144"),
    ("linea", "0x770e"),
    ("linea_testnet", "0xe708"),
    ("scroll", "0x82750"),
    ("scroll_testnet", "0x8274f"),
    ("blast", "0x81457"),
    ("blast_testnet", "0x24c931"),
    ("manta", "0xa9b4"),
    ("manta_testnet", "0x5e02"),
    ("taiko", "0x50e8"),
    ("taiko_testnet", "0x50e3"),
    ("world", "0x1e12"),
    ("world_testnet", "0x1e14"),
    ("sol", "sol"),
    ("solana", "sol"),
    ("mainnet", "mainnet"),
    ("devnet", "devnet"),
];

/// Chain hints that select the Solana gateway.
pub const SOLANA_ALIASES: &[&str] = &["sol", "solana", "mainnet", "devnet"];

/// Every EVM chain id the data API accepts.
pub const EVM_SUPPORTED_CHAINS: &[&str] = &[
    "0x1",        // Ethereum
    "0x5",        // Goerli
    "0xaa36a7",   // Sepolia
    "0x89",       // Polygon
    "0x13881",    // Mumbai
    "0x38",       // BSC
    "0x61",       // BSC Testnet
    "0xa86a",     // Avalanche
    "0xa869",     // Fuji
    "0xfa",       // Fantom
    "0xa4b1",     // Arbitrum
    "0x66eee",    // Arbitrum Testnet
    "0xa",        // Optimism
    "0x45",       // Optimism Testnet
    "0x2105",     // Base
    "0x14a34",    // Base Testnet
    "0xa4ec",     // Celo
    "0x64",       // Gnosis
    "0x504",      // Moonbeam
    "0x505",      // Moonriver
    "0x19",       // Cronos
    "0x4e454152", // Aurora
    "0x144",      // Polygon zkEVM
    "0x13882",    // Amoy
    "0x770e",     // Linea
    "0xe708",     // Linea Testnet
    "0x82750",    // Scroll
    "0x8274f",    // Scroll Testnet
    "0x81457",    // Blast
    "0x24c931",   // Blast Testnet
    "0xa9b4",     // Manta
    "0x5e02",     // Manta Testnet
    "0x50e8",     // Taiko
    "0x50e3",     // Taiko Testnet
    "0x1e12",     // World
    "0x1e14",     // World Testnet
];

/// Mainnet-only subset, required by wallet history endpoints.
pub const EVM_MAINNET_CHAINS: &[&str] = &[
    "0x1",        // Ethereum
    "0x89",       // Polygon
    "0x38",       // BSC
    "0xa86a",     // Avalanche
    "0xfa",       // Fantom
    "0xa4b1",     // Arbitrum
    "0xa",        // Optimism
    "0x2105",     // Base
    "0xa4ec",     // Celo
    "0x64",       // Gnosis
    "0x504",      // Moonbeam
    "0x505",      // Moonriver
    "0x19",       // Cronos
    "0x4e454152", // Aurora
    "0x144",      // Polygon zkEVM
    "0x770e",     // Linea
    "0x82750",    // Scroll
    "0x81457",    // Blast
    "0xa9b4",     // Manta
    "0x50e8",     // Taiko
    "0x1e12",     // World
];

/// Chains with token price support, required by wallet token endpoints.
pub const EVM_TOKEN_PRICE_CHAINS: &[&str] = &[
    "0x1",    // Ethereum
    "0x89",   // Polygon
    "0x38",   // BSC
    "0xa86a", // Avalanche
    "0xa4b1", // Arbitrum
    "0xa",    // Optimism
    "0x2105", // Base
    "0x64",   // Gnosis
    "0x504",  // Moonbeam
    "0x770e", // Linea
    "0x82750", // Scroll
    "0x81457", // Blast
    "0xa9b4", // Manta
    "0x50e8", // Taiko
    "0x1e12", // World
];

/// Canonical chain identifier: a hex chain id, or an opaque Solana tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    /// Wrap an already-canonical id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Ethereum mainnet (`0x1`).
    pub fn ethereum() -> Self {
        Self(ETHEREUM_CHAIN_ID.to_string())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is a member of `allowed`.
    pub fn is_in(&self, allowed: &[&str]) -> bool {
        allowed.contains(&self.0.as_str())
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChainId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolve a chain name or hex id to its canonical id.
///
/// Lookup is case-insensitive. Unknown values pass through unchanged on the
/// assumption that they are already canonical. Empty or absent input resolves
/// to Ethereum mainnet.
pub fn resolve_chain(name_or_hex: Option<&str>) -> ChainId {
    let Some(input) = name_or_hex.filter(|s| !s.is_empty()) else {
        return ChainId::ethereum();
    };
    let normalized = input.to_lowercase();
    CHAIN_TABLE
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, id)| ChainId::new(*id))
        .unwrap_or_else(|| ChainId::new(input))
}

/// Whether a chain hint names the Solana family.
pub fn is_solana_alias(hint: &str) -> bool {
    let normalized = hint.to_lowercase();
    SOLANA_ALIASES.contains(&normalized.as_str())
}

/// Fail with [`ValidationError::UnsupportedChain`] when `chain` is not in `allowed`.
///
/// `reason` replaces the generated message, which otherwise lists the allowed set.
pub fn assert_chain_supported(
    chain: &ChainId,
    endpoint: &str,
    allowed: &[&str],
    reason: Option<String>,
) -> Result<(), ValidationError> {
    if chain.is_in(allowed) {
        return Ok(());
    }
    Err(ValidationError::UnsupportedChain {
        chain: chain.to_string(),
        endpoint: endpoint.to_string(),
        allowed: allowed.iter().map(|id| id.to_string()).collect(),
        reason,
    })
}

/// Run every chain check that applies to an EVM endpoint of the given class.
///
/// The full supported set is always checked first; history endpoints then
/// require a mainnet chain and token endpoints require token price support.
pub fn validate_evm_chain(
    chain: &ChainId,
    endpoint: &str,
    class: EndpointClass,
) -> Result<(), ValidationError> {
    assert_chain_supported(chain, endpoint, EVM_SUPPORTED_CHAINS, None)?;
    match class {
        EndpointClass::WalletHistory => assert_chain_supported(
            chain,
            endpoint,
            EVM_MAINNET_CHAINS,
            Some(format!("Endpoint {endpoint} only supports mainnet chains.")),
        ),
        EndpointClass::WalletTokens => assert_chain_supported(
            chain,
            endpoint,
            EVM_TOKEN_PRICE_CHAINS,
            Some(format!(
                "Endpoint {endpoint} requires token price support (mainnet-only)."
            )),
        ),
        EndpointClass::General => Ok(()),
    }
}
