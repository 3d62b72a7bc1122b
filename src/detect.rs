// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Blockchain family detection from address format and caller hints.
//!
//! Classification order:
//!
//! 1. A non-empty address without the `0x` prefix and at least 32 characters long
//!    is Solana-family and must be Base58.
//! 2. A `0x`-prefixed address of exactly 42 characters is EVM and must be
//!    `0x` followed by 40 hex digits.
//! 3. Otherwise a chain hint decides: Solana aliases select Solana, anything
//!    else resolves as an EVM chain.
//! 4. With no usable input at all, Ethereum mainnet.

use std::str::FromStr;

use alloy_primitives::Address;

use crate::chain::{is_solana_alias, resolve_chain, ChainId};
use crate::errors::ValidationError;

/// Prefix shared by all EVM addresses.
pub const EVM_PREFIX: &str = "0x";

/// Length of a prefixed EVM address.
pub const EVM_ADDRESS_LEN: usize = 42;

/// Minimum length of a Solana address.
pub const SOLANA_MIN_ADDRESS_LEN: usize = 32;

/// Network used for Solana requests when none is given.
pub const DEFAULT_SOLANA_NETWORK: &str = "mainnet";

/// Characters that must never appear in chain or network hints.
const UNSAFE_HINT_CHARS: &[char] = &[';', '&', '|', '`', '$', '(', ')'];

/// Network family detected for a single request.
///
/// Exactly one of chain (EVM) or network (Solana) is carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockchainContext {
    /// EVM request against a canonical chain id
    Evm {
        /// Resolved chain id
        chain: ChainId,
    },
    /// Solana request against a named network
    Solana {
        /// Network name (`mainnet`, `devnet`, ...)
        network: String,
    },
}

impl BlockchainContext {
    /// Whether this is an EVM context.
    pub fn is_evm(&self) -> bool {
        matches!(self, BlockchainContext::Evm { .. })
    }

    /// The EVM chain id, if any.
    pub fn chain(&self) -> Option<&ChainId> {
        match self {
            BlockchainContext::Evm { chain } => Some(chain),
            BlockchainContext::Solana { .. } => None,
        }
    }

    /// The Solana network, if any.
    pub fn network(&self) -> Option<&str> {
        match self {
            BlockchainContext::Evm { .. } => None,
            BlockchainContext::Solana { network } => Some(network),
        }
    }
}

/// Caller-supplied hints consulted during detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectionHints<'a> {
    /// Chain name or id
    pub chain: Option<&'a str>,
    /// Solana network name
    pub network: Option<&'a str>,
}

/// Classify a request as EVM or Solana and validate its address format.
///
/// # Examples
///
/// ```rust
/// use web3_query::detect::{detect_blockchain, BlockchainContext, DetectionHints};
///
/// let ctx = detect_blockchain(
///     Some("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"),
///     DetectionHints { chain: Some("polygon"), network: None },
/// )
/// .unwrap();
/// assert_eq!(ctx.chain().map(|c| c.as_str()), Some("0x89"));
///
/// let ctx = detect_blockchain(None, DetectionHints::default()).unwrap();
/// assert!(ctx.is_evm());
/// ```
pub fn detect_blockchain(
    address: Option<&str>,
    hints: DetectionHints<'_>,
) -> Result<BlockchainContext, ValidationError> {
    let chain_hint = hints
        .chain
        .map(|value| validate_hint("chain", value))
        .transpose()?;
    let network_hint = hints
        .network
        .map(|value| validate_hint("network", value))
        .transpose()?;

    let solana = |network: Option<&str>| BlockchainContext::Solana {
        network: network.unwrap_or(DEFAULT_SOLANA_NETWORK).to_string(),
    };

    if let Some(address) = address.filter(|a| !a.is_empty()) {
        if !address.starts_with(EVM_PREFIX) && address.len() >= SOLANA_MIN_ADDRESS_LEN {
            validate_solana_address(address)?;
            return Ok(solana(network_hint));
        }
        if address.starts_with(EVM_PREFIX) && address.len() == EVM_ADDRESS_LEN {
            validate_evm_address(address)?;
            return Ok(BlockchainContext::Evm {
                chain: resolve_chain(Some(chain_hint.unwrap_or("eth"))),
            });
        }
    }

    match chain_hint {
        Some(chain) if is_solana_alias(chain) => Ok(solana(network_hint)),
        Some(chain) => Ok(BlockchainContext::Evm {
            chain: resolve_chain(Some(chain)),
        }),
        None => Ok(BlockchainContext::Evm {
            chain: ChainId::ethereum(),
        }),
    }
}

/// Check a chain or network hint: non-empty once trimmed, free of shell metacharacters.
///
/// Returns the trimmed value.
pub fn validate_hint<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyHint { field });
    }
    if trimmed.contains(UNSAFE_HINT_CHARS) {
        return Err(ValidationError::UnsafeHint {
            field,
            value: trimmed.to_string(),
        });
    }
    Ok(trimmed)
}

/// Validate `0x` followed by exactly 40 hex digits.
pub fn validate_evm_address(address: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidEvmAddress {
        address: address.to_string(),
    };
    if !address.starts_with(EVM_PREFIX) || address.len() != EVM_ADDRESS_LEN {
        return Err(invalid());
    }
    Address::from_str(address).map(|_| ()).map_err(|_| invalid())
}

/// Validate that every character belongs to the Base58 alphabet.
pub fn validate_solana_address(address: &str) -> Result<(), ValidationError> {
    bs58::decode(address)
        .into_vec()
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidSolanaAddress {
            address: address.to_string(),
        })
}
