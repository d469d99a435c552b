//! Relay fee aggregation over the destination domain table.

use alloy_core::primitives::U256;

use crate::error::DeployError;

/// One destination chain known to the relay network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEntry {
    /// Human-readable chain name, as selected by the caller.
    pub name: String,
    /// The relay network's numeric identifier for the chain.
    pub domain: u64,
    /// Relay fee for one deployment to this chain, in origin-chain wei.
    pub fee: U256,
}

/// Validated, static mapping from chain name to relay domain and fee.
///
/// Built once at startup from configuration; an unknown chain name at
/// aggregation time is a caller error, not a table mutation.
#[derive(Debug, Clone)]
pub struct DomainTable {
    entries: Vec<DomainEntry>,
}

/// The index-aligned output of fee aggregation.
///
/// `chains[i]`, `domains[i]` and `fees[i]` always describe the same
/// destination, and `total` is the checked sum of `fees`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeBundle {
    pub chains: Vec<String>,
    pub domains: Vec<u64>,
    pub fees: Vec<U256>,
    pub total: U256,
}

impl DomainTable {
    pub fn new(entries: Vec<DomainEntry>) -> Self {
        Self { entries }
    }

    /// Look up a destination by chain name.
    pub fn lookup(&self, name: &str) -> Option<&DomainEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// All known chain names, in table order.
    pub fn chain_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn entries(&self) -> &[DomainEntry] {
        &self.entries
    }

    /// Map a destination selection to index-aligned domain and fee lists
    /// plus their total.
    ///
    /// Fails atomically: an empty selection, an unknown destination, or a
    /// fee-sum overflow produces an error and no partial lists. Duplicate
    /// selections collapse to their first occurrence.
    pub fn aggregate(&self, destinations: &[String]) -> Result<FeeBundle, DeployError> {
        let mut chains: Vec<String> = Vec::with_capacity(destinations.len());
        for name in destinations {
            if !chains.iter().any(|seen| seen == name) {
                chains.push(name.clone());
            }
        }

        if chains.is_empty() {
            return Err(DeployError::NoDestinationsSelected);
        }

        let mut domains = Vec::with_capacity(chains.len());
        let mut fees = Vec::with_capacity(chains.len());
        let mut total = U256::ZERO;

        for name in &chains {
            let entry = self
                .lookup(name)
                .ok_or_else(|| DeployError::UnknownDestination(name.clone()))?;
            total = total
                .checked_add(entry.fee)
                .ok_or(DeployError::FeeOverflow)?;
            domains.push(entry.domain);
            fees.push(entry.fee);
        }

        Ok(FeeBundle {
            chains,
            domains,
            fees,
            total,
        })
    }
}
