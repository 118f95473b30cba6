//! The local settings store (spec §6): an external-collaborator seam for
//! the address book and local contract registry. The core only needs a
//! read-only view — loading the backing file is the CLI's job, since the
//! core itself performs no I/O (§5).

use crate::primitives::Address;
use std::collections::{HashMap, HashSet};

/// Read-only view over a caller-supplied address book / contract registry.
/// Used only by the selector verifier's delegate-call-to-unknown-target
/// check (§4.4) — it has no bearing on `ok`.
pub trait SettingsStore {
    fn is_known_contract(&self, address: Address) -> bool;
    fn label_for(&self, address: Address) -> Option<&str>;
}

/// The default when no settings were supplied (`--no-settings`, or
/// `--settings` omitted). Every address is unknown; the `settings` source
/// entry is reported `disabled`, not an error.
#[derive(Debug, Default)]
pub struct NullSettingsStore;

impl SettingsStore for NullSettingsStore {
    fn is_known_contract(&self, _address: Address) -> bool {
        false
    }

    fn label_for(&self, _address: Address) -> Option<&str> {
        None
    }
}

/// A settings store backed by a single JSON document:
/// `{"knownContracts": ["0x..."], "addressBook": {"0x...": "label"}}`.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct JsonSettingsStore {
    #[serde(default, rename = "knownContracts")]
    known_contracts: HashSet<Address>,
    #[serde(default, rename = "addressBook")]
    address_book: HashMap<Address, String>,
}

impl JsonSettingsStore {
    /// Parses a settings document already read into memory. Kept
    /// `&str`-in, no filesystem access, so the core crate's "no I/O"
    /// guarantee holds even though a store can be constructed from a file.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl SettingsStore for JsonSettingsStore {
    fn is_known_contract(&self, address: Address) -> bool {
        self.known_contracts.contains(&address)
    }

    fn label_for(&self, address: Address) -> Option<&str> {
        self.address_book.get(&address).map(String::as_str)
    }
}
