//! Discovery of the wallet to sign with.
//!
//! Candidate wallets are injected into a [`WalletRegistry`] instead of being
//! looked up from ambient globals. The registry iterates in the fixed
//! priority order of [`KnownWallet`], whatever the insertion order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::chain::Address;
use crate::error::ConnectionError;
use crate::wallet::SolanaWallet;

/// How many wallets [`WalletRegistry::connect_wallet`] prompts.
pub const CONNECT_ATTEMPTS: usize = 2;

/// Known wallets, in discovery priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownWallet {
    Phantom,
    Solflare,
    Backpack,
    Glow,
    Coinbase,
}

impl KnownWallet {
    pub const ALL: [KnownWallet; 5] = [
        KnownWallet::Phantom,
        KnownWallet::Solflare,
        KnownWallet::Backpack,
        KnownWallet::Glow,
        KnownWallet::Coinbase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KnownWallet::Phantom => "phantom",
            KnownWallet::Solflare => "solflare",
            KnownWallet::Backpack => "backpack",
            KnownWallet::Glow => "glow",
            KnownWallet::Coinbase => "coinbase",
        }
    }
}

impl Display for KnownWallet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Default)]
pub struct WalletRegistry {
    wallets: BTreeMap<KnownWallet, Arc<dyn SolanaWallet>>,
}

impl std::fmt::Debug for WalletRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.wallets.keys()).finish()
    }
}

impl WalletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wallet(mut self, kind: KnownWallet, wallet: Arc<dyn SolanaWallet>) -> Self {
        self.insert(kind, wallet);
        self
    }

    /// Registers `wallet`, replacing any previous wallet of the same kind.
    pub fn insert(&mut self, kind: KnownWallet, wallet: Arc<dyn SolanaWallet>) {
        self.wallets.insert(kind, wallet);
    }

    pub fn get(&self, kind: KnownWallet) -> Option<&Arc<dyn SolanaWallet>> {
        self.wallets.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// Registered wallets in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (KnownWallet, &Arc<dyn SolanaWallet>)> {
        self.wallets.iter().map(|(kind, wallet)| (*kind, wallet))
    }

    /// The first wallet that is connected and reports `expected` as its key.
    pub fn find_connected_wallet(
        &self,
        expected: &Address,
    ) -> Option<(KnownWallet, Arc<dyn SolanaWallet>)> {
        self.iter()
            .find(|(_, wallet)| {
                wallet.is_connected() && wallet.public_key().as_ref() == Some(expected)
            })
            .map(|(kind, wallet)| (kind, Arc::clone(wallet)))
    }

    /// Like [`find_connected_wallet`](Self::find_connected_wallet), but prompts
    /// the first [`CONNECT_ATTEMPTS`] wallets of [`KnownWallet::ALL`] to connect
    /// when none already matches. Wallets further down the list are never
    /// prompted, and an unregistered slot is not filled by the next one.
    ///
    /// Returns [`ConnectionError::Mismatch`] when a wallet connected under a
    /// different key, and [`ConnectionError::NotFound`] otherwise.
    pub async fn connect_wallet(
        &self,
        expected: &Address,
    ) -> Result<(KnownWallet, Arc<dyn SolanaWallet>), ConnectionError> {
        if let Some(found) = self.find_connected_wallet(expected) {
            return Ok(found);
        }
        let mut mismatch = None;
        let prompted = KnownWallet::ALL
            .iter()
            .take(CONNECT_ATTEMPTS)
            .filter_map(|kind| self.get(*kind).map(|wallet| (*kind, wallet)));
        for (kind, wallet) in prompted {
            match wallet.connect().await {
                Ok(actual) if actual == *expected => {
                    tracing::debug!(wallet = %kind, address = %actual, "Wallet connected");
                    return Ok((kind, Arc::clone(wallet)));
                }
                Ok(actual) => {
                    tracing::debug!(wallet = %kind, %expected, %actual, "Wallet connected with another key");
                    mismatch.get_or_insert(actual);
                }
                Err(error) => {
                    tracing::debug!(wallet = %kind, %error, "Wallet connection failed");
                }
            }
        }
        Err(match mismatch {
            Some(actual) => ConnectionError::Mismatch {
                expected: *expected,
                actual,
            },
            None => ConnectionError::NotFound {
                expected: *expected,
            },
        })
    }
}
