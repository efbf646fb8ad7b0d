//! The injected wallet boundary.
//!
//! A wallet moves from unconnected to connected outside this crate (the user
//! approves a connection, or [`SolanaWallet::connect`] is called). Signing
//! only ever happens on a connected wallet; see
//! [`sign_transaction_base64`](crate::delegate::sign_transaction_base64).
//!
//! `signAndSendTransaction` is optional in the wild. Here it is an explicit
//! capability: wallets that support it list [`WalletCapability::SignAndSend`]
//! and return themselves from [`SolanaWallet::as_sign_and_send`].

use async_trait::async_trait;
use serde::Serialize;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;
use std::sync::Arc;

use crate::chain::Address;
use crate::error::WalletError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WalletCapability {
    Sign,
    SignAndSend,
}

pub const SIGN_ONLY: &[WalletCapability] = &[WalletCapability::Sign];
pub const SIGN_AND_SEND: &[WalletCapability] =
    &[WalletCapability::Sign, WalletCapability::SignAndSend];

#[async_trait]
pub trait SolanaWallet: Send + Sync {
    fn is_connected(&self) -> bool;

    /// `None` until connected.
    fn public_key(&self) -> Option<Address>;

    async fn connect(&self) -> Result<Address, WalletError>;

    /// Returns the transaction with the wallet's signature applied.
    async fn sign_transaction(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, WalletError>;

    fn capabilities(&self) -> &'static [WalletCapability] {
        SIGN_ONLY
    }

    fn supports(&self, capability: WalletCapability) -> bool {
        self.capabilities().contains(&capability)
    }

    fn as_sign_and_send(&self) -> Option<&dyn SignAndSendWallet> {
        None
    }
}

/// Wallets that can sign and broadcast in one step.
#[async_trait]
pub trait SignAndSendWallet: SolanaWallet {
    async fn sign_and_send_transaction(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<Signature, WalletError>;
}

#[async_trait]
impl<T: SolanaWallet + ?Sized> SolanaWallet for Arc<T> {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn public_key(&self) -> Option<Address> {
        (**self).public_key()
    }

    async fn connect(&self) -> Result<Address, WalletError> {
        (**self).connect().await
    }

    async fn sign_transaction(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, WalletError> {
        (**self).sign_transaction(transaction).await
    }

    fn capabilities(&self) -> &'static [WalletCapability] {
        (**self).capabilities()
    }

    fn as_sign_and_send(&self) -> Option<&dyn SignAndSendWallet> {
        (**self).as_sign_and_send()
    }
}

/// Signs and broadcasts through the wallet, when it has that capability.
pub async fn sign_and_send<W: SolanaWallet + ?Sized>(
    wallet: &W,
    transaction: VersionedTransaction,
) -> Result<Signature, WalletError> {
    if !wallet.is_connected() {
        return Err(WalletError::NotConnected);
    }
    let sender = wallet
        .as_sign_and_send()
        .ok_or(WalletError::Unsupported(WalletCapability::SignAndSend))?;
    sender.sign_and_send_transaction(transaction).await
}
