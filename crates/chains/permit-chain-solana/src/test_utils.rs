//! In-memory wallets for tests. Connection state lives in atomics.

use async_trait::async_trait;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::chain::Address;
use crate::error::WalletError;
use crate::wallet::{SIGN_AND_SEND, SIGN_ONLY, SignAndSendWallet, SolanaWallet, WalletCapability};

pub struct MockWallet {
    key: Address,
    connected: AtomicBool,
    refuse_connect: bool,
    reject_sign: bool,
    sign_and_send: bool,
    connect_calls: AtomicUsize,
    sign_calls: AtomicUsize,
}

impl MockWallet {
    fn new(key: [u8; 32], connected: bool) -> Self {
        Self {
            key: Address::from(key),
            connected: AtomicBool::new(connected),
            refuse_connect: false,
            reject_sign: false,
            sign_and_send: false,
            connect_calls: AtomicUsize::new(0),
            sign_calls: AtomicUsize::new(0),
        }
    }

    pub fn connected(key: [u8; 32]) -> Self {
        Self::new(key, true)
    }

    pub fn disconnected(key: [u8; 32]) -> Self {
        Self::new(key, false)
    }

    pub fn refusing_connect(mut self) -> Self {
        self.refuse_connect = true;
        self
    }

    pub fn rejecting(mut self) -> Self {
        self.reject_sign = true;
        self
    }

    pub fn with_sign_and_send(mut self) -> Self {
        self.sign_and_send = true;
        self
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SolanaWallet for MockWallet {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn public_key(&self) -> Option<Address> {
        self.is_connected().then_some(self.key)
    }

    async fn connect(&self) -> Result<Address, WalletError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.refuse_connect {
            return Err(WalletError::Rejected("User rejected the request.".into()));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(self.key)
    }

    async fn sign_transaction(
        &self,
        mut transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, WalletError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if !self.is_connected() {
            return Err(WalletError::NotConnected);
        }
        if self.reject_sign {
            return Err(WalletError::Rejected("User rejected the request.".into()));
        }
        transaction.signatures.push(Signature::from([7u8; 64]));
        Ok(transaction)
    }

    fn capabilities(&self) -> &'static [WalletCapability] {
        if self.sign_and_send {
            SIGN_AND_SEND
        } else {
            SIGN_ONLY
        }
    }

    fn as_sign_and_send(&self) -> Option<&dyn SignAndSendWallet> {
        if self.sign_and_send {
            Some(self as &dyn SignAndSendWallet)
        } else {
            None
        }
    }
}

#[async_trait]
impl SignAndSendWallet for MockWallet {
    async fn sign_and_send_transaction(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<Signature, WalletError> {
        let signed = self.sign_transaction(transaction).await?;
        signed
            .signatures
            .first()
            .copied()
            .ok_or_else(|| WalletError::Rejected("no signature".into()))
    }
}
