//! SPL Token delegate approvals.
//!
//! The backend builds the `approve` transaction and hands it over as an
//! [`DelegatePaymentTxResponse`] envelope. This module checks the blockhash is
//! still fresh, has the connected wallet sign the transaction, and returns it
//! re-encoded. Transaction internals are never inspected.
//!
//! Whether an approval is already in place is read from the owner's token
//! account with [`DelegateAllowance::from_token_account`].

use serde::{Deserialize, Serialize};
use solana_program_pack::Pack;
use solana_transaction::versioned::VersionedTransaction;
use spl_token::state::Account as TokenAccount;
use spl_token_2022::extension::StateWithExtensions;
use spl_token_2022::state::Account as Token2022Account;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::chain::{Address, TOKEN_2022_PROGRAM_ID};
use crate::error::{ConnectionError, SolanaSigningError};
use crate::wallet::SolanaWallet;
use permit_types::timestamp::Clock;
use permit_types::util::Base64Bytes;

/// Default safety margin before blockhash expiry.
pub const DEFAULT_BLOCKHASH_BUFFER_MS: u64 = 10_000;

fn invalid_account(error: &dyn std::fmt::Display) -> SolanaSigningError {
    SolanaSigningError::InvalidTokenAccount(format!("failed to unpack token account: {error}"))
}

/// `u64` amounts, accepted as JSON numbers or decimal strings and written as strings.
mod u64_amount {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        String(String),
    }

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::String(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Unsigned delegate-approval transaction issued by the payment backend.
#[doc(alias = "DelegateApproveTxResponse")]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatePaymentTxResponse {
    /// Base64 bincode-serialized `VersionedTransaction`.
    pub unsigned_tx: String,
    pub blockhash: String,
    /// Unix milliseconds after which the blockhash is no longer accepted.
    pub blockhash_expires_at: u64,
    pub delegate_pda: Address,
    pub payment_id: String,
    #[serde(with = "u64_amount")]
    pub approve_amount: u64,
    #[serde(with = "u64_amount")]
    pub fee_amount: u64,
}

/// A delegate-approval transaction signed by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedDelegateTx {
    /// Base64 bincode-serialized signed transaction.
    pub signed_tx: String,
    pub signer_address: Address,
}

/// `expires_at > now + buffer`, in milliseconds.
pub fn is_blockhash_valid(expires_at_ms: u64, now_ms: u64, buffer_ms: u64) -> bool {
    expires_at_ms > now_ms.saturating_add(buffer_ms)
}

fn require_connected<W: SolanaWallet + ?Sized>(wallet: &W) -> Result<Address, ConnectionError> {
    if !wallet.is_connected() {
        return Err(ConnectionError::NotConnected);
    }
    wallet.public_key().ok_or(ConnectionError::NotConnected)
}

/// base64 -> `VersionedTransaction` -> wallet -> base64.
pub async fn sign_transaction_base64<W: SolanaWallet + ?Sized>(
    wallet: &W,
    unsigned_tx: &str,
) -> Result<String, SolanaSigningError> {
    require_connected(wallet)?;
    let bytes = Base64Bytes::from(unsigned_tx).decode()?;
    let transaction: VersionedTransaction = bincode::deserialize(&bytes)?;
    let signed = wallet.sign_transaction(transaction).await?;
    let signed_bytes = bincode::serialize(&signed)?;
    Ok(Base64Bytes::encode(signed_bytes).to_string())
}

/// Signs the envelope's transaction if its blockhash outlives `buffer_ms`.
#[cfg_attr(feature = "telemetry", instrument(skip_all, fields(payment_id = %envelope.payment_id), err))]
pub async fn sign_delegate_transaction<W, C>(
    wallet: &W,
    envelope: &DelegatePaymentTxResponse,
    clock: &C,
    buffer_ms: u64,
) -> Result<SignedDelegateTx, SolanaSigningError>
where
    W: SolanaWallet + ?Sized,
    C: Clock + ?Sized,
{
    let signer_address = require_connected(wallet)?;
    let now_ms = clock.now_millis();
    if !is_blockhash_valid(envelope.blockhash_expires_at, now_ms, buffer_ms) {
        return Err(SolanaSigningError::BlockhashExpired {
            expires_at_ms: envelope.blockhash_expires_at,
            now_ms,
            buffer_ms,
        });
    }
    let signed_tx = sign_transaction_base64(wallet, &envelope.unsigned_tx).await?;
    tracing::debug!(
        payment_id = %envelope.payment_id,
        signer = %signer_address,
        approve_amount = envelope.approve_amount,
        "Signed delegate approval"
    );
    Ok(SignedDelegateTx {
        signed_tx,
        signer_address,
    })
}

/// Delegate state of an SPL token account, as seen at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateAllowance {
    pub approved: bool,
    #[serde(with = "u64_amount")]
    pub delegated_amount: u64,
    pub delegate_pda: Address,
}

impl DelegateAllowance {
    /// Reads the delegate of a token account owned by `program`.
    ///
    /// `approved` holds only when the account's delegate is `delegate_pda`
    /// with a non-zero delegated amount. Token-2022 accounts are unpacked with
    /// their extensions; their contents are not otherwise consulted.
    pub fn from_token_account(
        program: &Address,
        data: &[u8],
        delegate_pda: Address,
    ) -> Result<Self, SolanaSigningError> {
        if !program.is_token_program() {
            return Err(SolanaSigningError::InvalidTokenAccount(format!(
                "{program} is not a token program"
            )));
        }
        let is_token_2022 = *program.pubkey() == TOKEN_2022_PROGRAM_ID;
        let (delegate, delegated_amount): (Option<Address>, u64) = if is_token_2022 {
            let account = StateWithExtensions::<Token2022Account>::unpack(data)
                .map_err(|e| invalid_account(&e))?;
            (
                account.base.delegate.map(|key| Address::from(key.to_bytes())).into(),
                account.base.delegated_amount,
            )
        } else {
            let account = TokenAccount::unpack(data).map_err(|e| invalid_account(&e))?;
            (
                account.delegate.map(|key| Address::from(key.to_bytes())).into(),
                account.delegated_amount,
            )
        };
        let delegated_amount = match delegate {
            Some(delegate) if delegate == delegate_pda => delegated_amount,
            _ => 0,
        };
        Ok(Self {
            approved: delegated_amount > 0,
            delegated_amount,
            delegate_pda,
        })
    }

    /// Approved for at least `required` base units.
    pub fn covers(&self, required: u64) -> bool {
        self.approved && self.delegated_amount >= required
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::TOKEN_PROGRAM_ID;
    use crate::test_utils::MockWallet;
    use permit_types::error::ErrorKind;
    use permit_types::timestamp::FixedClock;
    use solana_signature::Signature;

    const NOW_MS: u64 = 1_700_000_000_000;

    // Byte offsets in the 165-byte token account base layout.
    const TOKEN_ACCOUNT_LEN: usize = 165;
    const DELEGATE_OPTION_OFFSET: usize = 72;
    const DELEGATE_OFFSET: usize = 76;
    const STATE_OFFSET: usize = 108;
    const IS_NATIVE_OPTION_OFFSET: usize = 109;
    const DELEGATED_AMOUNT_OFFSET: usize = 121;
    const ACCOUNT_TYPE_ACCOUNT: u8 = 2;
    const ACCOUNT_TYPE_MINT: u8 = 1;
    const EXTENSION_IMMUTABLE_OWNER: u16 = 7;

    /// Token-2022 account: base layout, account type, then one empty TLV entry.
    fn token_2022_account(
        delegate: Option<[u8; 32]>,
        delegated_amount: u64,
        account_type: u8,
    ) -> Vec<u8> {
        let mut data = token_account(delegate, delegated_amount);
        data.push(account_type);
        data.extend_from_slice(&EXTENSION_IMMUTABLE_OWNER.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data
    }

    fn unsigned_tx() -> String {
        let bytes = bincode::serialize(&VersionedTransaction::default()).unwrap();
        Base64Bytes::encode(bytes).to_string()
    }

    fn envelope(expires_at: u64) -> DelegatePaymentTxResponse {
        DelegatePaymentTxResponse {
            unsigned_tx: unsigned_tx(),
            blockhash: "11111111111111111111111111111111".into(),
            blockhash_expires_at: expires_at,
            delegate_pda: Address::from([9u8; 32]),
            payment_id: "pay_123".into(),
            approve_amount: 1_000_000,
            fee_amount: 5_000,
        }
    }

    fn token_account(delegate: Option<[u8; 32]>, delegated_amount: u64) -> Vec<u8> {
        let mut data = vec![0u8; TOKEN_ACCOUNT_LEN];
        if let Some(key) = delegate {
            data[DELEGATE_OPTION_OFFSET..DELEGATE_OFFSET].copy_from_slice(&1u32.to_le_bytes());
            data[DELEGATE_OFFSET..DELEGATE_OFFSET + 32].copy_from_slice(&key);
        }
        data[STATE_OFFSET] = 1;
        data[DELEGATED_AMOUNT_OFFSET..DELEGATED_AMOUNT_OFFSET + 8]
            .copy_from_slice(&delegated_amount.to_le_bytes());
        data
    }

    #[test]
    fn test_blockhash_freshness() {
        assert!(!is_blockhash_valid(NOW_MS + 5_000, NOW_MS, 10_000));
        assert!(is_blockhash_valid(NOW_MS + 20_000, NOW_MS, 10_000));
        assert!(!is_blockhash_valid(NOW_MS + 10_000, NOW_MS, 10_000));
    }

    #[test]
    fn test_envelope_wire_format() {
        let json = serde_json::json!({
            "unsigned_tx": "AA==",
            "blockhash": "11111111111111111111111111111111",
            "blockhash_expires_at": 1_700_000_060_000u64,
            "delegate_pda": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "payment_id": "pay_1",
            "approve_amount": "2500000",
            "fee_amount": 5000,
        });
        let envelope: DelegatePaymentTxResponse = serde_json::from_value(json).unwrap();
        assert_eq!(envelope.approve_amount, 2_500_000);
        assert_eq!(envelope.fee_amount, 5_000);
        assert_eq!(envelope.blockhash_expires_at, 1_700_000_060_000);
    }

    #[tokio::test]
    async fn test_sign_delegate_transaction() {
        let wallet = MockWallet::connected([1u8; 32]);
        let signed = sign_delegate_transaction(
            &wallet,
            &envelope(NOW_MS + 30_000),
            &FixedClock(NOW_MS),
            DEFAULT_BLOCKHASH_BUFFER_MS,
        )
        .await
        .unwrap();
        assert_eq!(signed.signer_address, Address::from([1u8; 32]));
        let bytes = Base64Bytes::from(signed.signed_tx.as_str()).decode().unwrap();
        let transaction: VersionedTransaction = bincode::deserialize(&bytes).unwrap();
        assert_eq!(transaction.signatures, vec![Signature::from([7u8; 64])]);
    }

    #[tokio::test]
    async fn test_expired_blockhash_is_stale_and_not_signed() {
        let wallet = MockWallet::connected([1u8; 32]);
        let err = sign_delegate_transaction(
            &wallet,
            &envelope(NOW_MS + 5_000),
            &FixedClock(NOW_MS),
            DEFAULT_BLOCKHASH_BUFFER_MS,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StaleData);
        assert_eq!(wallet.sign_calls(), 0);
    }

    #[tokio::test]
    async fn test_disconnected_wallet_is_connection_error() {
        let wallet = MockWallet::disconnected([1u8; 32]);
        let err = sign_transaction_base64(&wallet, &unsigned_tx())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SolanaSigningError::Connection(ConnectionError::NotConnected)
        ));
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[tokio::test]
    async fn test_bad_base64_is_validation_error() {
        let wallet = MockWallet::connected([1u8; 32]);
        let err = sign_transaction_base64(&wallet, "not base64!")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_garbled_transaction_is_validation_error() {
        let wallet = MockWallet::connected([1u8; 32]);
        let err = sign_transaction_base64(&wallet, "AAEC")
            .await
            .unwrap_err();
        assert!(matches!(err, SolanaSigningError::Transaction(_)));
    }

    #[tokio::test]
    async fn test_wallet_rejection_is_rpc_error() {
        let wallet = MockWallet::connected([1u8; 32]).rejecting();
        let err = sign_transaction_base64(&wallet, &unsigned_tx())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rpc);
    }

    #[test]
    fn test_token_account_delegate() {
        let pda = Address::from([9u8; 32]);
        let program = Address::new(TOKEN_PROGRAM_ID);
        let allowance =
            DelegateAllowance::from_token_account(&program, &token_account(Some([9u8; 32]), 700), pda)
                .unwrap();
        assert!(allowance.approved);
        assert_eq!(allowance.delegated_amount, 700);
        assert!(allowance.covers(700));
        assert!(!allowance.covers(701));
    }

    #[test]
    fn test_token_account_other_delegate() {
        let pda = Address::from([9u8; 32]);
        let program = Address::new(TOKEN_PROGRAM_ID);
        let allowance =
            DelegateAllowance::from_token_account(&program, &token_account(Some([8u8; 32]), 700), pda)
                .unwrap();
        assert!(!allowance.approved);
        assert_eq!(allowance.delegated_amount, 0);
        assert!(!allowance.covers(0));
    }

    #[test]
    fn test_token_account_no_delegate() {
        let pda = Address::from([9u8; 32]);
        let program = Address::new(TOKEN_PROGRAM_ID);
        let allowance =
            DelegateAllowance::from_token_account(&program, &token_account(None, 0), pda).unwrap();
        assert!(!allowance.approved);
    }

    #[test]
    fn test_token_2022_account_with_extensions() {
        let pda = Address::from([9u8; 32]);
        let program = Address::new(TOKEN_2022_PROGRAM_ID);
        let data = token_2022_account(Some([9u8; 32]), 42, ACCOUNT_TYPE_ACCOUNT);
        let allowance = DelegateAllowance::from_token_account(&program, &data, pda).unwrap();
        assert_eq!(allowance.delegated_amount, 42);
        let program = Address::new(TOKEN_PROGRAM_ID);
        assert!(DelegateAllowance::from_token_account(&program, &data, pda).is_err());
    }

    #[test]
    fn test_token_account_rejects_garbage() {
        let pda = Address::from([9u8; 32]);
        let program = Address::new(TOKEN_PROGRAM_ID);
        assert!(DelegateAllowance::from_token_account(&program, &[0u8; 64], pda).is_err());
        assert!(
            DelegateAllowance::from_token_account(&program, &[0u8; TOKEN_ACCOUNT_LEN], pda)
                .is_err()
        );
        let mut bad_tag = token_account(None, 0);
        bad_tag[DELEGATE_OPTION_OFFSET] = 2;
        assert!(DelegateAllowance::from_token_account(&program, &bad_tag, pda).is_err());
        let not_token = Address::from([3u8; 32]);
        assert!(
            DelegateAllowance::from_token_account(&not_token, &token_account(None, 0), pda)
                .is_err()
        );
    }

    #[test]
    fn test_token_2022_rejects_malformed_account() {
        let pda = Address::from([9u8; 32]);
        let program = Address::new(TOKEN_2022_PROGRAM_ID);
        let mint_typed = token_2022_account(Some([9u8; 32]), 5, ACCOUNT_TYPE_MINT);
        assert!(matches!(
            DelegateAllowance::from_token_account(&program, &mint_typed, pda),
            Err(SolanaSigningError::InvalidTokenAccount(_))
        ));
        let mut bad_native = token_2022_account(Some([9u8; 32]), 5, ACCOUNT_TYPE_ACCOUNT);
        bad_native[IS_NATIVE_OPTION_OFFSET] = 7;
        assert!(DelegateAllowance::from_token_account(&program, &bad_native, pda).is_err());
    }

    #[test]
    fn test_token_account_rejects_bad_native_tag() {
        let pda = Address::from([9u8; 32]);
        let program = Address::new(TOKEN_PROGRAM_ID);
        let mut data = token_account(Some([9u8; 32]), 5);
        data[IS_NATIVE_OPTION_OFFSET] = 7;
        let err = DelegateAllowance::from_token_account(&program, &data, pda).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_delegate_allowance_json() {
        let allowance = DelegateAllowance {
            approved: true,
            delegated_amount: 1_000,
            delegate_pda: Address::from([9u8; 32]),
        };
        let json = serde_json::to_value(allowance).unwrap();
        assert_eq!(json["delegatedAmount"], "1000");
        assert_eq!(json["approved"], true);
    }
}
