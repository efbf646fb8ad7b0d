//! Uniswap Permit2 `PermitSingle` signing (allowance-transfer flavour).
//!
//! The nonce comes from Permit2's own `allowance(owner, token, spender)`, not
//! from the token. The same read-not-reserve race as in [`crate::erc20`]
//! applies per `(owner, token, spender)`.

use alloy_primitives::aliases::{U48, U160};
use alloy_primitives::{Address, B256, U256, address};
use serde::Serialize;

#[cfg(feature = "telemetry")]
use tracing::{Instrument, instrument};

use crate::abi::{decode_permit2_allowance, permit2_allowance_call};
use crate::allowance::Permit2Allowance;
use crate::chain::{Eip1193Provider, Eip1193ProviderExt};
use crate::erc20::fetch_erc20_allowance;
use crate::error::Eip155Error;
use crate::signature::EvmSignature;
use crate::typed_data::{
    PermitDetailsMessage, PermitSingleMessage, TypedData, permit_single_typed_data,
};
use permit_types::error::ValidationError;
use permit_types::timestamp::{Clock, UnixTimestamp};

/// The canonical Permit2 deployment, identical on every supported chain.
pub const PERMIT2_ADDRESS: Address = address!("0x000000000022D473030F116dDEE9F6B43aC78BA3");

pub const DEFAULT_SIG_DEADLINE_MINUTES: u64 = 30;
pub const DEFAULT_EXPIRATION_DAYS: u64 = 30;

/// Permit2 `allowance(owner, token, spender)`
pub async fn fetch_permit2_allowance<P: Eip1193Provider + ?Sized>(
    provider: &P,
    permit2: Address,
    owner: Address,
    token: Address,
    spender: Address,
) -> Result<Permit2Allowance, Eip155Error> {
    let call = permit2_allowance_call(permit2, owner, token, spender);
    let call_fut = provider.eth_call(&call);
    #[cfg(feature = "telemetry")]
    let data = call_fut
        .instrument(tracing::info_span!(
            "fetch_permit2_allowance",
            token = %token,
            owner = %owner,
            spender = %spender,
            otel.kind = "client"
        ))
        .await?;
    #[cfg(not(feature = "telemetry"))]
    let data = call_fut.await?;
    Ok(decode_permit2_allowance(&data)?.into())
}

/// How much of `token` the owner has approved to Permit2 itself.
pub async fn fetch_permit2_token_approval<P: Eip1193Provider + ?Sized>(
    provider: &P,
    token: Address,
    owner: Address,
    permit2: Address,
) -> Result<U256, Eip155Error> {
    fetch_erc20_allowance(provider, token, owner, permit2).await
}

/// Inputs of [`sign_permit2_single`]. The owner is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permit2PermitParams {
    pub owner: Address,
    pub token: Address,
    pub spender: Address,
    pub amount: U160,
    pub expiration_days: u64,
    pub sig_deadline_minutes: u64,
    pub permit2: Address,
}

impl Permit2PermitParams {
    pub fn new(owner: Address, token: Address, spender: Address, amount: U160) -> Self {
        Self {
            owner,
            token,
            spender,
            amount,
            expiration_days: DEFAULT_EXPIRATION_DAYS,
            sig_deadline_minutes: DEFAULT_SIG_DEADLINE_MINUTES,
            permit2: PERMIT2_ADDRESS,
        }
    }

    pub fn with_expiration_days(mut self, days: u64) -> Self {
        self.expiration_days = days;
        self
    }

    pub fn with_sig_deadline_minutes(mut self, minutes: u64) -> Self {
        self.sig_deadline_minutes = minutes;
        self
    }

    pub fn with_permit2(mut self, permit2: Address) -> Self {
        self.permit2 = permit2;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedPermit2Single {
    pub typed_data: TypedData<PermitSingleMessage>,
    pub signature: EvmSignature,
}

impl SignedPermit2Single {
    pub fn nonce(&self) -> U48 {
        self.typed_data.message.details.nonce
    }

    pub fn expiration(&self) -> U48 {
        self.typed_data.message.details.expiration
    }

    pub fn sig_deadline(&self) -> UnixTimestamp {
        self.typed_data.message.sig_deadline
    }

    pub fn signing_hash(&self) -> B256 {
        self.typed_data.signing_hash()
    }

    pub fn recover_signer(&self) -> Result<Address, Eip155Error> {
        self.signature.recover_signer(&self.signing_hash())
    }
}

/// Signs a Permit2 `PermitSingle` granting `params.spender` up to
/// `params.amount` of `params.token`.
#[cfg_attr(feature = "telemetry", instrument(skip_all, fields(token = %params.token, owner = %params.owner), err))]
pub async fn sign_permit2_single<P, C>(
    provider: &P,
    clock: &C,
    params: &Permit2PermitParams,
) -> Result<SignedPermit2Single, Eip155Error>
where
    P: Eip1193Provider + ?Sized,
    C: Clock + ?Sized,
{
    let chain_id = provider.chain_id().await?;
    let allowance = fetch_permit2_allowance(
        provider,
        params.permit2,
        params.owner,
        params.token,
        params.spender,
    )
    .await?;
    let now = clock.now();
    let expiration = now.plus_days(params.expiration_days)?.as_secs();
    let expiration = U48::try_from(expiration)
        .map_err(|_| ValidationError::UintOverflow { bits: 48, value: expiration })?;
    let message = PermitSingleMessage {
        details: PermitDetailsMessage {
            token: params.token.into(),
            amount: params.amount,
            expiration,
            nonce: allowance.nonce,
        },
        spender: params.spender.into(),
        sig_deadline: now.plus_minutes(params.sig_deadline_minutes)?,
    };
    let typed_data = permit_single_typed_data(U256::from(chain_id), params.permit2, message);
    let raw = provider.sign_typed_data_v4(params.owner, &typed_data).await?;
    let signature = EvmSignature::parse(&raw)?;
    tracing::debug!(owner = %params.owner, token = %params.token, nonce = %allowance.nonce, "Signed Permit2 PermitSingle");
    Ok(SignedPermit2Single {
        typed_data,
        signature,
    })
}
