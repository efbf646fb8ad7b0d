//! EIP-2612 `permit` signing for ERC-20 tokens.
//!
//! The flow is: pick the signer, resolve the token's domain, read
//! `nonces(owner)`, assemble the `Permit` typed data, ask the wallet for
//! `eth_signTypedData_v4`, and split the result into `v, r, s`.
//!
//! # Nonce race
//!
//! The nonce is read, not reserved. Two permits signed concurrently for the
//! same `(owner, token)` carry the same nonce, and only the first one submitted
//! on chain succeeds. Callers that sign in parallel must serialize per owner
//! and token themselves.

use alloy_primitives::{Address, B256, U256};
use serde::Serialize;

#[cfg(feature = "telemetry")]
use tracing::{Instrument, instrument};

use crate::abi::{allowance_call, decode_uint256, nonces_call};
use crate::allowance::is_permit_valid;
use crate::chain::{Eip1193Provider, Eip1193ProviderExt};
use crate::domain::{DEFAULT_DOMAIN_VERSION, resolve_domain};
use crate::error::Eip155Error;
use crate::signature::EvmSignature;
use crate::typed_data::{PermitMessage, TypedData, permit_typed_data};
use permit_types::timestamp::{Clock, UnixTimestamp};

/// Default permit lifetime.
pub const DEFAULT_PERMIT_DEADLINE_MINUTES: u64 = 60;

/// `token.nonces(owner)`
pub async fn fetch_nonce<P: Eip1193Provider + ?Sized>(
    provider: &P,
    token: Address,
    owner: Address,
) -> Result<U256, Eip155Error> {
    let call = nonces_call(token, owner);
    let call_fut = provider.eth_call(&call);
    #[cfg(feature = "telemetry")]
    let data = call_fut
        .instrument(tracing::info_span!(
            "fetch_nonce",
            token = %token,
            owner = %owner,
            otel.kind = "client"
        ))
        .await?;
    #[cfg(not(feature = "telemetry"))]
    let data = call_fut.await?;
    Ok(decode_uint256(&data)?)
}

/// ERC-20 `token.allowance(owner, spender)`
pub async fn fetch_erc20_allowance<P: Eip1193Provider + ?Sized>(
    provider: &P,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<U256, Eip155Error> {
    let data = provider
        .eth_call(&allowance_call(token, owner, spender))
        .await?;
    Ok(decode_uint256(&data)?)
}

/// The account that signs when no owner is given: the first already exposed
/// account, otherwise the first account after a connection prompt.
pub async fn resolve_signer<P: Eip1193Provider + ?Sized>(
    provider: &P,
) -> Result<Address, Eip155Error> {
    if let Some(account) = provider.accounts().await?.first() {
        return Ok(*account);
    }
    provider
        .request_accounts()
        .await?
        .first()
        .copied()
        .ok_or(Eip155Error::NoAccount)
}

/// Inputs of [`sign_erc20_permit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc20PermitParams {
    pub token: Address,
    pub spender: Address,
    pub value: U256,
    pub deadline_minutes: u64,
    /// Signing account; discovered through the provider when `None`.
    pub owner: Option<Address>,
    /// Domain version for tokens without `eip712Domain()` or `version()`.
    pub default_version: String,
}

impl Erc20PermitParams {
    pub fn new(token: Address, spender: Address, value: U256) -> Self {
        Self {
            token,
            spender,
            value,
            deadline_minutes: DEFAULT_PERMIT_DEADLINE_MINUTES,
            owner: None,
            default_version: DEFAULT_DOMAIN_VERSION.to_string(),
        }
    }

    pub fn with_owner(mut self, owner: Address) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_deadline_minutes(mut self, minutes: u64) -> Self {
        self.deadline_minutes = minutes;
        self
    }

    pub fn with_default_version(mut self, version: impl Into<String>) -> Self {
        self.default_version = version.into();
        self
    }
}

/// A signed EIP-2612 permit, ready to be relayed to `permit(...)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedErc20Permit {
    pub typed_data: TypedData<PermitMessage>,
    pub signature: EvmSignature,
}

impl SignedErc20Permit {
    pub fn owner(&self) -> Address {
        self.typed_data.message.owner.0
    }

    pub fn nonce(&self) -> U256 {
        self.typed_data.message.nonce
    }

    pub fn deadline(&self) -> UnixTimestamp {
        self.typed_data.message.deadline
    }

    pub fn signing_hash(&self) -> B256 {
        self.typed_data.signing_hash()
    }

    /// Address recovered from the signature over this permit's digest.
    pub fn recover_signer(&self) -> Result<Address, Eip155Error> {
        self.signature.recover_signer(&self.signing_hash())
    }

    /// Fails with [`Eip155Error::DeadlinePassed`] when the deadline is within
    /// `buffer_secs` of the clock's current time.
    pub fn ensure_fresh<C: Clock + ?Sized>(
        &self,
        clock: &C,
        buffer_secs: u64,
    ) -> Result<(), Eip155Error> {
        let now = clock.now();
        let deadline = self.deadline();
        if is_permit_valid(deadline, now, buffer_secs) {
            Ok(())
        } else {
            Err(Eip155Error::DeadlinePassed {
                deadline,
                now,
                buffer_secs,
            })
        }
    }
}

/// Signs an EIP-2612 permit for `params.value` of `params.token`.
///
/// See the module docs for the nonce race between concurrent calls.
#[cfg_attr(feature = "telemetry", instrument(skip_all, fields(token = %params.token, spender = %params.spender), err))]
pub async fn sign_erc20_permit<P, C>(
    provider: &P,
    clock: &C,
    params: &Erc20PermitParams,
) -> Result<SignedErc20Permit, Eip155Error>
where
    P: Eip1193Provider + ?Sized,
    C: Clock + ?Sized,
{
    let owner = match params.owner {
        Some(owner) => owner,
        None => resolve_signer(provider).await?,
    };
    let domain = resolve_domain(provider, params.token, &params.default_version).await?;
    let nonce = fetch_nonce(provider, params.token, owner).await?;
    let deadline = clock.now().plus_minutes(params.deadline_minutes)?;
    let message = PermitMessage {
        owner: owner.into(),
        spender: params.spender.into(),
        value: params.value,
        nonce,
        deadline,
    };
    let typed_data = permit_typed_data(&domain, message);
    let raw = provider.sign_typed_data_v4(owner, &typed_data).await?;
    let signature = EvmSignature::parse(&raw)?;
    tracing::debug!(%owner, token = %params.token, %nonce, %deadline, "Signed ERC-20 permit");
    Ok(SignedErc20Permit {
        typed_data,
        signature,
    })
}
