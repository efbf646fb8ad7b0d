//! Per-token EIP-712 domain resolution.
//!
//! A token's domain version is never assumed. EIP-5267 `eip712Domain()` is
//! tried first; tokens that predate it are resolved field by field from
//! `name()`, `version()` and `eth_chainId`. Nothing is cached: every signing
//! call resolves afresh.

use alloy_primitives::{Address, U256};
use serde::Serialize;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::abi::{
    Eip5267Domain, decode_eip712_domain, decode_string, eip712_domain_call, name_call,
    version_call,
};
use crate::chain::{ChecksummedAddress, Eip1193Provider, Eip1193ProviderExt, chain_id_number};
use crate::error::Eip155Error;

/// Domain version used when a token exposes neither `eip712Domain()` nor `version()`.
pub const DEFAULT_DOMAIN_VERSION: &str = "1";

/// EIP-5267 `fields` bits for `name`, `version` and `chainId`.
const REQUIRED_DOMAIN_FIELDS: u8 = 0x01 | 0x02 | 0x04;

/// A token's EIP-2612 signing domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
    pub name: String,
    pub version: String,
    #[serde(with = "chain_id_number")]
    pub chain_id: U256,
    pub verifying_contract: ChecksummedAddress,
}

/// `token.eip712Domain()`, fully decoded.
pub async fn fetch_eip5267_domain<P: Eip1193Provider + ?Sized>(
    provider: &P,
    token: Address,
) -> Result<Eip5267Domain, Eip155Error> {
    let data = provider.eth_call(&eip712_domain_call(token)).await?;
    Ok(decode_eip712_domain(&data)?)
}

/// `token.name()`
pub async fn fetch_name<P: Eip1193Provider + ?Sized>(
    provider: &P,
    token: Address,
) -> Result<String, Eip155Error> {
    let data = provider.eth_call(&name_call(token)).await?;
    Ok(decode_string(&data)?)
}

/// `token.version()`
pub async fn fetch_version<P: Eip1193Provider + ?Sized>(
    provider: &P,
    token: Address,
) -> Result<String, Eip155Error> {
    let data = provider.eth_call(&version_call(token)).await?;
    Ok(decode_string(&data)?)
}

/// Resolves the signing domain of `token`.
///
/// `verifyingContract` is always the token address. An `eip712Domain()`
/// answer whose `fields` bitmap leaves out `name`, `version` or `chainId` is
/// not used; the token is then resolved field by field. Only `name()` and
/// `eth_chainId` failures on the fallback path are fatal; they surface as
/// [`Eip155Error::DomainResolution`].
#[cfg_attr(feature = "telemetry", instrument(skip_all, fields(token = %token), err))]
pub async fn resolve_domain<P: Eip1193Provider + ?Sized>(
    provider: &P,
    token: Address,
    default_version: &str,
) -> Result<Eip712Domain, Eip155Error> {
    match fetch_eip5267_domain(provider, token).await {
        Ok(onchain) if onchain.fields & REQUIRED_DOMAIN_FIELDS != REQUIRED_DOMAIN_FIELDS => {
            tracing::warn!(
                %token,
                fields = onchain.fields,
                "eip712Domain() omits name, version or chainId, resolving name/version/chainId"
            );
        }
        Ok(onchain) => {
            if onchain.verifying_contract != Address::ZERO && onchain.verifying_contract != token {
                tracing::warn!(
                    %token,
                    reported = %onchain.verifying_contract,
                    "eip712Domain() reports a different verifying contract; signing against the token address"
                );
            }
            return Ok(Eip712Domain {
                name: onchain.name,
                version: onchain.version,
                chain_id: onchain.chain_id,
                verifying_contract: token.into(),
            });
        }
        Err(error) => {
            tracing::warn!(%token, %error, "eip712Domain() unavailable, resolving name/version/chainId");
        }
    }
    resolve_domain_fields(provider, token, default_version)
        .await
        .map_err(|source| Eip155Error::DomainResolution {
            token,
            source: Box::new(source),
        })
}

async fn resolve_domain_fields<P: Eip1193Provider + ?Sized>(
    provider: &P,
    token: Address,
    default_version: &str,
) -> Result<Eip712Domain, Eip155Error> {
    let name = fetch_name(provider, token).await?;
    let version = match fetch_version(provider, token).await {
        Ok(version) => version,
        Err(error) => {
            tracing::warn!(%token, %error, default_version, "version() unavailable, using default");
            default_version.to_string()
        }
    };
    let chain_id = provider.chain_id().await?;
    Ok(Eip712Domain {
        name,
        version,
        chain_id: U256::from(chain_id),
        verifying_contract: token.into(),
    })
}
