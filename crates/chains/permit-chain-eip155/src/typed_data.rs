//! EIP-712 typed data for `eth_signTypedData_v4`.
//!
//! Two message kinds are assembled: EIP-2612 `Permit`, signed under the
//! token's own four-field domain, and Permit2 `PermitSingle`, signed under the
//! version-less `"Permit2"` domain. The JSON produced here is exactly what the
//! wallet hashes; [`TypedData::signing_hash`] computes the same digest locally
//! through `alloy-sol-types`, so a returned signature can be checked without a
//! round trip.

use alloy_primitives::aliases::{U48, U160};
use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{Eip712Domain as SolDomain, SolStruct};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::chain::{ChecksummedAddress, RpcRequest, chain_id_number, decimal_uint};
use crate::domain::Eip712Domain;
use permit_types::timestamp::UnixTimestamp;

/// Domain name Permit2 signs under.
pub const PERMIT2_DOMAIN_NAME: &str = "Permit2";

mod sol_types {
    use alloy_sol_types::sol;

    sol! {
        struct Permit {
            address owner;
            address spender;
            uint256 value;
            uint256 nonce;
            uint256 deadline;
        }

        struct PermitDetails {
            address token;
            uint160 amount;
            uint48 expiration;
            uint48 nonce;
        }

        struct PermitSingle {
            PermitDetails details;
            address spender;
            uint256 sigDeadline;
        }
    }
}

/// One `{name, type}` entry of a typed-data struct definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeField {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: &'static str,
}

const fn field(name: &'static str, ty: &'static str) -> TypeField {
    TypeField { name, ty }
}

const EIP712_DOMAIN_FIELDS: [TypeField; 4] = [
    field("name", "string"),
    field("version", "string"),
    field("chainId", "uint256"),
    field("verifyingContract", "address"),
];

const EIP712_DOMAIN_FIELDS_NO_VERSION: [TypeField; 3] = [
    field("name", "string"),
    field("chainId", "uint256"),
    field("verifyingContract", "address"),
];

const PERMIT_FIELDS: [TypeField; 5] = [
    field("owner", "address"),
    field("spender", "address"),
    field("value", "uint256"),
    field("nonce", "uint256"),
    field("deadline", "uint256"),
];

const PERMIT_SINGLE_FIELDS: [TypeField; 3] = [
    field("details", "PermitDetails"),
    field("spender", "address"),
    field("sigDeadline", "uint256"),
];

const PERMIT_DETAILS_FIELDS: [TypeField; 4] = [
    field("token", "address"),
    field("amount", "uint160"),
    field("expiration", "uint48"),
    field("nonce", "uint48"),
];

/// The `domain` member of typed data. `version` is omitted for Permit2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(with = "chain_id_number")]
    pub chain_id: U256,
    pub verifying_contract: ChecksummedAddress,
}

impl TypedDataDomain {
    pub fn to_sol(&self) -> SolDomain {
        SolDomain::new(
            Some(Cow::Owned(self.name.clone())),
            self.version.clone().map(Cow::Owned),
            Some(self.chain_id),
            Some(self.verifying_contract.0),
            None,
        )
    }
}

impl From<&Eip712Domain> for TypedDataDomain {
    fn from(domain: &Eip712Domain) -> Self {
        Self {
            name: domain.name.clone(),
            version: Some(domain.version.clone()),
            chain_id: domain.chain_id,
            verifying_contract: domain.verifying_contract,
        }
    }
}

/// A message that can be hashed under an EIP-712 domain.
pub trait PermitStruct {
    fn eip712_signing_hash(&self, domain: &SolDomain) -> B256;
}

/// EIP-2612 `Permit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitMessage {
    pub owner: ChecksummedAddress,
    pub spender: ChecksummedAddress,
    #[serde(with = "decimal_uint")]
    pub value: U256,
    #[serde(with = "decimal_uint")]
    pub nonce: U256,
    pub deadline: UnixTimestamp,
}

impl PermitStruct for PermitMessage {
    fn eip712_signing_hash(&self, domain: &SolDomain) -> B256 {
        sol_types::Permit {
            owner: self.owner.0,
            spender: self.spender.0,
            value: self.value,
            nonce: self.nonce,
            deadline: U256::from(self.deadline.as_secs()),
        }
        .eip712_signing_hash(domain)
    }
}

/// Permit2 `PermitDetails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitDetailsMessage {
    pub token: ChecksummedAddress,
    #[serde(with = "decimal_uint")]
    pub amount: U160,
    #[serde(with = "decimal_uint")]
    pub expiration: U48,
    #[serde(with = "decimal_uint")]
    pub nonce: U48,
}

/// Permit2 `PermitSingle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitSingleMessage {
    pub details: PermitDetailsMessage,
    pub spender: ChecksummedAddress,
    pub sig_deadline: UnixTimestamp,
}

impl PermitStruct for PermitSingleMessage {
    fn eip712_signing_hash(&self, domain: &SolDomain) -> B256 {
        sol_types::PermitSingle {
            details: sol_types::PermitDetails {
                token: self.details.token.0,
                amount: self.details.amount,
                expiration: self.details.expiration,
                nonce: self.details.nonce,
            },
            spender: self.spender.0,
            sigDeadline: U256::from(self.sig_deadline.as_secs()),
        }
        .eip712_signing_hash(domain)
    }
}

/// `{types, primaryType, domain, message}` in `eth_signTypedData_v4` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData<M> {
    pub types: BTreeMap<&'static str, Vec<TypeField>>,
    pub primary_type: &'static str,
    pub domain: TypedDataDomain,
    pub message: M,
}

impl<M: PermitStruct> TypedData<M> {
    /// The digest the wallet signs.
    pub fn signing_hash(&self) -> B256 {
        self.message.eip712_signing_hash(&self.domain.to_sol())
    }
}

/// EIP-2612 typed data under the token's resolved domain.
pub fn permit_typed_data(domain: &Eip712Domain, message: PermitMessage) -> TypedData<PermitMessage> {
    let types = BTreeMap::from([
        ("EIP712Domain", EIP712_DOMAIN_FIELDS.to_vec()),
        ("Permit", PERMIT_FIELDS.to_vec()),
    ]);
    TypedData {
        types,
        primary_type: "Permit",
        domain: domain.into(),
        message,
    }
}

/// Permit2 `PermitSingle` typed data. The domain has no `version`.
pub fn permit_single_typed_data(
    chain_id: U256,
    permit2: Address,
    message: PermitSingleMessage,
) -> TypedData<PermitSingleMessage> {
    let types = BTreeMap::from([
        ("EIP712Domain", EIP712_DOMAIN_FIELDS_NO_VERSION.to_vec()),
        ("PermitSingle", PERMIT_SINGLE_FIELDS.to_vec()),
        ("PermitDetails", PERMIT_DETAILS_FIELDS.to_vec()),
    ]);
    TypedData {
        types,
        primary_type: "PermitSingle",
        domain: TypedDataDomain {
            name: PERMIT2_DOMAIN_NAME.to_string(),
            version: None,
            chain_id,
            verifying_contract: permit2.into(),
        },
        message,
    }
}

/// `{method: "eth_signTypedData_v4", params: [signer, json]}`.
///
/// The typed data travels as a JSON string, not as an object.
pub fn sign_typed_data_request<M: Serialize>(
    signer: Address,
    typed_data: &TypedData<M>,
) -> Result<RpcRequest, serde_json::Error> {
    let json = serde_json::to_string(typed_data)?;
    Ok(RpcRequest::new(
        "eth_signTypedData_v4",
        serde_json::json!([ChecksummedAddress(signer), json]),
    ))
}
