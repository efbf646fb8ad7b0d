//! The EIP-1193 boundary.
//!
//! The host wallet (an injected browser provider, a JSON-RPC bridge, a test
//! double) only has to implement [`Eip1193Provider::request`]. Everything the
//! signing flows need is layered on top by [`Eip1193ProviderExt`], which turns
//! provider failures into [`Eip155Error::Rpc`] and unexpected result shapes
//! into [`Eip155Error::MalformedResponse`].

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::abi::{CallRequest, parse_address};
use crate::error::Eip155Error;
use crate::typed_data::{TypedData, sign_typed_data_request};
use permit_types::util::{decode_hex, strip_hex_prefix};

/// A single `request({method, params})` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// The provider (or the user) rejected the request, with an EIP-1193 error code.
    #[error("Request rejected ({code}): {message}")]
    Rejected { code: i64, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError>;
}

#[async_trait]
impl<T: Eip1193Provider + ?Sized> Eip1193Provider for Arc<T> {
    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError> {
        (**self).request(request).await
    }
}

#[async_trait]
impl<T: Eip1193Provider + ?Sized> Eip1193Provider for &T {
    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError> {
        (**self).request(request).await
    }
}

fn malformed(method: &'static str, reason: impl Into<String>) -> Eip155Error {
    Eip155Error::MalformedResponse {
        method,
        reason: reason.into(),
    }
}

/// Typed helpers over the raw `request` call.
#[async_trait]
pub trait Eip1193ProviderExt: Eip1193Provider {
    async fn call_method(&self, method: &'static str, params: Value) -> Result<Value, Eip155Error> {
        tracing::debug!(method, "provider request");
        self.request(RpcRequest::new(method, params))
            .await
            .map_err(|source| Eip155Error::Rpc { method, source })
    }

    /// `eth_call` against the latest block, returning the raw ABI bytes.
    async fn eth_call(&self, call: &CallRequest) -> Result<Bytes, Eip155Error> {
        let result = self.call_method("eth_call", json!([call, "latest"])).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| malformed("eth_call", format!("expected hex string, got {result}")))?;
        decode_hex(hex)
            .map(Bytes::from)
            .map_err(|e| malformed("eth_call", e.to_string()))
    }

    /// `eth_chainId`, a hex quantity such as `"0x2105"`.
    async fn chain_id(&self) -> Result<u64, Eip155Error> {
        let result = self.call_method("eth_chainId", json!([])).await?;
        match &result {
            Value::String(s) => u64::from_str_radix(strip_hex_prefix(s), 16)
                .map_err(|e| malformed("eth_chainId", format!("{s}: {e}"))),
            // Some bridges answer with a plain number.
            Value::Number(n) => n
                .as_u64()
                .ok_or_else(|| malformed("eth_chainId", format!("not a u64: {n}"))),
            other => Err(malformed("eth_chainId", format!("unexpected value {other}"))),
        }
    }

    /// Accounts already exposed to the caller, without prompting.
    async fn accounts(&self) -> Result<Vec<Address>, Eip155Error> {
        let result = self.call_method("eth_accounts", json!([])).await?;
        parse_accounts("eth_accounts", result)
    }

    /// Accounts after asking the user to connect.
    async fn request_accounts(&self) -> Result<Vec<Address>, Eip155Error> {
        let result = self.call_method("eth_requestAccounts", json!([])).await?;
        parse_accounts("eth_requestAccounts", result)
    }

    /// `eth_signTypedData_v4`; returns the raw hex signature.
    async fn sign_typed_data_v4<M>(
        &self,
        signer: Address,
        typed_data: &TypedData<M>,
    ) -> Result<String, Eip155Error>
    where
        M: Serialize + Sync,
    {
        let request = sign_typed_data_request(signer, typed_data)?;
        let method = "eth_signTypedData_v4";
        tracing::debug!(method, %signer, "provider request");
        let result = self
            .request(request)
            .await
            .map_err(|source| Eip155Error::Rpc { method, source })?;
        match result {
            Value::String(signature) => Ok(signature),
            other => Err(malformed(method, format!("expected hex string, got {other}"))),
        }
    }
}

impl<P: Eip1193Provider + ?Sized> Eip1193ProviderExt for P {}

fn parse_accounts(method: &'static str, result: Value) -> Result<Vec<Address>, Eip155Error> {
    let Value::Array(items) = result else {
        return Err(malformed(method, format!("expected array, got {result}")));
    };
    items
        .iter()
        .map(|item| {
            let s = item
                .as_str()
                .ok_or_else(|| malformed(method, format!("expected address string, got {item}")))?;
            parse_address(s).map_err(|e| malformed(method, e.to_string()))
        })
        .collect()
}
