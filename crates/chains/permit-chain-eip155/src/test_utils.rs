//! In-memory EIP-1193 provider for tests.
//!
//! `eth_call` is answered by selector. `eth_signTypedData_v4` parses the
//! typed-data JSON the way a wallet does and signs its digest with the first
//! Anvil development key, so signatures recover to [`OWNER`].

use alloy_dyn_abi::TypedData as DynTypedData;
use alloy_primitives::{Address, FixedBytes, U256, address};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::abi::Selector;
use crate::chain::{Eip1193Provider, ProviderError, RpcRequest};
use permit_types::util::{decode_hex, encode_hex};

pub const OWNER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
const OWNER_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn encode_uint(value: u64) -> Vec<u8> {
    U256::from(value).to_be_bytes::<32>().to_vec()
}

pub fn encode_words(values: &[U256]) -> Vec<u8> {
    values
        .iter()
        .flat_map(|v| v.to_be_bytes::<32>())
        .collect()
}

pub fn encode_string(value: &str) -> Vec<u8> {
    (value.to_string(),).abi_encode_params()
}

pub fn encode_domain(name: &str, version: &str, chain_id: u64, verifying_contract: Address) -> Vec<u8> {
    encode_domain_with_fields(0x0f, name, version, chain_id, verifying_contract)
}

pub fn encode_domain_with_fields(
    fields: u8,
    name: &str,
    version: &str,
    chain_id: u64,
    verifying_contract: Address,
) -> Vec<u8> {
    (
        FixedBytes::<1>::from([fields]),
        name.to_string(),
        version.to_string(),
        U256::from(chain_id),
        verifying_contract,
        FixedBytes::<32>::ZERO,
        Vec::<U256>::new(),
    )
        .abi_encode_params()
}

#[derive(Default)]
pub struct MockProvider {
    calls: HashMap<Selector, Vec<u8>>,
    chain_id: Option<u64>,
    accounts: Vec<Address>,
    requested_accounts: Vec<Address>,
    signer: Option<PrivateKeySigner>,
    recovery_id_v: bool,
    requests: Mutex<Vec<RpcRequest>>,
    typed_data: Mutex<Option<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_call(mut self, selector: Selector, data: Vec<u8>) -> Self {
        self.calls.insert(selector, data);
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_accounts(mut self, accounts: Vec<Address>) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn with_requested_accounts(mut self, accounts: Vec<Address>) -> Self {
        self.requested_accounts = accounts;
        self
    }

    pub fn with_signer(mut self) -> Self {
        self.signer = Some(OWNER_KEY.parse().unwrap());
        self
    }

    /// Answer with `v` as a bare recovery id (0/1), like some hardware wallets.
    pub fn with_recovery_id_v(mut self) -> Self {
        self.recovery_id_v = true;
        self
    }

    pub fn requests(&self) -> Vec<RpcRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.method).collect()
    }

    pub fn last_typed_data(&self) -> Option<String> {
        self.typed_data.lock().unwrap().clone()
    }

    fn reverted() -> ProviderError {
        ProviderError::Rejected {
            code: 3,
            message: "execution reverted".into(),
        }
    }

    fn eth_call(&self, params: &Value) -> Result<Value, ProviderError> {
        let data = decode_hex(params[0]["data"].as_str().unwrap()).unwrap();
        let selector = Selector([data[0], data[1], data[2], data[3]]);
        let ret = self.calls.get(&selector).ok_or_else(Self::reverted)?;
        Ok(json!(encode_hex(ret)))
    }

    fn sign_typed_data(&self, params: &Value) -> Result<Value, ProviderError> {
        let signer = self.signer.as_ref().ok_or(ProviderError::Rejected {
            code: 4001,
            message: "User rejected the request.".into(),
        })?;
        let json = params[1].as_str().unwrap();
        *self.typed_data.lock().unwrap() = Some(json.to_string());
        let typed_data: DynTypedData = serde_json::from_str(json).unwrap();
        let hash = typed_data.eip712_signing_hash().unwrap();
        let signature = signer.sign_hash_sync(&hash).unwrap();
        let mut bytes = signature.as_bytes();
        if self.recovery_id_v {
            bytes[64] -= 27;
        }
        Ok(json!(encode_hex(bytes)))
    }
}

#[async_trait]
impl Eip1193Provider for MockProvider {
    async fn request(&self, request: RpcRequest) -> Result<Value, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        match request.method.as_str() {
            "eth_call" => self.eth_call(&request.params),
            "eth_chainId" => self
                .chain_id
                .map(|id| json!(format!("0x{id:x}")))
                .ok_or_else(|| ProviderError::Transport("chain id unavailable".into())),
            "eth_accounts" => Ok(json!(self.accounts)),
            "eth_requestAccounts" => Ok(json!(self.requested_accounts)),
            "eth_signTypedData_v4" => self.sign_typed_data(&request.params),
            other => Err(ProviderError::Rejected {
                code: 4200,
                message: format!("unsupported method {other}"),
            }),
        }
    }
}
