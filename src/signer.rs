//! [`PermitSigner`] applies a [`SigningConfig`] to both signing pipelines.

use alloy_primitives::aliases::U160;
use alloy_primitives::{Address, U256};

use permit_chain_eip155::allowance::{Permit2Allowance, is_allowance_sufficient};
use permit_chain_eip155::chain::Eip1193Provider;
use permit_chain_eip155::erc20::{
    Erc20PermitParams, SignedErc20Permit, fetch_erc20_allowance, sign_erc20_permit,
};
use permit_chain_eip155::permit2::{
    PERMIT2_ADDRESS, Permit2PermitParams, SignedPermit2Single, fetch_permit2_allowance,
    sign_permit2_single,
};
use permit_chain_eip155::Eip155Error;
use permit_chain_solana::chain::Address as SolanaAddress;
use permit_chain_solana::delegate::{
    DelegatePaymentTxResponse, SignedDelegateTx, sign_delegate_transaction,
};
use permit_chain_solana::registry::WalletRegistry;
use permit_chain_solana::wallet::SolanaWallet;
use permit_chain_solana::SolanaSigningError;
use permit_types::config::{ConfigError, SigningConfig};
use permit_types::timestamp::{Clock, SystemClock};

/// Entry point for callers that want configured defaults instead of
/// assembling per-call parameters.
#[derive(Debug, Clone)]
pub struct PermitSigner<C = SystemClock> {
    config: SigningConfig,
    clock: C,
}

impl PermitSigner<SystemClock> {
    pub fn new(config: SigningConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Uses [`SigningConfig::load`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(SigningConfig::load()?))
    }
}

impl Default for PermitSigner<SystemClock> {
    fn default() -> Self {
        Self::new(SigningConfig::default())
    }
}

impl<C: Clock> PermitSigner<C> {
    pub fn with_clock(config: SigningConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The configured Permit2 deployment, or the canonical one.
    pub fn permit2_address(&self) -> Address {
        self.config.permit2_address().unwrap_or(PERMIT2_ADDRESS)
    }

    /// Permit parameters with the configured deadline and default domain version.
    pub fn erc20_permit_params(
        &self,
        token: Address,
        spender: Address,
        value: U256,
        owner: Option<Address>,
    ) -> Erc20PermitParams {
        let params = Erc20PermitParams::new(token, spender, value)
            .with_deadline_minutes(self.config.permit_deadline_minutes)
            .with_default_version(self.config.default_domain_version.clone());
        match owner {
            Some(owner) => params.with_owner(owner),
            None => params,
        }
    }

    pub fn permit2_params(
        &self,
        owner: Address,
        token: Address,
        spender: Address,
        amount: U160,
    ) -> Permit2PermitParams {
        Permit2PermitParams::new(owner, token, spender, amount)
            .with_expiration_days(self.config.permit2_expiration_days)
            .with_sig_deadline_minutes(self.config.permit2_sig_deadline_minutes)
            .with_permit2(self.permit2_address())
    }

    pub async fn sign_erc20_permit<P: Eip1193Provider + ?Sized>(
        &self,
        provider: &P,
        token: Address,
        spender: Address,
        value: U256,
        owner: Option<Address>,
    ) -> Result<SignedErc20Permit, Eip155Error> {
        let params = self.erc20_permit_params(token, spender, value, owner);
        sign_erc20_permit(provider, &self.clock, &params).await
    }

    /// Fails with a stale-data error once the permit is within the configured
    /// validity buffer of its deadline.
    pub fn ensure_permit_fresh(&self, permit: &SignedErc20Permit) -> Result<(), Eip155Error> {
        permit.ensure_fresh(&self.clock, self.config.permit_validity_buffer_secs)
    }

    pub async fn sign_permit2_single<P: Eip1193Provider + ?Sized>(
        &self,
        provider: &P,
        owner: Address,
        token: Address,
        spender: Address,
        amount: U160,
    ) -> Result<SignedPermit2Single, Eip155Error> {
        let params = self.permit2_params(owner, token, spender, amount);
        sign_permit2_single(provider, &self.clock, &params).await
    }

    /// Whether the owner's plain ERC-20 allowance to `spender` covers `required`.
    pub async fn has_erc20_allowance<P: Eip1193Provider + ?Sized>(
        &self,
        provider: &P,
        token: Address,
        owner: Address,
        spender: Address,
        required: U256,
    ) -> Result<bool, Eip155Error> {
        let allowance = fetch_erc20_allowance(provider, token, owner, spender).await?;
        Ok(is_allowance_sufficient(allowance, required))
    }

    /// Whether an existing Permit2 allowance covers `required` for at least
    /// the configured buffer, so no new `PermitSingle` is needed.
    pub async fn has_permit2_allowance<P: Eip1193Provider + ?Sized>(
        &self,
        provider: &P,
        owner: Address,
        token: Address,
        spender: Address,
        required: U256,
    ) -> Result<bool, Eip155Error> {
        let allowance: Permit2Allowance =
            fetch_permit2_allowance(provider, self.permit2_address(), owner, token, spender)
                .await?;
        Ok(allowance.is_sufficient(
            required,
            self.clock.now(),
            self.config.permit2_allowance_buffer_secs,
        ))
    }

    pub async fn sign_delegate_transaction<W: SolanaWallet + ?Sized>(
        &self,
        wallet: &W,
        envelope: &DelegatePaymentTxResponse,
    ) -> Result<SignedDelegateTx, SolanaSigningError> {
        sign_delegate_transaction(wallet, envelope, &self.clock, self.config.blockhash_buffer_ms)
            .await
    }

    /// Connects the registered wallet for `expected`, then signs with it.
    pub async fn sign_delegate_with_registry(
        &self,
        registry: &WalletRegistry,
        expected: &SolanaAddress,
        envelope: &DelegatePaymentTxResponse,
    ) -> Result<SignedDelegateTx, SolanaSigningError> {
        let (kind, wallet) = registry.connect_wallet(expected).await?;
        tracing::debug!(wallet = %kind, signer = %expected, "Signing delegate approval");
        self.sign_delegate_transaction(&*wallet, envelope).await
    }
}
