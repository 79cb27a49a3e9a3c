//! Contract-call facade.
//!
//! # Responsibilities
//! - Execute read-only calls against the SFC, tokenizer and fMint contracts
//! - Bound every call with the configured timeout
//! - Return raw numeric/address results; mapping happens in the repository

use std::fmt::Display;
use std::future::{Future, IntoFuture};
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use tokio::time::timeout;

use crate::config::BridgeConfig;
use crate::observability::metrics;
use crate::sfc::contracts::{DefiFMintMinter, Sfc, SfcTokenizer};
use crate::sfc::types::{
    DefiAddresses, DefiParameter, RawEpochSnapshot, RawLockup, SfcError, SfcParameter, SfcResult,
    StakeKind,
};

/// Raw read access to the staking and DeFi contracts.
pub trait SfcCaller: Send + Sync {
    /// The three version bytes of the SFC contract.
    fn version(&self) -> impl Future<Output = SfcResult<[u8; 3]>> + Send;

    fn parameter(&self, parameter: SfcParameter) -> impl Future<Output = SfcResult<U256>> + Send;

    fn epoch_snapshot(&self, epoch: U256)
        -> impl Future<Output = SfcResult<RawEpochSnapshot>> + Send;

    fn stake(
        &self,
        kind: StakeKind,
        delegator: Address,
        validator: U256,
    ) -> impl Future<Output = SfcResult<U256>> + Send;

    fn pending_rewards(
        &self,
        delegator: Address,
        validator: U256,
    ) -> impl Future<Output = SfcResult<U256>> + Send;

    fn lockup_info(
        &self,
        delegator: Address,
        validator: U256,
    ) -> impl Future<Output = SfcResult<RawLockup>> + Send;

    /// Raw output of `unlockStake` executed as a view call from `delegator`.
    fn unlock_stake_call(
        &self,
        delegator: Address,
        validator: U256,
        amount: U256,
    ) -> impl Future<Output = SfcResult<Bytes>> + Send;

    fn outstanding_saxis(
        &self,
        delegator: Address,
        validator: U256,
    ) -> impl Future<Output = SfcResult<U256>> + Send;

    fn tokenizer_unlocked(
        &self,
        delegator: Address,
        validator: U256,
    ) -> impl Future<Output = SfcResult<bool>> + Send;

    fn defi_parameter(
        &self,
        parameter: DefiParameter,
    ) -> impl Future<Output = SfcResult<U256>> + Send;

    /// Configured fMint addresses.
    fn defi_addresses(&self) -> &DefiAddresses;
}

/// [`SfcCaller`] over an alloy provider.
#[derive(Clone)]
pub struct AlloySfc {
    provider: DynProvider,
    sfc: Address,
    tokenizer: Option<Address>,
    defi: DefiAddresses,
    call_timeout: Duration,
}

impl AlloySfc {
    /// Build the facade from validated configuration.
    pub fn from_config(provider: DynProvider, config: &BridgeConfig) -> SfcResult<Self> {
        let sfc = parse_required("sfc.contract", &config.sfc.contract)?;
        let tokenizer = parse_optional("sfc.tokenizer", &config.sfc.tokenizer)?;

        let d = &config.defi;
        let defi = DefiAddresses {
            address_provider: parse_optional("defi.address_provider", &d.address_provider)?,
            minter: parse_optional("defi.minter", &d.minter)?,
            token_registry: parse_optional("defi.token_registry", &d.token_registry)?,
            reward_distribution: parse_optional("defi.reward_distribution", &d.reward_distribution)?,
            collateral_pool: parse_optional("defi.collateral_pool", &d.collateral_pool)?,
            debt_pool: parse_optional("defi.debt_pool", &d.debt_pool)?,
            price_oracle_aggregate: parse_optional(
                "defi.price_oracle_aggregate",
                &d.price_oracle_aggregate,
            )?,
        };

        Ok(Self {
            provider,
            sfc,
            tokenizer,
            defi,
            call_timeout: Duration::from_secs(config.rpc.call_timeout_secs),
        })
    }

    /// Address of the SFC contract.
    pub fn sfc_address(&self) -> Address {
        self.sfc
    }

    async fn call<F, T, E>(&self, call: &'static str, fut: F) -> SfcResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: Display,
    {
        match timeout(self.call_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                metrics::record_call_failure(call);
                Err(SfcError::Call {
                    call,
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                metrics::record_call_failure(call);
                Err(SfcError::Timeout {
                    call,
                    secs: self.call_timeout.as_secs(),
                })
            }
        }
    }

    fn sfc(&self) -> Sfc::SfcInstance<DynProvider> {
        Sfc::new(self.sfc, self.provider.clone())
    }

    fn tokenizer(&self) -> SfcResult<SfcTokenizer::SfcTokenizerInstance<DynProvider>> {
        let address = self.tokenizer.ok_or(SfcError::NotConfigured("SFC tokenizer"))?;
        Ok(SfcTokenizer::new(address, self.provider.clone()))
    }

    fn minter(&self) -> SfcResult<DefiFMintMinter::DefiFMintMinterInstance<DynProvider>> {
        let address = self.defi.minter.ok_or(SfcError::NotConfigured("fMint minter"))?;
        Ok(DefiFMintMinter::new(address, self.provider.clone()))
    }
}

impl std::fmt::Debug for AlloySfc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlloySfc")
            .field("sfc", &self.sfc)
            .field("tokenizer", &self.tokenizer)
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

impl SfcCaller for AlloySfc {
    async fn version(&self) -> SfcResult<[u8; 3]> {
        let sfc = self.sfc();
        let version = self.call("version", sfc.version().call()).await?;
        Ok(version.0)
    }

    async fn parameter(&self, parameter: SfcParameter) -> SfcResult<U256> {
        let sfc = self.sfc();
        let method = parameter.method();
        match parameter {
            SfcParameter::CurrentEpoch => self.call(method, sfc.currentEpoch().call()).await,
            SfcParameter::CurrentSealedEpoch => {
                self.call(method, sfc.currentSealedEpoch().call()).await
            }
            SfcParameter::TotalStake => self.call(method, sfc.totalStake().call()).await,
            SfcParameter::MinSelfStake => self.call(method, sfc.minSelfStake().call()).await,
            SfcParameter::MaxDelegatedRatio => {
                self.call(method, sfc.maxDelegatedRatio().call()).await
            }
            SfcParameter::MinLockupDuration => {
                self.call(method, sfc.minLockupDuration().call()).await
            }
            SfcParameter::MaxLockupDuration => {
                self.call(method, sfc.maxLockupDuration().call()).await
            }
            SfcParameter::WithdrawalPeriodEpochs => {
                self.call(method, sfc.withdrawalPeriodEpochs().call()).await
            }
            SfcParameter::WithdrawalPeriodTime => {
                self.call(method, sfc.withdrawalPeriodTime().call()).await
            }
        }
    }

    async fn epoch_snapshot(&self, epoch: U256) -> SfcResult<RawEpochSnapshot> {
        let sfc = self.sfc();
        let snapshot = self
            .call("getEpochSnapshot", sfc.getEpochSnapshot(epoch).call())
            .await?;
        Ok(RawEpochSnapshot {
            end_time: snapshot.endTime,
            epoch_fee: snapshot.epochFee,
            total_base_reward_weight: snapshot.totalBaseRewardWeight,
            total_tx_reward_weight: snapshot.totalTxRewardWeight,
            base_reward_per_second: snapshot.baseRewardPerSecond,
            total_stake: snapshot.totalStake,
            total_supply: snapshot.totalSupply,
        })
    }

    async fn stake(&self, kind: StakeKind, delegator: Address, validator: U256) -> SfcResult<U256> {
        let sfc = self.sfc();
        let method = kind.method();
        match kind {
            StakeKind::Total => {
                self.call(method, sfc.getStake(delegator, validator).call()).await
            }
            StakeKind::Locked => {
                self.call(method, sfc.getLockedStake(delegator, validator).call()).await
            }
            StakeKind::Unlocked => {
                self.call(method, sfc.getUnlockedStake(delegator, validator).call()).await
            }
        }
    }

    async fn pending_rewards(&self, delegator: Address, validator: U256) -> SfcResult<U256> {
        let sfc = self.sfc();
        let amount = self
            .call("pendingRewards", sfc.pendingRewards(delegator, validator).call())
            .await?;
        Ok(amount)
    }

    async fn lockup_info(&self, delegator: Address, validator: U256) -> SfcResult<RawLockup> {
        let sfc = self.sfc();
        let lock = self
            .call("getLockupInfo", sfc.getLockupInfo(delegator, validator).call())
            .await?;
        Ok(RawLockup {
            locked_stake: lock.lockedStake,
            from_epoch: lock.fromEpoch,
            end_time: lock.endTime,
            duration: lock.duration,
        })
    }

    async fn unlock_stake_call(
        &self,
        delegator: Address,
        validator: U256,
        amount: U256,
    ) -> SfcResult<Bytes> {
        let input = Sfc::unlockStakeCall {
            toValidatorID: validator,
            amount,
        }
        .abi_encode();
        let tx = TransactionRequest::default()
            .with_from(delegator)
            .with_to(self.sfc)
            .with_input(input);
        self.call("unlockStake", self.provider.call(tx)).await
    }

    async fn outstanding_saxis(&self, delegator: Address, validator: U256) -> SfcResult<U256> {
        let tokenizer = self.tokenizer()?;
        let amount = self
            .call(
                "outstandingSAXIS",
                tokenizer.outstandingSAXIS(delegator, validator).call(),
            )
            .await?;
        Ok(amount)
    }

    async fn tokenizer_unlocked(&self, delegator: Address, validator: U256) -> SfcResult<bool> {
        let tokenizer = self.tokenizer()?;
        let allowed = self
            .call(
                "allowedToWithdrawStake",
                tokenizer.allowedToWithdrawStake(delegator, validator).call(),
            )
            .await?;
        Ok(allowed)
    }

    async fn defi_parameter(&self, parameter: DefiParameter) -> SfcResult<U256> {
        let minter = self.minter()?;
        let method = parameter.method();
        match parameter {
            DefiParameter::MintFee4 => self.call(method, minter.getFMintFee4dec().call()).await,
            DefiParameter::MinCollateralRatio4 => {
                self.call(method, minter.getCollateralLowestDebtRatio4dec().call())
                    .await
            }
            DefiParameter::RewardCollateralRatio4 => {
                self.call(method, minter.getRewardEligibilityRatio4dec().call())
                    .await
            }
            DefiParameter::FeeDigitsCorrection => {
                self.call(method, minter.fMintFeeDigitsCorrection().call())
                    .await
            }
        }
    }

    fn defi_addresses(&self) -> &DefiAddresses {
        &self.defi
    }
}

fn parse_required(field: &'static str, value: &str) -> SfcResult<Address> {
    value
        .parse()
        .map_err(|e| SfcError::Malformed(format!("{field} '{value}': {e}")))
}

fn parse_optional(field: &'static str, value: &str) -> SfcResult<Option<Address>> {
    if value.is_empty() {
        return Ok(None);
    }
    parse_required(field, value).map(Some)
}
