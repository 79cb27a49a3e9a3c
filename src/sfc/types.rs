//! Staking and DeFi record types and error definitions.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading contract state.
#[derive(Debug, Error)]
pub enum SfcError {
    /// The contract call failed at the RPC or ABI level.
    #[error("{call} failed: {reason}")]
    Call { call: &'static str, reason: String },

    /// The contract call timed out.
    #[error("{call} timed out after {secs} seconds")]
    Timeout { call: &'static str, secs: u64 },

    /// The response does not fit the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A required contract address is not configured.
    #[error("{0} contract not configured")]
    NotConfigured(&'static str),
}

/// Result type for contract reads.
pub type SfcResult<T> = Result<T, SfcError>;

/// Scalar SFC parameters readable without arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SfcParameter {
    CurrentEpoch,
    CurrentSealedEpoch,
    TotalStake,
    MinSelfStake,
    MaxDelegatedRatio,
    MinLockupDuration,
    MaxLockupDuration,
    WithdrawalPeriodEpochs,
    WithdrawalPeriodTime,
}

impl SfcParameter {
    /// Contract method name, used for logs and metrics.
    pub fn method(self) -> &'static str {
        match self {
            SfcParameter::CurrentEpoch => "currentEpoch",
            SfcParameter::CurrentSealedEpoch => "currentSealedEpoch",
            SfcParameter::TotalStake => "totalStake",
            SfcParameter::MinSelfStake => "minSelfStake",
            SfcParameter::MaxDelegatedRatio => "maxDelegatedRatio",
            SfcParameter::MinLockupDuration => "minLockupDuration",
            SfcParameter::MaxLockupDuration => "maxLockupDuration",
            SfcParameter::WithdrawalPeriodEpochs => "withdrawalPeriodEpochs",
            SfcParameter::WithdrawalPeriodTime => "withdrawalPeriodTime",
        }
    }
}

/// Which part of a delegation's stake to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeKind {
    Total,
    Locked,
    Unlocked,
}

impl StakeKind {
    pub fn method(self) -> &'static str {
        match self {
            StakeKind::Total => "getStake",
            StakeKind::Locked => "getLockedStake",
            StakeKind::Unlocked => "getUnlockedStake",
        }
    }
}

/// Scalar fMint minter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefiParameter {
    MintFee4,
    MinCollateralRatio4,
    RewardCollateralRatio4,
    FeeDigitsCorrection,
}

impl DefiParameter {
    pub fn method(self) -> &'static str {
        match self {
            DefiParameter::MintFee4 => "getFMintFee4dec",
            DefiParameter::MinCollateralRatio4 => "getCollateralLowestDebtRatio4dec",
            DefiParameter::RewardCollateralRatio4 => "getRewardEligibilityRatio4dec",
            DefiParameter::FeeDigitsCorrection => "fMintFeeDigitsCorrection",
        }
    }
}

/// Raw epoch snapshot as returned by the contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEpochSnapshot {
    pub end_time: U256,
    pub epoch_fee: U256,
    pub total_base_reward_weight: U256,
    pub total_tx_reward_weight: U256,
    pub base_reward_per_second: U256,
    pub total_stake: U256,
    pub total_supply: U256,
}

/// Raw lockup information as returned by the contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLockup {
    pub locked_stake: U256,
    pub from_epoch: U256,
    pub end_time: U256,
    pub duration: U256,
}

/// Sealed epoch details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epoch {
    pub id: u64,
    pub end_time: u64,
    pub epoch_fee: U256,
    pub total_base_reward_weight: U256,
    pub total_tx_reward_weight: U256,
    pub base_reward_per_second: U256,
    pub stake_total_amount: U256,
    pub total_supply: U256,
}

/// Rewards waiting to be claimed for a delegation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRewards {
    pub address: Address,
    pub staker: U256,
    pub amount: U256,
}

/// Lock applied to a delegation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationLock {
    pub locked_amount: U256,
    pub locked_from_epoch: u64,
    pub locked_until: u64,
    pub duration: u64,
}

/// fMint contract addresses known to the bridge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefiAddresses {
    pub address_provider: Option<Address>,
    pub minter: Option<Address>,
    pub token_registry: Option<Address>,
    pub reward_distribution: Option<Address>,
    pub collateral_pool: Option<Address>,
    pub debt_pool: Option<Address>,
    pub price_oracle_aggregate: Option<Address>,
}

/// Current fMint DeFi settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefiSettings {
    pub fmint_contract: Address,
    pub fmint_address_provider: Option<Address>,
    pub fmint_token_registry: Option<Address>,
    pub fmint_reward_distribution: Option<Address>,
    pub fmint_collateral_pool: Option<Address>,
    pub fmint_debt_pool: Option<Address>,
    pub price_oracle_aggregate: Option<Address>,
    pub mint_fee_4: U256,
    pub min_collateral_ratio_4: U256,
    pub reward_collateral_ratio_4: U256,
    pub decimals: i32,
}
