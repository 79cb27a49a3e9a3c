//! Staking and DeFi accessors.
//!
//! Maps raw contract results from an [`SfcCaller`] into API records. Values
//! that do not fit the record fields are reported as
//! [`SfcError::Malformed`] instead of being truncated.

use alloy::primitives::{Address, U256};

use crate::sfc::caller::SfcCaller;
use crate::sfc::types::{
    DefiParameter, DefiSettings, DelegationLock, Epoch, PendingRewards, RawLockup, SfcError,
    SfcParameter, SfcResult, StakeKind,
};

/// First epoch with stake locking available.
pub const SFC_FIRST_LOCK_EPOCH: u64 = 1600;

/// Typed read accessors over the staking contracts.
#[derive(Debug, Clone)]
pub struct SfcRepository<C> {
    caller: C,
}

impl<C: SfcCaller> SfcRepository<C> {
    pub fn new(caller: C) -> Self {
        Self { caller }
    }

    /// The underlying contract-call facade.
    pub fn caller(&self) -> &C {
        &self.caller
    }

    /// SFC version packed into a single number, e.g. `3.0.1` → `0x030001`.
    pub async fn sfc_version(&self) -> SfcResult<u64> {
        let version = self.caller.version().await.inspect_err(|e| {
            tracing::error!(severity = "critical", error = %e, "Failed to get the SFC version");
        })?;
        Ok(pack_version(version))
    }

    /// Current epoch id.
    pub async fn current_epoch(&self) -> SfcResult<u64> {
        self.parameter_u64(SfcParameter::CurrentEpoch).await
    }

    /// Current sealed epoch id.
    pub async fn current_sealed_epoch(&self) -> SfcResult<u64> {
        self.parameter_u64(SfcParameter::CurrentSealedEpoch).await
    }

    /// Snapshot of a sealed epoch.
    pub async fn epoch(&self, id: u64) -> SfcResult<Epoch> {
        let snapshot = self
            .caller
            .epoch_snapshot(U256::from(id))
            .await
            .inspect_err(|e| {
                tracing::error!(epoch = id, error = %e, "Failed to extract epoch information");
            })?;

        Ok(Epoch {
            id,
            end_time: to_u64("epoch end time", snapshot.end_time)?,
            epoch_fee: snapshot.epoch_fee,
            total_base_reward_weight: snapshot.total_base_reward_weight,
            total_tx_reward_weight: snapshot.total_tx_reward_weight,
            base_reward_per_second: snapshot.base_reward_per_second,
            stake_total_amount: snapshot.total_stake,
            total_supply: snapshot.total_supply,
        })
    }

    /// Rewards can always be claimed and restaked.
    pub async fn rewards_allowed(&self) -> SfcResult<bool> {
        tracing::debug!("Rewards lock always open");
        Ok(true)
    }

    /// Whether stake locking is enabled.
    pub async fn locking_allowed(&self) -> SfcResult<bool> {
        let epoch = self.current_sealed_epoch().await?;
        Ok(epoch >= SFC_FIRST_LOCK_EPOCH)
    }

    pub async fn total_staked(&self) -> SfcResult<U256> {
        self.parameter(SfcParameter::TotalStake).await
    }

    pub async fn min_validator_stake(&self) -> SfcResult<U256> {
        self.parameter(SfcParameter::MinSelfStake).await
    }

    pub async fn max_delegated_ratio(&self) -> SfcResult<U256> {
        self.parameter(SfcParameter::MaxDelegatedRatio).await
    }

    pub async fn min_lockup_duration(&self) -> SfcResult<U256> {
        self.parameter(SfcParameter::MinLockupDuration).await
    }

    pub async fn max_lockup_duration(&self) -> SfcResult<U256> {
        self.parameter(SfcParameter::MaxLockupDuration).await
    }

    pub async fn withdrawal_period_epochs(&self) -> SfcResult<U256> {
        self.parameter(SfcParameter::WithdrawalPeriodEpochs).await
    }

    pub async fn withdrawal_period_time(&self) -> SfcResult<U256> {
        self.parameter(SfcParameter::WithdrawalPeriodTime).await
    }

    /// Amount currently staked by `delegator` to `validator`.
    pub async fn amount_staked(&self, delegator: Address, validator: U256) -> SfcResult<U256> {
        tracing::debug!(%delegator, %validator, "Verifying amount staked");
        self.caller.stake(StakeKind::Total, delegator, validator).await
    }

    pub async fn amount_stake_locked(&self, delegator: Address, validator: U256) -> SfcResult<U256> {
        self.caller.stake(StakeKind::Locked, delegator, validator).await
    }

    pub async fn amount_stake_unlocked(
        &self,
        delegator: Address,
        validator: U256,
    ) -> SfcResult<U256> {
        self.caller.stake(StakeKind::Unlocked, delegator, validator).await
    }

    /// Penalty the delegator would pay for unlocking `amount` prematurely.
    pub async fn stake_unlock_penalty(
        &self,
        delegator: Address,
        validator: U256,
        amount: U256,
    ) -> SfcResult<U256> {
        let data = self
            .caller
            .unlock_stake_call(delegator, validator, amount)
            .await
            .inspect_err(|e| {
                tracing::error!(%delegator, %validator, %amount, error = %e, "Unlock penalty not available");
            })?;

        // A single uint256 word is expected.
        if data.len() != 32 {
            tracing::error!(
                %delegator,
                %validator,
                received = data.len(),
                "Unlock penalty response not valid"
            );
            return Err(SfcError::Malformed(format!(
                "unlock penalty: expected 32 bytes, received {}",
                data.len()
            )));
        }
        Ok(U256::from_be_slice(&data))
    }

    /// Pending rewards of a delegation.
    ///
    /// A failed call yields a zero-amount record instead of an error.
    pub async fn pending_rewards(&self, delegator: Address, validator: U256) -> PendingRewards {
        let mut rewards = PendingRewards {
            address: delegator,
            staker: validator,
            amount: U256::ZERO,
        };

        match self.caller.pending_rewards(delegator, validator).await {
            Ok(amount) => rewards.amount = amount,
            Err(e) => {
                tracing::error!(
                    severity = "critical",
                    %delegator,
                    %validator,
                    error = %e,
                    "Can not calculate pending rewards"
                );
            }
        }
        rewards
    }

    /// Lock status of a delegation.
    pub async fn delegation_lock(
        &self,
        delegator: Address,
        validator: U256,
    ) -> SfcResult<DelegationLock> {
        let lock = self
            .caller
            .lockup_info(delegator, validator)
            .await
            .inspect_err(|e| {
                tracing::error!(%delegator, %validator, error = %e, "Delegation lock query failed");
            })?;

        map_lockup(lock).inspect_err(|e| {
            tracing::error!(%delegator, %validator, error = %e, "Delegation lock details not available");
        })
    }

    /// Amount of sAXIS tokens minted against a delegation.
    pub async fn delegation_outstanding_saxis(
        &self,
        delegator: Address,
        validator: U256,
    ) -> SfcResult<U256> {
        tracing::debug!(%delegator, %validator, "Checking outstanding sAXIS");
        self.caller
            .outstanding_saxis(delegator, validator)
            .await
            .inspect_err(|e| {
                tracing::error!(severity = "critical", %delegator, %validator, error = %e, "Failed to get outstanding sAXIS");
            })
    }

    /// Whether the tokenizer allows the delegation to be withdrawn.
    pub async fn delegation_tokenizer_unlocked(
        &self,
        delegator: Address,
        validator: U256,
    ) -> SfcResult<bool> {
        tracing::debug!(%delegator, %validator, "Checking SFC tokenizer lock");
        self.caller
            .tokenizer_unlocked(delegator, validator)
            .await
            .inspect_err(|e| {
                tracing::error!(severity = "critical", %delegator, %validator, error = %e, "Failed to get SFC tokenizer lock status");
            })
    }

    /// Current fMint DeFi settings.
    pub async fn defi_configuration(&self) -> SfcResult<DefiSettings> {
        let addresses = self.caller.defi_addresses().clone();
        let minter = addresses.minter.ok_or(SfcError::NotConfigured("fMint minter"))?;

        let mint_fee_4 = self.defi_value(DefiParameter::MintFee4).await?;
        let min_collateral_ratio_4 = self.defi_value(DefiParameter::MinCollateralRatio4).await?;
        let reward_collateral_ratio_4 = self.defi_value(DefiParameter::RewardCollateralRatio4).await?;
        let correction = self.defi_value(DefiParameter::FeeDigitsCorrection).await?;
        let decimals = decimals_from_correction(to_u64("fee digits correction", correction)?);

        Ok(DefiSettings {
            fmint_contract: minter,
            fmint_address_provider: addresses.address_provider,
            fmint_token_registry: addresses.token_registry,
            fmint_reward_distribution: addresses.reward_distribution,
            fmint_collateral_pool: addresses.collateral_pool,
            fmint_debt_pool: addresses.debt_pool,
            price_oracle_aggregate: addresses.price_oracle_aggregate,
            mint_fee_4,
            min_collateral_ratio_4,
            reward_collateral_ratio_4,
            decimals,
        })
    }

    async fn defi_value(&self, parameter: DefiParameter) -> SfcResult<U256> {
        self.caller
            .defi_parameter(parameter)
            .await
            .inspect_err(|e| {
                tracing::error!(call = parameter.method(), error = %e, "Can not pull DeFi config value");
            })
    }

    async fn parameter(&self, parameter: SfcParameter) -> SfcResult<U256> {
        self.caller
            .parameter(parameter)
            .await
            .inspect_err(|e| {
                tracing::error!(call = parameter.method(), error = %e, "SFC call failed");
            })
    }

    async fn parameter_u64(&self, parameter: SfcParameter) -> SfcResult<u64> {
        let value = self.parameter(parameter).await?;
        to_u64(parameter.method(), value)
    }
}

/// Pack `[major, minor, patch]` into one number.
pub fn pack_version(version: [u8; 3]) -> u64 {
    (u64::from(version[0]) << 16) | (u64::from(version[1]) << 8) | u64::from(version[2])
}

/// Number of decimal digits represented by a fee correction factor.
pub fn decimals_from_correction(mut value: u64) -> i32 {
    let mut decimals = 0;
    while value > 1 {
        value /= 10;
        decimals += 1;
    }
    decimals
}

fn map_lockup(lock: RawLockup) -> SfcResult<DelegationLock> {
    Ok(DelegationLock {
        locked_amount: lock.locked_stake,
        locked_from_epoch: to_u64("lock start epoch", lock.from_epoch)?,
        locked_until: to_u64("lock end time", lock.end_time)?,
        duration: to_u64("lock duration", lock.duration)?,
    })
}

fn to_u64(field: &str, value: U256) -> SfcResult<u64> {
    u64::try_from(value)
        .map_err(|_| SfcError::Malformed(format!("{field} {value} does not fit into 64 bits")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_version() {
        assert_eq!(pack_version([3, 0, 1]), 0x030001);
        assert_eq!(pack_version([0, 0, 0]), 0);
        assert_eq!(pack_version([255, 255, 255]), 0xFF_FFFF);
    }

    #[test]
    fn test_decimals_from_correction() {
        assert_eq!(decimals_from_correction(0), 0);
        assert_eq!(decimals_from_correction(1), 0);
        assert_eq!(decimals_from_correction(10), 1);
        assert_eq!(decimals_from_correction(10_000), 4);
        assert_eq!(decimals_from_correction(1_000_000_000_000_000_000), 18);
    }

    #[test]
    fn test_to_u64_overflow() {
        assert_eq!(to_u64("x", U256::from(5)).unwrap(), 5);
        assert!(matches!(to_u64("x", U256::MAX), Err(SfcError::Malformed(_))));
    }
}
