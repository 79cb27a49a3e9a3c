//! Contract bindings for the read-only calls the bridge makes.

use alloy::sol;

sol! {
    /// SFC staking contract.
    #[sol(rpc)]
    contract Sfc {
        function version() external pure returns (bytes3);
        function currentEpoch() external view returns (uint256);
        function currentSealedEpoch() external view returns (uint256);
        function getEpochSnapshot(uint256 epoch) external view returns (
            uint256 endTime,
            uint256 epochFee,
            uint256 totalBaseRewardWeight,
            uint256 totalTxRewardWeight,
            uint256 baseRewardPerSecond,
            uint256 totalStake,
            uint256 totalSupply
        );
        function totalStake() external view returns (uint256);
        function minSelfStake() external view returns (uint256);
        function maxDelegatedRatio() external view returns (uint256);
        function minLockupDuration() external view returns (uint256);
        function maxLockupDuration() external view returns (uint256);
        function withdrawalPeriodEpochs() external view returns (uint256);
        function withdrawalPeriodTime() external view returns (uint256);
        function getStake(address delegator, uint256 toValidatorID) external view returns (uint256);
        function getLockedStake(address delegator, uint256 toValidatorID) external view returns (uint256);
        function getUnlockedStake(address delegator, uint256 toValidatorID) external view returns (uint256);
        function pendingRewards(address delegator, uint256 toValidatorID) external view returns (uint256);
        function getLockupInfo(address delegator, uint256 toValidatorID) external view returns (
            uint256 lockedStake,
            uint256 fromEpoch,
            uint256 endTime,
            uint256 duration
        );
        function unlockStake(uint256 toValidatorID, uint256 amount) external returns (uint256);
    }

    /// SFC tokenizer issuing sAXIS against delegations.
    #[sol(rpc)]
    contract SfcTokenizer {
        function outstandingSAXIS(address delegator, uint256 toValidatorID) external view returns (uint256);
        function allowedToWithdrawStake(address delegator, uint256 toValidatorID) external view returns (bool);
    }

    /// fMint DeFi minter.
    #[sol(rpc)]
    contract DefiFMintMinter {
        function getFMintFee4dec() external view returns (uint256);
        function getCollateralLowestDebtRatio4dec() external view returns (uint256);
        function getRewardEligibilityRatio4dec() external view returns (uint256);
        function fMintFeeDigitsCorrection() external view returns (uint256);
    }
}
