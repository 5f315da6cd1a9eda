//! Minimal ABI for the VapeGame contract.
//!
//! Only the view functions and events the relay touches are declared.

#![allow(missing_docs, missing_debug_implementations)]

use alloy::sol;

sol! {
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    contract VapeGame {
        event TookAHit(
            address indexed user,
            uint256 amount,
            uint256 vapeTokenValue,
            uint256 potValueETH,
            uint256 lottoValueETH,
            uint256 totalDividendsValueETH,
            uint256 nextHitPrice
        );

        event TookTheLastHit(address indexed user, uint256 amount);

        function minInvest() external view returns (uint256);
        function potValueETH() external view returns (uint256);
        function lottoValueETH() external view returns (uint256);
        function totalDividendsValueETH() external view returns (uint256);
        function lastPurchasedTime() external view returns (uint256);
        function lastPurchasedAddress() external view returns (address);
        function GAME_TIME() external view returns (uint256);
        function numHits() external view returns (uint256);
    }
}
