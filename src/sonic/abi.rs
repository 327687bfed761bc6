//! Fixed interfaces for the deployed Guardian contracts. Every request
//! method on the client maps one-to-one onto a function declared here;
//! there is no dynamic ABI resolution.

use alloy::sol;

sol! {
    /// Tuple shape returned by `getUserRequests`.
    struct StoredRequest {
        address user;
        string target;
        uint256 payment;
        bool completed;
        uint256 riskScore;
        string analysis;
        uint256 timestamp;
    }

    #[sol(rpc)]
    interface IGuardian {
        // State-mutating requests. No native value attached; the fee is
        // deducted in S tokens inside the contract.
        function requestContractAnalysis(string calldata target) external;
        function requestTokenomicsAnalysis(string calldata target) external;
        function requestSocialAnalysis(string calldata target) external;
        function requestMonitoring(string calldata target) external;

        function getUserRequests(address user) external view returns (StoredRequest[] memory requests);

        // Introspection helpers
        function getSTokenAddress() external view returns (address token);
        function getContractSTokenBalance() external view returns (uint256 balance);
        function getUserSTokenBalance(address user) external view returns (uint256 balance);
    }

    #[sol(rpc)]
    interface ISToken {
        function balanceOf(address holder) external view returns (uint256 balance);
        function totalSupply() external view returns (uint256 supply);
        function getFeatureCost() external view returns (uint256 cost);
        function transfer(address to, uint256 amount) external returns (bool ok);
        function mint(address to, uint256 amount) external;
        function authorizeContract(address target, bool authorized) external;
    }

    #[sol(rpc)]
    interface IUniversal {
        function sendMessage(string calldata message) external;
    }
}
