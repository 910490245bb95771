//! ERC20 token contract bindings.
//!
//! Only the surface the dashboard touches: balance and decimals reads plus
//! the `transfer` write.

use alloy_sol_types::sol;

sol! {
    /// Standard ERC20 token interface
    #[sol(rpc)]
    interface IERC20 {
        /// Get token balance of an account
        function balanceOf(address account) external view returns (uint256);

        /// Get token decimals
        function decimals() external view returns (uint8);

        /// Transfer tokens to recipient
        function transfer(address recipient, uint256 amount) external returns (bool);
    }
}

#[cfg(test)]
mod tests {
    use super::IERC20;
    use alloy_sol_types::SolCall;

    #[test]
    fn test_selectors_match_erc20() {
        assert_eq!(IERC20::balanceOfCall::SELECTOR, [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(IERC20::decimalsCall::SELECTOR, [0x31, 0x3c, 0xe5, 0x67]);
        assert_eq!(IERC20::transferCall::SELECTOR, [0xa9, 0x05, 0x9c, 0xbb]);
    }
}
