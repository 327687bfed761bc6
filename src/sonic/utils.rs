use crate::error::GuardianError;
use alloy::primitives::{
    utils::{format_ether, parse_ether},
    Address, U256,
};
use std::str::FromStr;

/// Validates and normalizes an address supplied as text
pub fn validate_address(address: &str) -> Result<Address, GuardianError> {
    let address = address.trim();

    if address.is_empty() {
        return Err(GuardianError::config("address cannot be empty"));
    }

    if !address.starts_with("0x") && !address.starts_with("0X") {
        return Err(GuardianError::config(format!(
            "invalid address format: '{}'. Addresses must start with '0x'",
            address
        )));
    }

    if address.len() != 42 {
        return Err(GuardianError::config(format!(
            "invalid address length: '{}'. Addresses must be exactly 42 characters (0x + 40 hex characters)",
            address
        )));
    }

    let hex_part = &address[2..];
    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(GuardianError::config(format!(
            "invalid address format: '{}'. Contains non-hexadecimal characters",
            address
        )));
    }

    Address::from_str(address)
        .map_err(|e| GuardianError::config(format!("invalid address '{}': {}", address, e)))
}

/// Formats a wei-denominated amount as whole S for display. Numeric values
/// never pass through floating point; this is string conversion only.
pub fn format_s(amount: U256) -> String {
    format_ether(amount)
}

/// Parses a human-readable S amount (18 decimals) into wei.
pub fn parse_s(amount: &str) -> Result<U256, GuardianError> {
    parse_ether(amount)
        .map_err(|e| GuardianError::config(format!("invalid S amount '{}': {}", amount, e)))
}

/// Builds a `Submission` error from a raw RPC failure, attaching a
/// friendlier summary plus whatever structure can be recovered from the
/// transport's message (revert reason, provider error code).
pub fn submission_failure(raw: &str) -> GuardianError {
    let message = interpret_rpc_error(raw);
    GuardianError::Submission {
        message,
        revert_reason: extract_revert_reason(raw),
        code: extract_error_code(raw),
    }
}

fn extract_revert_reason(error: &str) -> Option<String> {
    let idx = error.find("execution reverted")?;
    let tail = &error["execution reverted".len() + idx..];
    let reason = tail
        .trim_start_matches(|c| c == ':' || c == ' ')
        .split(|c| c == '\n' || c == '"')
        .next()
        .unwrap_or("")
        .trim();
    if reason.is_empty() {
        None
    } else {
        Some(reason.to_string())
    }
}

fn extract_error_code(error: &str) -> Option<i64> {
    let idx = error.find("error code ")?;
    let tail = &error[idx + "error code ".len()..];
    let digits: String = tail
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    digits.parse().ok()
}

/// Creates user-friendly error messages for common RPC errors
pub fn interpret_rpc_error(error: &str) -> String {
    if error.contains("execution reverted") {
        "Transaction failed: The contract function reverted execution. This usually means the function's requirements were not met or an assertion failed.".to_string()
    } else if error.contains("insufficient funds") {
        "Transaction failed: Insufficient funds to cover gas costs. Make sure your account has enough S for gas fees.".to_string()
    } else if error.contains("gas required exceeds allowance") {
        "Transaction failed: Gas limit too low. Try increasing the gas limit for this transaction."
            .to_string()
    } else if error.contains("nonce too low") {
        "Transaction failed: Nonce too low. This usually means another transaction was already mined with this nonce.".to_string()
    } else if error.contains("replacement transaction underpriced") {
        "Transaction failed: Gas price too low to replace pending transaction. Increase the gas price.".to_string()
    } else if error.contains("connection refused") || error.contains("network unreachable") {
        "Network error: Cannot connect to RPC endpoint. Check your internet connection and RPC URL configuration.".to_string()
    } else if error.contains("timeout") {
        "Network error: Request timed out. The RPC endpoint may be overloaded or unreachable."
            .to_string()
    } else if error.contains("rate limit") {
        "Rate limit error: Too many requests to the RPC endpoint. Try again in a few moments or use a different endpoint.".to_string()
    } else {
        format!("RPC error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_address() {
        // Valid addresses
        assert!(validate_address("0x742d35Cc6435C9c1c72c5E7b18BaB7e1DB7a5d6e").is_ok());
        assert!(validate_address("0x0000000000000000000000000000000000000000").is_ok());

        // Invalid addresses
        assert!(validate_address("").is_err());
        assert!(validate_address("not_an_address").is_err());
        assert!(validate_address("0x123").is_err()); // Too short
        assert!(validate_address("742d35Cc6435C9c1c72c5E7b18BaB7e1DB7a5d6e").is_err()); // Missing 0x
        assert!(validate_address("0xgg2d35Cc6435C9c1c72c5E7b18BaB7e1DB7a5d6e").is_err());
        // Invalid hex
    }

    #[test]
    fn s_amounts_round_trip_without_floats() {
        let ten = parse_s("10").unwrap();
        assert_eq!(ten, U256::from(10u64) * U256::from(10u64).pow(U256::from(18u64)));
        assert_eq!(format_s(ten), "10.000000000000000000");
    }

    #[test]
    fn submission_failure_recovers_structure() {
        let raw = "server returned an error response: error code 3: execution reverted: insufficient S token balance";
        let err = submission_failure(raw);

        match err {
            GuardianError::Submission {
                revert_reason,
                code,
                ..
            } => {
                assert_eq!(
                    revert_reason.as_deref(),
                    Some("insufficient S token balance")
                );
                assert_eq!(code, Some(3));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn submission_failure_without_structure() {
        let err = submission_failure("connection refused");
        match err {
            GuardianError::Submission {
                message,
                revert_reason,
                code,
            } => {
                assert!(message.starts_with("Network error"));
                assert!(revert_reason.is_none());
                assert!(code.is_none());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
