// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversion between human-readable decimal amounts and native token units.

use alloy::primitives::U256;

use super::ChainError;

/// Parse a human-readable amount into native units.
///
/// # Arguments
/// * `amount` - Amount as a decimal string (e.g., "1.5")
/// * `decimals` - Number of decimals (18 for ETH, 6 for USDC)
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, ChainError> {
    let parts: Vec<&str> = amount.split('.').collect();

    if parts.len() > 2 || parts[0].is_empty() {
        return Err(ChainError::InvalidAmount(format!(
            "malformed amount `{amount}`"
        )));
    }

    let whole = parts[0]
        .parse::<u128>()
        .map_err(|_| ChainError::InvalidAmount(format!("invalid whole part in `{amount}`")))?;

    let decimal_part = if parts.len() == 2 {
        let dec_str = parts[1];
        if dec_str.is_empty() || dec_str.len() > decimals as usize {
            return Err(ChainError::InvalidAmount(format!(
                "too many decimal places in `{amount}` (max {decimals})"
            )));
        }
        // Pad with zeros to match decimals
        let padded = format!("{dec_str:0<width$}", width = decimals as usize);
        padded
            .parse::<u128>()
            .map_err(|_| ChainError::InvalidAmount(format!("invalid fraction in `{amount}`")))?
    } else {
        0u128
    };

    let multiplier = 10u128.pow(decimals as u32);
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or_else(|| ChainError::InvalidAmount(format!("amount `{amount}` overflows")))?;

    Ok(U256::from(total))
}

/// Format native units as a human-readable decimal string.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{remainder:0>width$}", width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{trimmed}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_whole_eth() {
        let result = parse_amount("1", 18).unwrap();
        assert_eq!(result, U256::from(1_000_000_000_000_000_000u64));
    }

    #[test]
    fn parse_decimal_eth() {
        let result = parse_amount("1.5", 18).unwrap();
        assert_eq!(result, U256::from(1_500_000_000_000_000_000u64));
    }

    #[test]
    fn parse_usdc_units() {
        // 1.5 USDC = 1_500_000 (6 decimals)
        let result = parse_amount("1.5", 6).unwrap();
        assert_eq!(result, U256::from(1_500_000u64));
    }

    #[test]
    fn parse_small_fraction() {
        let result = parse_amount("0.001", 18).unwrap();
        assert_eq!(result, U256::from(1_000_000_000_000_000u64));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(parse_amount("1.2.3", 18).is_err());
        assert!(parse_amount(".5", 18).is_err());
        assert!(parse_amount("1.", 18).is_err());
        assert!(parse_amount("abc", 18).is_err());
        // 7 fractional digits against 6 decimals
        assert!(parse_amount("1.1234567", 6).is_err());
    }

    #[test]
    fn format_amounts() {
        assert_eq!(
            format_amount(U256::from(1_000_000_000_000_000_000u64), 18),
            "1"
        );
        assert_eq!(
            format_amount(U256::from(1_500_000_000_000_000_000u64), 18),
            "1.5"
        );
        assert_eq!(format_amount(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_amount(U256::ZERO, 18), "0");
    }

    #[test]
    fn parse_format_agree() {
        for (s, d) in [("2.25", 18u8), ("100", 6), ("0.000001", 6)] {
            let units = parse_amount(s, d).unwrap();
            assert_eq!(format_amount(units, d), s);
        }
    }
}
