use crate::error::Error;
use alloy_primitives::Address;
use std::str::FromStr;

/// Parses a recipient address. Single-case hex is accepted as is; mixed case must carry a
/// valid EIP-55 checksum.
pub fn parse_address(text: &str) -> Result<Address, Error> {
    let invalid = || Error::InvalidAddress(text.to_string());
    let hex = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(format!("0x{}", hex), None).map_err(|_| invalid())
    } else {
        Address::from_str(hex).map_err(|_| invalid())
    }
}

/// `0x1234…abcd` form used in compact listings.
pub fn short(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}
