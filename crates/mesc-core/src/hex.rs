//! Hex encoding helpers shared by the fixed-width newtypes.
//!
//! Inputs may carry an optional `0x` prefix and any letter case. Output is
//! always lowercase without a prefix; `Display` impls add the prefix.

use crate::error::ValidationError;

/// Encode bytes as a lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string into a fixed-size byte array.
///
/// `kind` names the target type in the returned error.
pub fn decode_fixed<const N: usize>(
    input: &str,
    kind: &'static str,
) -> Result<[u8; N], ValidationError> {
    let bytes = decode(input)?;
    if bytes.len() != N {
        return Err(ValidationError::InvalidLength {
            kind,
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Decode a hex string of any even length.
pub fn decode(input: &str) -> Result<Vec<u8>, ValidationError> {
    let trimmed = input.trim();
    let s = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if s.len() % 2 != 0 {
        return Err(ValidationError::InvalidHex {
            value: input.to_string(),
            reason: format!("odd length {}", s.len()),
        });
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| ValidationError::InvalidHex {
                    value: input.to_string(),
                    reason: format!("invalid hex digit at position {i}"),
                })
        })
        .collect()
}
