//! # Release Messages
//!
//! Parties authorize a release by signing a hash over the payout batch:
//!
//! ```text
//! keccak256(0x19 ‖ 0x00 ‖ engine[20] ‖ dest_1[32] … dest_n[32]
//!           ‖ amount_1[32] … amount_n[32] ‖ script_hash[32])
//! ```
//!
//! Destinations are left-padded to 32 bytes and amounts are 32-byte
//! big-endian words. The leading `0x19 0x00` and the engine address give
//! domain separation. The hash is then wrapped with the personal-message
//! prefix before signing, so a signer's wallet never produces a signature
//! that doubles as a raw transaction signature.

use mesc_core::{Address, Amount, ScriptHash};

use crate::keccak::{keccak256, keccak256_concat};

/// Prefix prepended to a 32-byte hash by personal-message signing.
pub const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// The unwrapped release message hash.
///
/// `destinations` and `amounts` are hashed in order. Callers are expected
/// to have checked that the two slices have equal length; this function
/// hashes whatever it is given.
pub fn release_message_hash(
    engine: &Address,
    destinations: &[Address],
    amounts: &[Amount],
    script_hash: &ScriptHash,
) -> [u8; 32] {
    let mut buf = Vec::with_capacity(2 + 20 + 32 * (destinations.len() + amounts.len() + 1));
    buf.push(0x19);
    buf.push(0x00);
    buf.extend_from_slice(engine.as_bytes());
    for destination in destinations {
        buf.extend_from_slice(&destination.to_word());
    }
    for amount in amounts {
        buf.extend_from_slice(&amount.to_word());
    }
    buf.extend_from_slice(script_hash.as_bytes());
    keccak256(&buf)
}

/// Wrap a 32-byte hash with the personal-message prefix.
pub fn personal_message_hash(hash: &[u8; 32]) -> [u8; 32] {
    keccak256_concat(&[PERSONAL_MESSAGE_PREFIX, &hash[..]])
}

/// The digest a party actually signs: the personal-message wrapping of
/// [`release_message_hash`].
pub fn release_digest(
    engine: &Address,
    destinations: &[Address],
    amounts: &[Amount],
    script_hash: &ScriptHash,
) -> [u8; 32] {
    personal_message_hash(&release_message_hash(
        engine,
        destinations,
        amounts,
        script_hash,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesc_core::hex::to_hex;

    const NATIVE_SCRIPT_HASH: &str =
        "09b7f4f7eecf9d56634a53b237cfbd36d0804e6195103986e81e2d9252c000b5";

    fn engine() -> Address {
        Address([0xee; 20])
    }

    fn script_hash() -> ScriptHash {
        ScriptHash::from_hex(NATIVE_SCRIPT_HASH).unwrap()
    }

    #[test]
    fn single_payout_vector() {
        let hash = release_message_hash(
            &engine(),
            &[Address([0x22; 20])],
            &[Amount::new(1000)],
            &script_hash(),
        );
        assert_eq!(
            to_hex(&hash),
            "25de3648479365de80711ddcb445cd30c695ee2d0f454822d777a1fec28adbc7"
        );
    }

    #[test]
    fn split_payout_vector() {
        let hash = release_message_hash(
            &engine(),
            &[Address([0x22; 20]), Address([0x11; 20])],
            &[Amount::new(600), Amount::new(400)],
            &script_hash(),
        );
        assert_eq!(
            to_hex(&hash),
            "bfb679d6264cee9dc4c416ff63e62401c9301f7799fb3c4094487bdaee33ad2d"
        );
    }

    #[test]
    fn personal_wrapping_vectors() {
        assert_eq!(
            to_hex(&personal_message_hash(&[0u8; 32])),
            "5e4106618209740b9f773a94c5667b9659a7a4e2691c7c8a78336e9889a6be07"
        );
        let digest = release_digest(
            &engine(),
            &[Address([0x22; 20])],
            &[Amount::new(1000)],
            &script_hash(),
        );
        assert_eq!(
            to_hex(&digest),
            "e719fa5f9962f06e3beed4138000187d859f649cceeb27f16a5c88b47656bf77"
        );
    }

    #[test]
    fn engine_address_separates_domains() {
        let dests = [Address([0x22; 20])];
        let amounts = [Amount::new(1000)];
        let a = release_message_hash(&engine(), &dests, &amounts, &script_hash());
        let b = release_message_hash(&Address([0xef; 20]), &dests, &amounts, &script_hash());
        assert_ne!(a, b);
    }

    #[test]
    fn payout_order_matters() {
        let sh = script_hash();
        let a = release_message_hash(
            &engine(),
            &[Address([0x22; 20]), Address([0x11; 20])],
            &[Amount::new(600), Amount::new(400)],
            &sh,
        );
        let b = release_message_hash(
            &engine(),
            &[Address([0x11; 20]), Address([0x22; 20])],
            &[Amount::new(400), Amount::new(600)],
            &sh,
        );
        assert_ne!(a, b);
    }
}
