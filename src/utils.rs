//! Identifier generation
use bech32::Bech32m;
use uuid7::uuid7;

// construct a fresh uuid7 then encode using bech32 under an entity prefix
pub fn new_prefixed_id(prefix: &str) -> String {
    let hrp = bech32::Hrp::parse(prefix).expect("id prefix must be a valid bech32 hrp");

    bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())
        .expect("failed to serialise uuid payload to bech32 encoding.")
}
