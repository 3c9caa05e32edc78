use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;

use crate::event::InboundEvent;

/// Checks the `X-Hub-Signature` header of `event` against an HMAC of its raw
/// body. Fails closed on a missing header, a malformed value, or an algorithm
/// we do not know.
pub fn verify(event: &InboundEvent, secret: &[u8]) -> bool {
    match event.signature() {
        Some(header) => verify_signature(header, event.body(), secret),
        None => false,
    }
}

/// `signature` has the form `<algorithm>=<hex digest>`.
pub fn verify_signature(signature: &str, body: &[u8], secret: &[u8]) -> bool {
    let Some((algorithm, provided)) = signature.split_once('=') else {
        return false;
    };
    let Some(expected) = hex_hmac(algorithm, secret, body) else {
        return false;
    };
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

/// Lowercase hex HMAC of `body`, or `None` for an unsupported algorithm.
pub fn hex_hmac(algorithm: &str, secret: &[u8], body: &[u8]) -> Option<String> {
    let digest = match algorithm {
        "sha1" => digest::<Hmac<Sha1>>(secret, body),
        "sha256" => digest::<Hmac<Sha256>>(secret, body),
        "sha512" => digest::<Hmac<Sha512>>(secret, body),
        _ => None,
    }?;
    Some(hex::encode(digest))
}

fn digest<M: Mac + KeyInit>(secret: &[u8], body: &[u8]) -> Option<Vec<u8>> {
    let mut mac = <M as KeyInit>::new_from_slice(secret).ok()?;
    mac.update(body);
    Some(mac.finalize().into_bytes().to_vec())
}
