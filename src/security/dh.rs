//! Diffie-Hellman key agreement and DES-CBC/PKCS5 encryption for SECMEC 9
//! (`EUSRIDPWD`, encrypted userid/password authentication).
//!
//! Free functions operating on byte slices, no session state: callers hold
//! the ephemeral key pair and feed its bytes through here as the handshake
//! progresses.

use crate::error::{DrdaError, DrdaResult};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use des::Des;
use num_bigint::BigUint;
use num_traits::Num;
use rand::RngCore;

/// Fixed 256-bit prime `p` servers and clients agree on for SECMEC 9; not
/// negotiated, so both ends hardcode it.
const PRIME_HEX: &str = "C62112D73EE613F0947AB31F0F6846A1BFF5B3A4CA0D60BC1E4C7A0D8C16B3E3";
/// Fixed generator `g` paired with [`PRIME_HEX`].
const GENERATOR_HEX: &str = "4690FA1F7B9E1D4442C86C9114603FDECF071EDCEC5F626E21E256AED9EA34E4";

fn prime() -> BigUint {
    BigUint::from_str_radix(PRIME_HEX, 16).expect("fixed DH prime is valid hex")
}

fn generator() -> BigUint {
    BigUint::from_str_radix(GENERATOR_HEX, 16).expect("fixed DH generator is valid hex")
}

/// An ephemeral DH key pair for one connection attempt.
pub struct DhKeyPair {
    private: BigUint,
    pub public: [u8; 32],
}

/// Draws a private scalar uniformly from `[2, p)`.
#[must_use]
pub fn generate_private_key() -> DhKeyPair {
    let p = prime();
    let mut rng = rand::thread_rng();
    let private = loop {
        let mut bytes = [0_u8; 32];
        rng.fill_bytes(&mut bytes);
        let candidate = BigUint::from_bytes_be(&bytes);
        if candidate >= BigUint::from(2_u32) && candidate < p {
            break candidate;
        }
    };
    let public = calc_public(&private);
    DhKeyPair { private, public }
}

/// Computes `g^private mod p`, serialized as 32 bytes big-endian.
#[must_use]
pub fn calc_public(private: &BigUint) -> [u8; 32] {
    let public = generator().modpow(private, &prime());
    to_32_bytes(&public)
}

/// Computes the shared session key `peer_public^private mod p`, serialized
/// to 32 bytes big-endian.
pub fn calc_session_key(peer_public: &[u8], private: &DhKeyPair) -> DrdaResult<[u8; 32]> {
    if peer_public.len() > 32 {
        return Err(DrdaError::protocol("DH peer public key longer than 32 bytes"));
    }
    let peer = BigUint::from_bytes_be(peer_public);
    let shared = peer.modpow(&private.private, &prime());
    Ok(to_32_bytes(&shared))
}

fn to_32_bytes(n: &BigUint) -> [u8; 32] {
    let bytes = n.to_bytes_be();
    let mut out = [0_u8; 32];
    let start = 32 - bytes.len();
    out[start..].copy_from_slice(&bytes);
    out
}

type DesCbcEnc = cbc::Encryptor<Des>;
type DesCbcDec = cbc::Decryptor<Des>;

/// Encrypts `plaintext` with DES-CBC/PKCS5; `key` and `iv` are each 8 bytes
/// sliced from `session_key[12:20]` and `server_sectkn[12:20]`.
pub fn encrypt_des_cbc(key: &[u8], iv: &[u8], plaintext: &[u8]) -> DrdaResult<Vec<u8>> {
    let key: [u8; 8] = key
        .try_into()
        .map_err(|_| DrdaError::protocol("DES key must be 8 bytes"))?;
    let iv: [u8; 8] = iv
        .try_into()
        .map_err(|_| DrdaError::protocol("DES IV must be 8 bytes"))?;
    let enc = DesCbcEnc::new(&key.into(), &iv.into());
    Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypts a DES-CBC/PKCS5 ciphertext produced by [`encrypt_des_cbc`].
/// Only used by tests exercising the round trip; the wire protocol only
/// ever sends ciphertext in this direction.
pub fn decrypt_des_cbc(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> DrdaResult<Vec<u8>> {
    let key: [u8; 8] = key
        .try_into()
        .map_err(|_| DrdaError::protocol("DES key must be 8 bytes"))?;
    let iv: [u8; 8] = iv
        .try_into()
        .map_err(|_| DrdaError::protocol("DES IV must be 8 bytes"))?;
    let dec = DesCbcDec::new(&key.into(), &iv.into());
    dec.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| DrdaError::protocol(format!("DES-CBC padding error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_keys_agree_from_both_sides() {
        let alice = generate_private_key();
        let bob = generate_private_key();
        let k1 = calc_session_key(&bob.public, &alice).unwrap();
        let k2 = calc_session_key(&alice.public, &bob).unwrap();
        assert_eq!(k1, k2);
    }

    #[test]
    fn des_cbc_round_trips() {
        let key = [1_u8, 2, 3, 4, 5, 6, 7, 8];
        let iv = [8_u8, 7, 6, 5, 4, 3, 2, 1];
        let plaintext = b"APP";
        let ciphertext = encrypt_des_cbc(&key, &iv, plaintext).unwrap();
        let decrypted = decrypt_des_cbc(&key, &iv, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }
}
