//! Security mechanism 9 (ephemeral Diffie-Hellman + DES-CBC).

pub mod dh;

pub use dh::{
    calc_public, calc_session_key, decrypt_des_cbc, encrypt_des_cbc, generate_private_key, DhKeyPair,
};
