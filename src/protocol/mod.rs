//! Wire-protocol codec modules: framing, the code-point registry, encoding
//! adapters, the typed field codec, the request packer,
//! and the reply parser. None of these modules hold session state; they are
//! pure functions over byte buffers, driven by [`crate::conn::session`].

pub mod codepoint;
pub mod dss;
pub mod encoding;
pub mod field_codec;
pub mod packer;
pub mod reply;
