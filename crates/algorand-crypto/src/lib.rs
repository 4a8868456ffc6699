//! Cryptographic and wire-format primitives for the Algorand transaction
//! library: SHA-512/256, a raw-byte Ed25519 wrapper, and the canonical
//! msgpack codec used for all consensus serialization.

pub mod ed25519;
pub mod hash;
pub mod msgpack;

pub use hash::sha512_256;
pub use msgpack::{MsgpackError, Value};
