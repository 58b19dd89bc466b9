//! Number theory for the key exchange.
//!
//! This module groups the modular arithmetic the handshake is built on:
//! modular multiplication and exponentiation, primality testing, and the
//! primitive-root test used to pick a generator for a prime modulus.
//!
//! Everything here is a pure function over `u64` values. There is no I/O,
//! no randomness and no allocation outside of the factor and root lists.
//!
//! ## Overflow
//!
//! Products are always formed in 128 bits before reduction, so every
//! function accepts the full `u64` range for its operands. The only
//! precondition is a non-zero modulus for [`mod_mul`] and [`mod_pow`].

mod core;

pub use self::core::*;
