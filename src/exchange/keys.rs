//! Key material of a session and the derivations built on it.

use std::fmt;

use rand::Rng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::arithmetic::{mod_mul, mod_pow};
use crate::exchange::config::Derivation;
use crate::params::Parameters;

/// A party's secret exponent. Never transmitted.
///
/// The value is wiped when dropped and is hidden from `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateExponent(u64);

impl PrivateExponent {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Draws an exponent uniformly from `[0, max]`.
    ///
    /// The quality of the exponent is the quality of `rng`; pass a
    /// cryptographically secure generator where that matters.
    pub fn generate<R: Rng>(rng: &mut R, max: u64) -> Self {
        Self(rng.gen_range(0..=max))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for PrivateExponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateExponent(..)")
    }
}

/// The value both parties end up holding.
///
/// Wiped on drop; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(u64);

impl SharedSecret {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Little-endian bytes, for feeding into a key derivation function.
    pub fn to_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

/// Derives the public value sent to the peer.
///
/// With [`Derivation::Product`] this is the value of the recurrence
///
/// ```text
/// r = g
/// repeat x times: r = r * g mod p
/// ```
///
/// i.e. `g^(x+1) mod p`, computed by square-and-multiply instead of `x`
/// multiplications. With [`Derivation::Exponentiation`] it is `g^x mod p`.
///
/// `parameters` must have passed [`Parameters::validate`].
pub fn public_value(parameters: &Parameters, exponent: &PrivateExponent, derivation: Derivation) -> u64 {
    let Parameters { modulus, generator } = *parameters;
    let power = mod_pow(generator, exponent.value(), modulus);

    match derivation {
        Derivation::Product => mod_mul(power, generator, modulus),
        Derivation::Exponentiation => power,
    }
}

/// Derives the shared secret from both public values.
///
/// [`Derivation::Product`] multiplies the two public values with wrapping
/// 64-bit arithmetic and does not reduce the result. Overflow is not an
/// error. [`Derivation::Exponentiation`] raises the peer's value to the
/// local exponent modulo `p`.
pub fn shared_secret(
    parameters: &Parameters,
    exponent: &PrivateExponent,
    local: u64,
    peer: u64,
    derivation: Derivation,
) -> SharedSecret {
    let value = match derivation {
        Derivation::Product => local.wrapping_mul(peer),
        Derivation::Exponentiation => mod_pow(peer, exponent.value(), parameters.modulus),
    };

    SharedSecret(value)
}
