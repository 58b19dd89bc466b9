//! Session configuration.

/// Largest private exponent drawn by default.
///
/// Matches the range of a signed 32-bit general purpose generator:
/// `[0, 2^31 - 2]`.
pub const DEFAULT_MAX_PRIVATE_EXPONENT: u64 = i32::MAX as u64 - 1;

/// How the responder obtains the parameter pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParameterStrategy {
    /// Draw a modulus from the prime table and search it for a generator.
    #[default]
    Generate,
    /// Draw a pair from [`crate::params::WELL_KNOWN_PARAMETERS`].
    WellKnown,
}

/// How public values and the shared secret are derived.
///
/// Both ends must agree; the wire format is identical for both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Derivation {
    /// Public value `g^(x+1) mod p` (the generator multiplied into itself
    /// `x` times), secret = wrapping product of both public values.
    ///
    /// The secret is not reduced modulo `p` and only depends on the private
    /// exponents through the transmitted values, so an observer of the
    /// channel can compute it.
    #[default]
    Product,
    /// Textbook Diffie–Hellman: public value `g^x mod p`, secret
    /// `peer^x mod p`.
    Exponentiation,
}

/// Configuration of a single [`Session`](crate::exchange::Session).
///
/// # Defaults
///
/// - `strategy`: [`ParameterStrategy::Generate`]
/// - `derivation`: [`Derivation::Product`]
/// - `max_private_exponent`: [`DEFAULT_MAX_PRIVATE_EXPONENT`]
/// - `verify_parameters`: `false`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Parameter source used by the responder. Ignored by the initiator.
    pub strategy: ParameterStrategy,
    /// Public value and secret derivation.
    pub derivation: Derivation,
    /// Inclusive upper bound for drawn private exponents.
    pub max_private_exponent: u64,
    /// When set, the initiator rejects a received modulus that is not
    /// prime or a generator that is not a primitive root. Otherwise only
    /// the range checks apply.
    pub verify_parameters: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            strategy: ParameterStrategy::Generate,
            derivation: Derivation::Product,
            max_private_exponent: DEFAULT_MAX_PRIVATE_EXPONENT,
            verify_parameters: false,
        }
    }
}
