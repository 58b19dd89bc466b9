//! Parameter definitions and validation for the key exchange.

use thiserror::Error;

use crate::arithmetic::{is_prime, is_primitive_root};

/// Public group parameters shared by both parties of an exchange.
///
/// A well-formed pair has a prime `modulus` and a `generator` that is a
/// primitive root modulo `modulus`. The responder picks the pair and sends
/// it verbatim; the initiator adopts it as received.
///
/// The fields are public so that any pair of integers can be carried
/// through the wire codec. Use [`Parameters::validate`] or
/// [`Parameters::verify`] before computing with a pair of unknown origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Parameters {
    /// Prime modulus of the multiplicative group.
    pub modulus: u64,
    /// Primitive root modulo `modulus`.
    pub generator: u64,
}

/// Reasons a parameter pair is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// The modulus is below 2, so no group exists.
    #[error("modulus {0} is smaller than 2")]
    ModulusTooSmall(u64),

    /// The generator is not in `[1, modulus)`.
    #[error("generator {generator} is outside [1, {modulus})")]
    GeneratorOutOfRange { generator: u64, modulus: u64 },

    /// The modulus is not prime.
    #[error("modulus {0} is not prime")]
    CompositeModulus(u64),

    /// The generator does not generate the whole group.
    #[error("generator {generator} is not a primitive root modulo {modulus}")]
    NotPrimitiveRoot { generator: u64, modulus: u64 },
}

impl Parameters {
    pub fn new(modulus: u64, generator: u64) -> Self {
        Self { modulus, generator }
    }

    /// Checks the structural bounds every exchange relies on.
    ///
    /// This is cheap and is applied to every received pair: the modulus
    /// must be at least 2 and the generator must lie in `[1, modulus)`.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.modulus < 2 {
            return Err(ParameterError::ModulusTooSmall(self.modulus));
        }

        if self.generator == 0 || self.generator >= self.modulus {
            return Err(ParameterError::GeneratorOutOfRange {
                generator: self.generator,
                modulus: self.modulus,
            });
        }

        Ok(())
    }

    /// Checks the full invariant: bounds, a prime modulus and a primitive
    /// root generator.
    ///
    /// Primality is decided deterministically. The primitive-root test
    /// factors `modulus - 1` by trial division, so this gets slow for
    /// moduli with a large prime factor in `modulus - 1`.
    pub fn verify(&self) -> Result<(), ParameterError> {
        self.validate()?;

        if !is_prime(self.modulus) {
            return Err(ParameterError::CompositeModulus(self.modulus));
        }

        if !is_primitive_root(self.modulus, self.generator) {
            return Err(ParameterError::NotPrimitiveRoot {
                generator: self.generator,
                modulus: self.modulus,
            });
        }

        Ok(())
    }
}
