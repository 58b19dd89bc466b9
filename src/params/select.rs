//! Random selection of exchange parameters.

use rand::Rng;
use thiserror::Error;

use crate::arithmetic::primitive_roots;
use crate::params::Parameters;

/// Every prime from 2 through 199.
///
/// This is the default modulus table. Moduli this small are trivially
/// brute-forced; the table exists to exercise the exchange mechanics.
pub const DEFAULT_PRIMES: &[u64] = &[
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199,
];

/// Hand-picked pairs usable without running the generator search.
pub const WELL_KNOWN_PARAMETERS: &[Parameters] = &[Parameters {
    modulus: 11,
    generator: 2,
}];

/// Errors produced while selecting parameters from a prime table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The candidate table holds no entries.
    #[error("prime table is empty")]
    EmptyPrimeTable,

    /// The chosen modulus has no primitive root in `[1, modulus)`.
    ///
    /// Cannot happen for a genuine prime; it signals a table entry that is
    /// not prime.
    #[error("no primitive root found modulo {modulus}")]
    NoPrimitiveRootFound { modulus: u64 },
}

/// Picks a modulus and a generator at random.
///
/// The modulus is drawn uniformly from `primes`. Every candidate in
/// `[1, modulus)` is tested with the primitive-root check, and the
/// generator is drawn uniformly from the candidates that pass.
///
/// The table is not checked for primality up front; a composite entry is
/// only detected if it gets drawn, as
/// [`SelectionError::NoPrimitiveRootFound`].
///
/// # Errors
///
/// - [`SelectionError::EmptyPrimeTable`] if `primes` is empty
/// - [`SelectionError::NoPrimitiveRootFound`] if the drawn modulus has no
///   primitive root
pub fn select_parameters<R: Rng>(primes: &[u64], rng: &mut R) -> Result<Parameters, SelectionError> {
    if primes.is_empty() {
        return Err(SelectionError::EmptyPrimeTable);
    }

    let modulus = primes[rng.gen_range(0..primes.len())];

    let roots = primitive_roots(modulus);
    if roots.is_empty() {
        return Err(SelectionError::NoPrimitiveRootFound { modulus });
    }

    let generator = roots[rng.gen_range(0..roots.len())];

    Ok(Parameters { modulus, generator })
}

/// Picks one entry of [`WELL_KNOWN_PARAMETERS`] uniformly at random.
pub fn choose_well_known<R: Rng>(rng: &mut R) -> Parameters {
    WELL_KNOWN_PARAMETERS[rng.gen_range(0..WELL_KNOWN_PARAMETERS.len())]
}
