//! Exchange parameters and their selection.
//!
//! A Diffie–Hellman exchange needs a prime modulus `p` and a generator `g`
//! of the multiplicative group modulo `p`. One party (the responder)
//! chooses the pair and transmits it; there is no joint computation.
//!
//! ## Structure
//!
//! - `core`
//!   The [`Parameters`] pair, its validation, and [`ParameterError`].
//!
//! - `select`
//!   The default prime table, the well-known pair table, and the random
//!   selection routines built on the primitive-root search.
//!
//! ## Limitations
//!
//! The default table stops at 199. Any exchange over these moduli can be
//! broken by exhaustive search; callers wanting larger groups supply their
//! own table.

mod core;
mod select;

pub use self::core::{ParameterError, Parameters};
pub use select::{
    DEFAULT_PRIMES, SelectionError, WELL_KNOWN_PARAMETERS, choose_well_known, select_parameters,
};
