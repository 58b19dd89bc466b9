//! Two-party key exchange over a byte stream.
//!
//! This module runs the handshake between an initiator and a responder
//! connected by any ordered, reliable duplex channel implementing
//! [`std::io::Read`] and [`std::io::Write`]:
//!
//! 1. The responder chooses `(p, g)` and sends it; the initiator receives it.
//! 2. Both draw a private exponent `x` and derive a public value.
//! 3. The responder sends its public value then reads the initiator's; the
//!    initiator reads first and then sends. The fixed order keeps both ends
//!    from waiting on each other.
//! 4. Both derive the same shared secret.
//!
//! ## Structure
//!
//! - `session`
//!   [`Session`], its [`State`] machine and the [`run_exchange`] entry
//!   points.
//!
//! - `keys`
//!   [`PrivateExponent`], [`SharedSecret`] and the derivations.
//!
//! - `config`
//!   [`ExchangeConfig`] and its strategy and derivation choices.
//!
//! - `error`
//!   [`ExchangeError`], tagged with the failing [`Phase`].
//!
//! ## Security
//!
//! This is a demonstration of the exchange mechanics. It does not
//! authenticate the peer, so a man in the middle can run one exchange with
//! each side. With the default [`Derivation::Product`] the secret can be
//! computed from the two values on the wire, and the default moduli are
//! tiny. Randomness comes from the caller's generator.

mod config;
mod error;
mod keys;
mod session;

pub use config::{DEFAULT_MAX_PRIVATE_EXPONENT, Derivation, ExchangeConfig, ParameterStrategy};
pub use error::{ErrorKind, ExchangeError, Phase, Result};
pub use keys::{PrivateExponent, SharedSecret, public_value, shared_secret};
pub use session::{Role, Session, State, run_exchange, run_exchange_with};
