//! Error types for the exchange session.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::exchange::session::{Role, State};
use crate::params::{ParameterError, SelectionError};

/// Protocol phase in which an error occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Selecting, sending or receiving the parameter pair.
    Parameters,
    /// Drawing the private exponent and deriving the public value.
    KeyGeneration,
    /// Sending and receiving public values.
    ValueExchange,
    /// Deriving the shared secret.
    Completion,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Parameters => "parameter exchange",
            Phase::KeyGeneration => "key generation",
            Phase::ValueExchange => "public value exchange",
            Phase::Completion => "secret derivation",
        })
    }
}

/// What went wrong.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A read or write on the channel failed, including short reads.
    #[error("channel i/o failed: {0}")]
    ChannelIo(#[from] io::Error),

    /// The parameter pair is out of range, or fails strict verification.
    #[error("malformed parameters: {0}")]
    MalformedParameters(#[from] ParameterError),

    /// The drawn modulus has no primitive root; the prime table holds a
    /// non-prime entry.
    #[error("no primitive root found modulo {modulus}")]
    NoPrimitiveRootFound { modulus: u64 },

    /// The prime table handed to the responder is empty.
    #[error("prime table is empty")]
    EmptyPrimeTable,

    /// The step is not valid in the session's current state.
    #[error("step not allowed in state {0}")]
    OutOfOrder(State),

    /// The step belongs to the other role.
    #[error("step not allowed for the {0} role")]
    WrongRole(Role),
}

impl From<SelectionError> for ErrorKind {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::EmptyPrimeTable => ErrorKind::EmptyPrimeTable,
            SelectionError::NoPrimitiveRootFound { modulus } => {
                ErrorKind::NoPrimitiveRootFound { modulus }
            }
        }
    }
}

/// A failed exchange step, tagged with the phase it belongs to.
#[derive(Debug, Error)]
#[error("{phase} failed: {kind}")]
pub struct ExchangeError {
    pub phase: Phase,
    #[source]
    pub kind: ErrorKind,
}

impl ExchangeError {
    pub fn new(phase: Phase, kind: impl Into<ErrorKind>) -> Self {
        Self {
            phase,
            kind: kind.into(),
        }
    }

    /// Returns `true` if the peer or the transport caused the failure.
    pub fn is_channel_error(&self) -> bool {
        matches!(self.kind, ErrorKind::ChannelIo(_))
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
