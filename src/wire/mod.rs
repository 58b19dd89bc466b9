//! Wire format of the exchange.
//!
//! Two message shapes cross the channel, in this order:
//!
//! 1. the parameter pair, 16 bytes: `modulus || generator`
//! 2. one public value per party, 8 bytes each
//!
//! Every integer is an unsigned 64-bit little-endian value. Message
//! boundaries are implied by the fixed lengths, so the channel must deliver
//! bytes exactly and in order (a TCP stream does).

mod codec;

pub use codec::*;
