//! Diffie–Hellman–Merkle key exchange over 64-bit integers.
//!
//! This crate implements the mechanics of a two-party key exchange:
//! choosing a prime modulus and a primitive root, deriving public values
//! from private exponents, and exchanging those values over a connected
//! byte stream so that both ends arrive at the same secret.
//!
//! It is a reference for the handshake itself, not a production key
//! agreement. Moduli are small, peers are not authenticated, and the
//! randomness is whatever generator the caller passes in.
//!
//! # Module overview
//!
//! - `arithmetic`
//!   Modular multiplication and exponentiation, primality testing and the
//!   primitive-root test. Pure functions over `u64`.
//!
//! - `params`
//!   The `(modulus, generator)` pair, its validation, and random selection
//!   from a table of primes.
//!
//! - `wire`
//!   Fixed-width little-endian encoding of the two message shapes and the
//!   blocking read/write helpers built on it.
//!
//! - `exchange`
//!   The session state machine that sequences the protocol for the
//!   initiator and responder roles.
//!
//! # Example
//!
//! ```no_run
//! use std::net::TcpStream;
//!
//! use dhmerkle::exchange::{Role, run_exchange};
//! use dhmerkle::params::DEFAULT_PRIMES;
//!
//! let mut stream = TcpStream::connect("127.0.0.1:10000").unwrap();
//! let secret = run_exchange(Role::Initiator, &mut stream, DEFAULT_PRIMES, &mut rand::thread_rng()).unwrap();
//! println!("{}", secret.value());
//! ```

pub mod arithmetic;
pub mod exchange;
pub mod params;
pub mod wire;
