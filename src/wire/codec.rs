//! Fixed-width encoding of the exchange messages.
//!
//! All integers are unsigned 64-bit little-endian. Messages carry no tag,
//! length prefix or checksum; the receiver knows the length of the next
//! message from the protocol step it is in.

use std::io::{self, Read, Write};

use crate::params::Parameters;

/// Length of an encoded [`Parameters`] message: modulus then generator.
pub const PARAMETERS_LEN: usize = 16;

/// Length of an encoded single value message.
pub const VALUE_LEN: usize = 8;

/// Encodes a parameter pair as `modulus || generator`.
pub fn encode_parameters(parameters: &Parameters) -> [u8; PARAMETERS_LEN] {
    let mut out = [0u8; PARAMETERS_LEN];

    out[..VALUE_LEN].copy_from_slice(&parameters.modulus.to_le_bytes());
    out[VALUE_LEN..].copy_from_slice(&parameters.generator.to_le_bytes());

    out
}

/// Decodes a parameter pair.
///
/// Any 16 bytes decode; range checks are left to
/// [`Parameters::validate`].
pub fn decode_parameters(bytes: &[u8; PARAMETERS_LEN]) -> Parameters {
    let mut modulus = [0u8; VALUE_LEN];
    let mut generator = [0u8; VALUE_LEN];

    modulus.copy_from_slice(&bytes[..VALUE_LEN]);
    generator.copy_from_slice(&bytes[VALUE_LEN..]);

    Parameters {
        modulus: decode_value(&modulus),
        generator: decode_value(&generator),
    }
}

/// Encodes a single value.
#[inline]
pub fn encode_value(value: u64) -> [u8; VALUE_LEN] {
    value.to_le_bytes()
}

/// Decodes a single value.
#[inline]
pub fn decode_value(bytes: &[u8; VALUE_LEN]) -> u64 {
    u64::from_le_bytes(*bytes)
}

/// Writes an encoded parameter pair with a single `write_all`.
pub fn write_parameters<W: Write + ?Sized>(writer: &mut W, parameters: &Parameters) -> io::Result<()> {
    writer.write_all(&encode_parameters(parameters))?;
    writer.flush()
}

/// Reads exactly [`PARAMETERS_LEN`] bytes and decodes them.
///
/// A stream that ends early yields [`io::ErrorKind::UnexpectedEof`]; no
/// partially decoded pair is ever returned.
pub fn read_parameters<R: Read + ?Sized>(reader: &mut R) -> io::Result<Parameters> {
    let mut buf = [0u8; PARAMETERS_LEN];
    reader.read_exact(&mut buf)?;

    Ok(decode_parameters(&buf))
}

/// Writes an encoded value with a single `write_all`.
pub fn write_value<W: Write + ?Sized>(writer: &mut W, value: u64) -> io::Result<()> {
    writer.write_all(&encode_value(value))?;
    writer.flush()
}

/// Reads exactly [`VALUE_LEN`] bytes and decodes them.
pub fn read_value<R: Read + ?Sized>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; VALUE_LEN];
    reader.read_exact(&mut buf)?;

    Ok(decode_value(&buf))
}
