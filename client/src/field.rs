//! Canonical 32-byte big-endian encoding of BN254 scalar field elements.
//!
//! Decoding never reduces modulo the field: a byte string whose integer
//! value is at least the modulus is rejected, so every field element has
//! exactly one byte representation on the wire.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use thiserror::Error;

pub const FIELD_BYTES: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError
{
	#[error("expected {FIELD_BYTES} bytes, received {0}")]
	InvalidLength(usize),

	#[error("bytes do not encode a canonical field element")]
	NonCanonical,
}

pub fn fr_to_bytes(value: Fr) -> [u8; FIELD_BYTES]
{
	let repr = value.into_bigint().to_bytes_be();
	let mut out = [0u8; FIELD_BYTES];
	out[FIELD_BYTES - repr.len()..].copy_from_slice(&repr);
	out
}

pub fn fr_from_bytes(bytes: &[u8]) -> Result<Fr, FieldError>
{
	if bytes.len() != FIELD_BYTES
	{
		return Err(FieldError::InvalidLength(bytes.len()));
	}

	let element = Fr::from_be_bytes_mod_order(bytes);
	if fr_to_bytes(element).as_slice() != bytes
	{
		return Err(FieldError::NonCanonical);
	}
	Ok(element)
}
