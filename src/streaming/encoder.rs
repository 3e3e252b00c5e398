//! encoder.rs
//! Wire encoding for the orientation stream.
//!
//! Stream grammar: `(LENGTH VALUE{N})* END`
//! - LENGTH: i32, big-endian, equal to `4 * N`
//! - VALUE: the raw IEEE-754 bits of one f32 field, big-endian
//! - END: a LENGTH carrying `-1`, always the last frame on the connection
//!
//! Each 32-bit quantity is converted to network order on its own and handed
//! to its own `write_all`, so a reader on any host rebuilds the same bits.

use std::io::{self, Write};

use crate::streaming::error::{StreamError, StreamResult};

/// Bytes per value frame (one 32-bit field).
pub const VALUE_FRAME_BYTES: usize = 4;

/// Length-frame value that terminates the stream.
pub const END_OF_STREAM: i32 = -1;

/// Length-frame value announcing `n_fields` value frames.
pub fn payload_len(n_fields: usize) -> StreamResult<i32> {
    n_fields
        .checked_mul(VALUE_FRAME_BYTES)
        .and_then(|bytes| i32::try_from(bytes).ok())
        .ok_or(StreamError::PayloadTooLarge(n_fields))
}

#[inline]
pub fn write_length<W: Write>(w: &mut W, len: i32) -> io::Result<()> {
    w.write_all(&len.to_be_bytes())
}

/// Writes the bit pattern of `value`; never a numeric cast.
#[inline]
pub fn write_value<W: Write>(w: &mut W, value: f32) -> io::Result<()> {
    w.write_all(&value.to_bits().to_be_bytes())
}

/// Writes one length frame followed by one value frame per field, in order.
/// Returns the number of bytes put on the wire.
pub fn write_record<W: Write>(w: &mut W, fields: &[f32]) -> StreamResult<usize> {
    let len = payload_len(fields.len())?;
    write_length(w, len)?;
    for &field in fields {
        write_value(w, field)?;
    }
    Ok(VALUE_FRAME_BYTES + fields.len() * VALUE_FRAME_BYTES)
}

#[inline]
pub fn write_end_of_stream<W: Write>(w: &mut W) -> io::Result<()> {
    write_length(w, END_OF_STREAM)
}

/// Encodes a record into an owned buffer (same bytes as `write_record`).
pub fn encode_record(fields: &[f32]) -> StreamResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(VALUE_FRAME_BYTES * (fields.len() + 1));
    write_record(&mut buf, fields)?;
    Ok(buf)
}
