//! Encoded polyline format (Google polyline algorithm).
//!
//! Coordinates are scaled by 10^precision, rounded, delta-encoded, zigzag
//! mapped and written as little-endian groups of 5 bits, each group offset
//! by 63 into printable ASCII with bit 6 as the continuation flag.

use crate::{Coordinate, DecodeError};

/// Lowest byte of the encoding alphabet (`?`).
const ALPHABET_OFFSET: u8 = 63;
/// Highest byte of the encoding alphabet: a continuation chunk of all ones.
const ALPHABET_LAST: u8 = 126;
/// Continuation flag of a 5-bit chunk.
const CONTINUATION_BIT: i64 = 0x20;

/// Decodes an encoded polyline into an ordered (lon, lat) sequence.
///
/// Fails on empty input and on structural violations: bytes outside the
/// encoding alphabet, a truncated multi-byte group, a latitude without its
/// longitude, or fewer than 2 decoded coordinates.
pub fn decode_polyline(encoded: &str, precision: u32) -> Result<Vec<Coordinate>, DecodeError> {
    if encoded.is_empty() {
        return Err(DecodeError::Empty);
    }

    let factor = 10f64.powi(precision as i32);
    let bytes = encoded.as_bytes();
    let mut coordinates = Vec::with_capacity(bytes.len() / 4);

    let mut offset = 0;
    let mut lat = 0i64;
    let mut lon = 0i64;

    while offset < bytes.len() {
        let (lat_delta, next) = read_value(bytes, offset)?;
        if next >= bytes.len() {
            return Err(DecodeError::DanglingOrdinate);
        }
        let (lon_delta, next) = read_value(bytes, next)?;

        lat += lat_delta;
        lon += lon_delta;
        coordinates.push(Coordinate {
            lon: lon as f64 / factor,
            lat: lat as f64 / factor,
        });
        offset = next;
    }

    if coordinates.len() < 2 {
        return Err(DecodeError::TooFewCoordinates);
    }

    Ok(coordinates)
}

/// Encodes a coordinate sequence into a polyline string.
pub fn encode_polyline(coordinates: &[Coordinate], precision: u32) -> String {
    let factor = 10f64.powi(precision as i32);
    let mut encoded = String::with_capacity(coordinates.len() * 8);

    let mut previous_lat = 0i64;
    let mut previous_lon = 0i64;

    for coordinate in coordinates {
        let lat = (coordinate.lat * factor).round() as i64;
        let lon = (coordinate.lon * factor).round() as i64;

        write_value(&mut encoded, lat - previous_lat);
        write_value(&mut encoded, lon - previous_lon);

        previous_lat = lat;
        previous_lon = lon;
    }

    encoded
}

/// Reads one zigzag-encoded signed value starting at `offset`.
/// Returns the value and the offset of the next group.
fn read_value(bytes: &[u8], mut offset: usize) -> Result<(i64, usize), DecodeError> {
    let mut value = 0i64;
    let mut shift = 0;

    loop {
        let Some(&byte) = bytes.get(offset) else {
            return Err(DecodeError::TruncatedGroup);
        };
        if !(ALPHABET_OFFSET..=ALPHABET_LAST).contains(&byte) {
            return Err(DecodeError::InvalidByte { byte, offset });
        }

        if shift >= 60 {
            return Err(DecodeError::ValueOverflow);
        }

        let chunk = i64::from(byte - ALPHABET_OFFSET);
        value |= (chunk & 0x1f) << shift;
        shift += 5;
        offset += 1;

        if chunk & CONTINUATION_BIT == 0 {
            break;
        }
    }

    // zigzag: the sign lives in the lowest bit
    let value = if value & 1 != 0 {
        !(value >> 1)
    } else {
        value >> 1
    };

    Ok((value, offset))
}

fn write_value(encoded: &mut String, value: i64) {
    let mut value = if value < 0 { !(value << 1) } else { value << 1 };

    while value >= CONTINUATION_BIT {
        let chunk = (CONTINUATION_BIT | (value & 0x1f)) as u8;
        encoded.push((chunk + ALPHABET_OFFSET) as char);
        value >>= 5;
    }
    encoded.push((value as u8 + ALPHABET_OFFSET) as char);
}
