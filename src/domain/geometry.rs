// Route geometry: coordinates and the encoded-polyline codec
use super::error::{PlanningError, PlanningResult};

/// Fixed-point scale of the polyline format (5 decimal digits).
const PRECISION: f64 = 1e5;
const CHAR_OFFSET: u8 = 63;
const CONTINUATION_BIT: u8 = 0x20;
const CHUNK_MASK: u8 = 0x1f;

/// A WGS-84 position in degrees, longitude first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Linear blend towards `other`; `frac` of 0 is `self`, 1 is `other`.
    pub fn lerp(self, other: Coordinate, frac: f64) -> Coordinate {
        Coordinate {
            lon: self.lon + frac * (other.lon - self.lon),
            lat: self.lat + frac * (other.lat - self.lat),
        }
    }
}

/// Decode an encoded polyline into route-ordered coordinates.
///
/// Each point is a latitude delta followed by a longitude delta, both
/// zig-zag encoded variable-length integers. Input that ends inside an
/// integer, or contains bytes outside `'?'..='~'`, is rejected.
pub fn decode(encoded: &str) -> PlanningResult<Vec<Coordinate>> {
    let bytes = encoded.as_bytes();
    let mut cursor = 0usize;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;
    let mut coords = Vec::with_capacity(bytes.len() / 4);

    while cursor < bytes.len() {
        lat = accumulate(lat, bytes, &mut cursor)?;
        lon = accumulate(lon, bytes, &mut cursor)?;
        coords.push(Coordinate::new(lon as f64 / PRECISION, lat as f64 / PRECISION));
    }

    Ok(coords)
}

fn accumulate(total: i64, bytes: &[u8], cursor: &mut usize) -> PlanningResult<i64> {
    let position = *cursor;
    let delta = read_delta(bytes, cursor)?;
    total.checked_add(delta).ok_or(PlanningError::MalformedGeometry {
        position,
        reason: "coordinate overflows",
    })
}

fn read_delta(bytes: &[u8], cursor: &mut usize) -> PlanningResult<i64> {
    let mut value: i64 = 0;
    let mut shift = 0u32;

    loop {
        let Some(&raw) = bytes.get(*cursor) else {
            return Err(PlanningError::MalformedGeometry {
                position: *cursor,
                reason: "input ends inside a value",
            });
        };
        if !(CHAR_OFFSET..=b'~').contains(&raw) {
            return Err(PlanningError::MalformedGeometry {
                position: *cursor,
                reason: "character outside the polyline alphabet",
            });
        }
        if shift > 60 {
            return Err(PlanningError::MalformedGeometry {
                position: *cursor,
                reason: "value does not fit in 64 bits",
            });
        }

        let chunk = raw - CHAR_OFFSET;
        value |= i64::from(chunk & CHUNK_MASK) << shift;
        shift += 5;
        *cursor += 1;

        if chunk & CONTINUATION_BIT == 0 {
            break;
        }
    }

    // zig-zag: low bit carries the sign
    Ok(if value & 1 == 1 { !(value >> 1) } else { value >> 1 })
}

/// Encode coordinates with the same delta/zig-zag scheme `decode` reads.
pub fn encode(coords: &[Coordinate]) -> String {
    let mut out = String::with_capacity(coords.len() * 8);
    let mut prev_lat = 0i64;
    let mut prev_lon = 0i64;

    for c in coords {
        let lat = (c.lat * PRECISION).round() as i64;
        let lon = (c.lon * PRECISION).round() as i64;
        write_delta(&mut out, lat - prev_lat);
        write_delta(&mut out, lon - prev_lon);
        prev_lat = lat;
        prev_lon = lon;
    }

    out
}

fn write_delta(out: &mut String, delta: i64) {
    let mut value = (if delta < 0 { !(delta << 1) } else { delta << 1 }) as u64;
    while value >= u64::from(CONTINUATION_BIT) {
        let chunk = (value as u8 & CHUNK_MASK) | CONTINUATION_BIT;
        out.push(char::from(chunk + CHAR_OFFSET));
        value >>= 5;
    }
    out.push(char::from(value as u8 + CHAR_OFFSET));
}
