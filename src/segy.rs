//! SEG-Y-like trace container.
//!
//! Only the header subset below is populated; everything else is zero.
//!
//! ```text
//! [textual header: 3200 bytes ASCII, space padded]
//! [binary header: 400 bytes]   16: dt (us, i16)  20: samples/trace (i16)  24: format code 5 (i16)
//! per trace:
//!   [trace header: 240 bytes]  0, 20: sequence number (i32)  36: shot x (i32)  40: receiver x (i32)
//!                              114: samples (i16)  116: dt (us, i16)
//!   [samples: nt x f32]
//! ```
//! All integers and samples are big-endian.

use crate::error::{SynthError, SynthResult};
use crate::gather::ShotGather;
use std::io::Write;

pub const TEXT_HEADER_LEN: usize = 3200;
pub const BINARY_HEADER_LEN: usize = 400;
pub const TRACE_HEADER_LEN: usize = 240;

/// Data sample format code for IEEE float32
pub const FORMAT_IEEE_FLOAT: i16 = 5;

const TEXT_HEADER: &str = "C01 SEISMIC-SYNTH SYNTHETIC SEG-Y-LIKE FILE\n\
C02 NOT FULL SEG-Y COMPLIANCE; CORE HEADER+TRACE STRUCTURE ONLY\n\
C03 SAMPLES: IEEE FLOAT32 BIG-ENDIAN\n\
C04 GENERATED BY seismic-synth\n";

fn put_i16(buf: &mut [u8], offset: usize, value: i16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

fn put_i32(buf: &mut [u8], offset: usize, value: i32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

fn to_i16(field: &'static str, value: i64) -> SynthResult<i16> {
    i16::try_from(value).map_err(|_| SynthError::HeaderOverflow { field, value })
}

/// Exact size of the encoded container.
pub fn encoded_len(n_traces: usize, nt: usize) -> usize {
    TEXT_HEADER_LEN + BINARY_HEADER_LEN + n_traces * (TRACE_HEADER_LEN + 4 * nt)
}

/// ASCII block truncated or space padded to exactly 3200 bytes.
pub fn text_header(text: &str) -> [u8; TEXT_HEADER_LEN] {
    let mut block = [b' '; TEXT_HEADER_LEN];
    let ascii: Vec<u8> = text.bytes().filter(u8::is_ascii).take(TEXT_HEADER_LEN).collect();
    block[..ascii.len()].copy_from_slice(&ascii);
    block
}

pub fn binary_header(dt_us: i16, nt: i16) -> [u8; BINARY_HEADER_LEN] {
    let mut bh = [0u8; BINARY_HEADER_LEN];
    put_i16(&mut bh, 16, dt_us);
    put_i16(&mut bh, 20, nt);
    put_i16(&mut bh, 24, FORMAT_IEEE_FLOAT);
    bh
}

pub fn trace_header(sequence: i32, shot_x: i32, receiver_x: i32, nt: i16, dt_us: i16) -> [u8; TRACE_HEADER_LEN] {
    let mut th = [0u8; TRACE_HEADER_LEN];
    put_i32(&mut th, 0, sequence);
    put_i32(&mut th, 20, sequence);
    put_i32(&mut th, 36, shot_x);
    put_i32(&mut th, 40, receiver_x);
    put_i16(&mut th, 114, nt);
    put_i16(&mut th, 116, dt_us);
    th
}

/// Writes `gather` as a SEG-Y-like stream.
pub fn write_segy_like<W: Write>(writer: &mut W, gather: &ShotGather) -> SynthResult<()> {
    let nt = to_i16("samples per trace", gather.nt() as i64)?;
    let dt_us = to_i16("sample interval", (gather.dt * 1e6).round_ties_even() as i64)?;
    let geometry = &gather.geometry;

    writer.write_all(&text_header(TEXT_HEADER))?;
    writer.write_all(&binary_header(dt_us, nt))?;

    let mut samples = Vec::with_capacity(4 * gather.nt());
    for (tr, trace) in gather.traces.outer_iter().enumerate() {
        // Coordinates are truncated toward zero
        let header = trace_header(
            tr as i32 + 1,
            geometry.shot_x as i32,
            geometry.receiver_x(tr) as i32,
            nt,
            dt_us,
        );
        writer.write_all(&header)?;

        samples.clear();
        for v in trace.iter() {
            samples.extend_from_slice(&v.to_be_bytes());
        }
        writer.write_all(&samples)?;
    }
    Ok(())
}

/// Encodes `gather` into an in-memory buffer.
pub fn encode_segy_like(gather: &ShotGather) -> SynthResult<Vec<u8>> {
    let mut out = Vec::with_capacity(encoded_len(gather.n_receivers(), gather.nt()));
    write_segy_like(&mut out, gather)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gather::GatherGeometry;
    use ndarray::Array2;

    fn be_i16(b: &[u8], at: usize) -> i16 {
        i16::from_be_bytes([b[at], b[at + 1]])
    }

    fn be_i32(b: &[u8], at: usize) -> i32 {
        i32::from_be_bytes(b[at..at + 4].try_into().unwrap())
    }

    fn small_gather(n_traces: usize, nt: usize, dt: f64) -> ShotGather {
        let traces = Array2::from_shape_fn((n_traces, nt), |(r, c)| r as f32 + c as f32 * 0.25);
        ShotGather::from_traces(
            traces,
            dt,
            GatherGeometry {
                shot_x: 960.7,
                shot_z: 20.0,
                receiver_x0: 20.0,
                receiver_dx: 12.5,
            },
        )
    }

    #[test]
    fn test_binary_header_fields() {
        let bytes = encode_segy_like(&small_gather(4, 100, 0.002)).unwrap();
        assert_eq!(bytes.len(), encoded_len(4, 100));

        let bh = &bytes[TEXT_HEADER_LEN..TEXT_HEADER_LEN + BINARY_HEADER_LEN];
        assert_eq!(be_i16(bh, 16), 2000);
        assert_eq!(be_i16(bh, 20), 100);
        assert_eq!(be_i16(bh, 24), 5);
        assert!(bh[26..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_trace_header_fields() {
        let bytes = encode_segy_like(&small_gather(4, 100, 0.002)).unwrap();
        let stride = TRACE_HEADER_LEN + 4 * 100;
        let third = TEXT_HEADER_LEN + BINARY_HEADER_LEN + 2 * stride;
        let th = &bytes[third..third + TRACE_HEADER_LEN];

        assert_eq!(be_i32(th, 0), 3);
        assert_eq!(be_i32(th, 20), 3);
        assert_eq!(be_i32(th, 36), 960);
        assert_eq!(be_i32(th, 40), 45);
        assert_eq!(be_i16(th, 114), 100);
        assert_eq!(be_i16(th, 116), 2000);
        assert!(th[4..20].iter().all(|&b| b == 0));
        assert!(th[118..].iter().all(|&b| b == 0));

        // First sample of trace 3 is 2.0, second 2.25
        let data = &bytes[third + TRACE_HEADER_LEN..];
        assert_eq!(&data[..4], &2.0_f32.to_be_bytes());
        assert_eq!(&data[4..8], &2.25_f32.to_be_bytes());
    }

    #[test]
    fn test_text_header_is_padded_ascii() {
        let bytes = encode_segy_like(&small_gather(1, 8, 0.001)).unwrap();
        let text = &bytes[..TEXT_HEADER_LEN];
        assert!(text.starts_with(b"C01 "));
        assert!(text.is_ascii());
        assert_eq!(text[TEXT_HEADER_LEN - 1], b' ');

        let long = "X".repeat(5000);
        assert!(text_header(&long).iter().all(|&b| b == b'X'));
    }

    #[test]
    fn test_overflowing_sample_count_is_rejected() {
        let gather = small_gather(1, 40_000, 0.001);
        match encode_segy_like(&gather) {
            Err(SynthError::HeaderOverflow { value, .. }) => assert_eq!(value, 40_000),
            other => panic!("expected overflow, got {:?}", other.map(|b| b.len())),
        }
    }
}
