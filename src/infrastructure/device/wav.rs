//! Streaming PCM16 WAV framing
//!
//! Native adapters emit a header fragment first and raw PCM after it. The
//! header is written before the length is known, so the size fields are
//! patched once the whole artifact is available.

use bytes::{BufMut, Bytes, BytesMut};

/// Size of the canonical PCM header
pub const WAV_HEADER_LEN: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;

/// Header with zeroed size fields, to be patched by [`finalize_wav`]
pub fn streaming_header(sample_rate: u32, channels: u16) -> Bytes {
    let block_align = channels * (BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate * u32::from(block_align);

    let mut header = BytesMut::with_capacity(WAV_HEADER_LEN);
    header.put_slice(b"RIFF");
    header.put_u32_le(0);
    header.put_slice(b"WAVE");

    header.put_slice(b"fmt ");
    header.put_u32_le(16);
    header.put_u16_le(1); // PCM
    header.put_u16_le(channels);
    header.put_u32_le(sample_rate);
    header.put_u32_le(byte_rate);
    header.put_u16_le(block_align);
    header.put_u16_le(BITS_PER_SAMPLE);

    header.put_slice(b"data");
    header.put_u32_le(0);
    header.freeze()
}

/// Encode samples as little-endian PCM16 bytes
pub fn pcm16_bytes(samples: &[i16]) -> Bytes {
    let mut out = BytesMut::with_capacity(samples.len() * 2);
    for sample in samples {
        out.put_i16_le(*sample);
    }
    out.freeze()
}

/// Fill in the RIFF and data sizes of a complete WAV buffer.
/// Buffers that do not start with a RIFF header are returned unchanged.
pub fn finalize_wav(data: &Bytes) -> Bytes {
    if data.len() < WAV_HEADER_LEN || &data[..4] != b"RIFF" || &data[36..40] != b"data" {
        return data.clone();
    }

    let total = u32::try_from(data.len()).unwrap_or(u32::MAX);
    let mut patched = BytesMut::from(data.as_ref());
    patched[4..8].copy_from_slice(&(total - 8).to_le_bytes());
    patched[40..44].copy_from_slice(&(total - WAV_HEADER_LEN as u32).to_le_bytes());
    patched.freeze()
}
