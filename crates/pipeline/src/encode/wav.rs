//! Canonical streaming WAV header for the `wav` format shortcut.

/// 44-byte canonical 32-bit-float WAV header with streaming-unknown sizes
/// (`0xFFFFFFFF` placeholders for the RIFF and data chunk sizes).
pub fn streaming_header(sample_rate: u32, channels: u16) -> [u8; 44] {
    const BITS_PER_SAMPLE: u16 = 32;
    const FMT_FLOAT: u16 = 3;

    let byte_rate = sample_rate * channels as u32 * 4;
    let block_align = channels * 4;

    let mut header = [0u8; 44];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&FMT_FLOAT.to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());

    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_has_canonical_layout() {
        let header = streaming_header(24_000, 1);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(&header[36..40], b"data");
        assert_eq!(header.len(), 44);
    }

    #[test]
    fn byte_rate_and_block_align_match_formula() {
        let header = streaming_header(24_000, 2);
        let byte_rate = u32::from_le_bytes(header[28..32].try_into().unwrap());
        let block_align = u16::from_le_bytes(header[32..34].try_into().unwrap());
        assert_eq!(byte_rate, 24_000 * 2 * 4);
        assert_eq!(block_align, 2 * 4);
    }

    #[test]
    fn data_size_is_streaming_placeholder() {
        let header = streaming_header(16_000, 1);
        let data_size = u32::from_le_bytes(header[40..44].try_into().unwrap());
        assert_eq!(data_size, 0xFFFF_FFFF);
    }
}
