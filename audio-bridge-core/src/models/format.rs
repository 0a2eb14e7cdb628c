/// PCM stream description shared by the capture and render paths.
///
/// The frame size is derived from the channel count and bit depth when the
/// format is built and cannot be set on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamFormat {
    channel_count: u16,
    sample_rate: u32,
    bits_per_sample: u16,
    frame_size_bytes: u32,
}

impl StreamFormat {
    /// Stereo, 44100 Hz, 16-bit.
    pub const STEREO_44100_16: StreamFormat = StreamFormat::build(2, 44_100, 16);

    /// Build a PCM format. Pure; any positive inputs are accepted.
    pub const fn build(channel_count: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        Self {
            channel_count,
            sample_rate,
            bits_per_sample,
            frame_size_bytes: channel_count as u32 * (bits_per_sample as u32 / 8),
        }
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Bytes in one frame (one sample for every channel).
    pub fn frame_size_bytes(&self) -> u32 {
        self.frame_size_bytes
    }

    pub fn avg_bytes_per_sec(&self) -> u32 {
        self.sample_rate.saturating_mul(self.frame_size_bytes)
    }

    /// Byte length of `frames` whole frames.
    pub fn frames_to_bytes(&self, frames: u32) -> usize {
        frames as usize * self.frame_size_bytes as usize
    }

    /// Byte length of `seconds` of audio at this format's byte rate.
    pub fn skip_bytes(&self, seconds: u32) -> usize {
        self.avg_bytes_per_sec() as usize * seconds as usize
    }

    /// Playback duration of `bytes` bytes of audio.
    pub fn duration_secs(&self, bytes: u64) -> f64 {
        match self.avg_bytes_per_sec() {
            0 => 0.0,
            rate => bytes as f64 / rate as f64,
        }
    }
}

impl Default for StreamFormat {
    fn default() -> Self {
        Self::STEREO_44100_16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn frame_size_follows_channels_and_bits() {
        for &(channels, rate, bits) in &[(1u16, 8000u32, 8u16), (2, 44_100, 16), (2, 48_000, 24), (6, 96_000, 32)] {
            let format = StreamFormat::build(channels, rate, bits);
            assert_eq!(format.frame_size_bytes(), channels as u32 * bits as u32 / 8);
            assert_eq!(format.avg_bytes_per_sec(), rate * format.frame_size_bytes());
        }
    }

    #[test]
    fn default_is_cd_stereo() {
        let format = StreamFormat::default();
        assert_eq!(format.channel_count(), 2);
        assert_eq!(format.sample_rate(), 44_100);
        assert_eq!(format.bits_per_sample(), 16);
        assert_eq!(format.frame_size_bytes(), 4);
        assert_eq!(format.avg_bytes_per_sec(), 176_400);
    }

    #[test]
    fn five_second_skip() {
        assert_eq!(StreamFormat::default().skip_bytes(5), 2 * 2 * 44_100 * 5);
    }

    #[test]
    fn duration_of_one_second() {
        let format = StreamFormat::default();
        assert_relative_eq!(format.duration_secs(176_400), 1.0);
        assert_relative_eq!(StreamFormat::build(2, 0, 16).duration_secs(100), 0.0);
    }
}
