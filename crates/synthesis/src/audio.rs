use std::io::Cursor;

/// Header facts about a generated waveform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f64,
}

/// Read the WAV header of `bytes`
pub fn inspect(bytes: &[u8]) -> Result<WaveformInfo, hound::Error> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    Ok(WaveformInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        duration_secs: f64::from(reader.duration()) / f64::from(spec.sample_rate),
    })
}
