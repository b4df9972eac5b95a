//! Temporary directories standing in for the service's filesystem layout

use std::io::Cursor;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Voice written into every workspace
pub const DEFAULT_VOICE: &str = "voice_01";

/// Scratch output, voice and checkpoint directories under one temp dir
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// Create a workspace holding the default voice sample
    ///
    /// The output directory is left for the server to create.
    pub fn new() -> Self {
        let workspace = Self {
            dir: tempfile::tempdir().expect("temp dir"),
        };
        std::fs::create_dir_all(workspace.voice_dir()).expect("voice dir");
        workspace.add_voice(DEFAULT_VOICE);
        workspace
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root().join("outputs")
    }

    pub fn voice_dir(&self) -> PathBuf {
        self.root().join("voices")
    }

    pub fn checkpoint_dir(&self) -> PathBuf {
        self.root().join("checkpoints")
    }

    /// Write a reference sample for `voice_id`
    pub fn add_voice(&self, voice_id: &str) {
        let path = self.voice_dir().join(format!("{voice_id}.wav"));
        std::fs::write(path, sine_wav(8_000, 0.25)).expect("voice sample");
    }

    /// Create the checkpoint directory and model config file
    pub fn add_checkpoints(&self) {
        std::fs::create_dir_all(self.checkpoint_dir()).expect("checkpoint dir");
        std::fs::write(self.checkpoint_dir().join("config.yaml"), "model: test\n").expect("model config");
    }

    /// Files currently left in the output directory
    pub fn scratch_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.output_dir()) {
            Ok(entries) => entries.filter_map(|entry| entry.ok().map(|e| e.path())).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Mono 16-bit sine tone encoded as WAV
pub fn sine_wav(sample_rate: u32, duration_secs: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
        let samples = (sample_rate as f32 * duration_secs) as u32;
        for n in 0..samples {
            let t = n as f32 / sample_rate as f32;
            let amplitude = (t * 440.0 * std::f32::consts::TAU).sin();
            writer.write_sample((amplitude * f32::from(i16::MAX) * 0.5) as i16).expect("sample");
        }
        writer.finalize().expect("finalize wav");
    }

    cursor.into_inner()
}

/// Read the header of a WAV file held in memory
pub fn wav_spec(bytes: &[u8]) -> hound::WavSpec {
    hound::WavReader::new(Cursor::new(bytes)).expect("valid wav").spec()
}
