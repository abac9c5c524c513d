//! Waveform preparation: every ingest is normalized to the native format
//! (16 kHz mono PCM WAV) before any collaborator or metric sees it.
//! Compressed/container formats go through an ffmpeg transcode; WAV input
//! is decoded in-process and resampled only when needed.

use anyhow::{anyhow, Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use rubato::{FftFixedIn, Resampler};
use std::path::{Path, PathBuf};
use tokio::process::Command;

pub const NATIVE_SAMPLE_RATE: u32 = 16_000;

/// Extensions the upload surface accepts.
const ACCEPTED_EXTENSIONS: &[&str] = &["mp3", "mp4", "wav"];
/// Extensions that must be transcoded before analysis.
const TRANSCODE_EXTENSIONS: &[&str] = &["mp3", "mp4"];

const RESAMPLER_CHUNK_SIZE: usize = 1024;

/// A waveform in the native format, ready for the collaborator chain.
#[derive(Debug)]
pub struct PreparedAudio {
    /// 16 kHz mono WAV on disk, fed to the transcription and emotion
    /// collaborators.
    pub wav_path: PathBuf,
    /// The same waveform in memory, for the in-process metrics.
    pub samples: Vec<f32>,
    /// Whether `wav_path` is a scratch file this ingest owns.
    is_temp: bool,
}

impl PreparedAudio {
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / NATIVE_SAMPLE_RATE as f64
    }

    /// Remove the scratch waveform, if any. Best-effort.
    pub fn cleanup(&self) {
        if self.is_temp {
            if let Err(e) = std::fs::remove_file(&self.wav_path) {
                log::warn!("Failed to remove scratch waveform {:?}: {}", self.wav_path, e);
            }
        }
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

pub fn is_accepted(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn needs_transcode(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| TRANSCODE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Normalize `source` into a 16 kHz mono waveform under `work_dir`.
///
/// Formats outside the native one are transcoded with ffmpeg into a
/// uniquely-named scratch file; WAV input is passed through unless its
/// rate or channel layout differs, in which case a normalized copy is
/// written so every downstream consumer sees the same samples.
pub async fn prepare_waveform(source: &Path, work_dir: &Path) -> Result<PreparedAudio> {
    if !source.exists() {
        return Err(anyhow!("Audio file not found: {:?}", source));
    }

    if needs_transcode(source) {
        let wav_path = scratch_wav_path(work_dir);
        transcode_to_native(source, &wav_path).await?;
        let (samples, spec) = load_wav(&wav_path)?;
        // ffmpeg already wrote 16 kHz mono; trust but verify.
        if spec.sample_rate != NATIVE_SAMPLE_RATE || spec.channels != 1 {
            let _ = std::fs::remove_file(&wav_path);
            return Err(anyhow!(
                "Transcode produced unexpected format: {} Hz, {} channel(s)",
                spec.sample_rate,
                spec.channels
            ));
        }
        return Ok(PreparedAudio {
            wav_path,
            samples,
            is_temp: true,
        });
    }

    // Passthrough: assume the file already holds a waveform.
    let (raw, spec) = load_wav(source)?;
    let mono = downmix(&raw, spec.channels as usize);

    if spec.sample_rate == NATIVE_SAMPLE_RATE && spec.channels == 1 {
        return Ok(PreparedAudio {
            wav_path: source.to_path_buf(),
            samples: mono,
            is_temp: false,
        });
    }

    log::info!(
        "Normalizing {:?} from {} Hz / {} channel(s)",
        source,
        spec.sample_rate,
        spec.channels
    );
    let samples = if spec.sample_rate == NATIVE_SAMPLE_RATE {
        mono
    } else {
        resample(&mono, spec.sample_rate, NATIVE_SAMPLE_RATE)?
    };

    let wav_path = scratch_wav_path(work_dir);
    write_native_wav(&wav_path, &samples)?;

    Ok(PreparedAudio {
        wav_path,
        samples,
        is_temp: true,
    })
}

fn scratch_wav_path(work_dir: &Path) -> PathBuf {
    work_dir.join(format!("ingest_{}.wav", uuid::Uuid::new_v4().simple()))
}

async fn transcode_to_native(source: &Path, dest: &Path) -> Result<()> {
    log::info!("Transcoding {:?} to native waveform", source);

    let output = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(source)
        .args(["-ac", "1", "-ar", "16000", "-map", "0:a:0"])
        .arg(dest)
        .output()
        .await
        .context("Failed to run ffmpeg")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("ffmpeg failed: {}", stderr.trim()));
    }

    Ok(())
}

fn load_wav(path: &Path) -> Result<(Vec<f32>, WavSpec)> {
    let mut reader =
        WavReader::open(path).with_context(|| format!("Failed to read WAV {:?}", path))?;
    let spec = reader.spec();

    let samples: Result<Vec<f32>, _> = match spec.sample_format {
        SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
                .collect(),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / i32::MAX as f32))
                .collect(),
            other => return Err(anyhow!("Unsupported WAV bit depth: {}", other)),
        },
        SampleFormat::Float => reader.samples::<f32>().collect(),
    };

    Ok((samples?, spec))
}

fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

fn resample(samples: &[f32], from_hz: u32, to_hz: u32) -> Result<Vec<f32>> {
    let mut resampler = FftFixedIn::<f32>::new(
        from_hz as usize,
        to_hz as usize,
        RESAMPLER_CHUNK_SIZE,
        1,
        1,
    )
    .map_err(|e| anyhow!("Failed to create resampler: {}", e))?;

    let mut output = Vec::new();
    let mut pos = 0usize;

    while pos + RESAMPLER_CHUNK_SIZE <= samples.len() {
        let chunk = &samples[pos..pos + RESAMPLER_CHUNK_SIZE];
        let resampled = resampler
            .process(&[chunk], None)
            .map_err(|e| anyhow!("Resampling failed: {}", e))?;
        output.extend_from_slice(&resampled[0]);
        pos += RESAMPLER_CHUNK_SIZE;
    }

    // Zero-pad the tail chunk, then keep only the part that maps to real input.
    if pos < samples.len() {
        let remaining = samples.len() - pos;
        let mut tail = vec![0.0f32; RESAMPLER_CHUNK_SIZE];
        tail[..remaining].copy_from_slice(&samples[pos..]);
        let resampled = resampler
            .process(&[tail.as_slice()], None)
            .map_err(|e| anyhow!("Resampling failed: {}", e))?;
        let keep = (remaining as f64 * to_hz as f64 / from_hz as f64) as usize;
        output.extend_from_slice(&resampled[0][..keep.min(resampled[0].len())]);
    }

    Ok(output)
}

fn write_native_wav(path: &Path, samples: &[f32]) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: NATIVE_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer =
        WavWriter::create(path, spec).with_context(|| format!("Failed to create {:?}", path))?;
    for sample in samples {
        let v = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(v)?;
    }
    writer.finalize()?;

    Ok(())
}
