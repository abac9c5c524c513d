//! Derived speech metrics computed in-process from the normalized waveform
//! and the transcript: speaking rate, fluency, and the spectral/amplitude
//! voice-quality numbers.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde::Serialize;

/// Speaking rate treated as "fully fluent"; the fluency score saturates here.
pub const FULLY_FLUENT_WPM: f64 = 150.0;

/// Analysis frame length in samples.
const FRAME_LEN: usize = 2048;
/// Hop between analysis frames in samples.
const HOP_LEN: usize = 512;
/// Pitch candidates outside this band are discarded.
const PITCH_MIN_HZ: f64 = 150.0;
const PITCH_MAX_HZ: f64 = 4000.0;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoiceMetrics {
    /// Mean of the positive-valued pitch-track bins, in Hz.
    pub pitch: f64,
    /// Mean of the framed RMS envelope.
    pub volume: f64,
    /// Standard deviation of the raw waveform amplitude.
    pub clarity: f64,
}

pub fn word_count(transcript: &str) -> usize {
    transcript.split_whitespace().count()
}

/// Words per minute; 0 when the recording has no duration.
pub fn words_per_minute(word_count: usize, duration_seconds: f64) -> f64 {
    if duration_seconds <= 0.0 {
        return 0.0;
    }
    word_count as f64 / (duration_seconds / 60.0)
}

/// Speaking-rate score normalized to [0, 1], saturating at 150 wpm.
pub fn fluency_score(wpm: f64) -> f64 {
    (wpm / FULLY_FLUENT_WPM).min(1.0)
}

pub fn analyze_waveform(samples: &[f32], sample_rate: u32) -> VoiceMetrics {
    VoiceMetrics {
        pitch: mean_pitch(samples, sample_rate),
        volume: mean_rms(samples),
        clarity: amplitude_std_dev(samples),
    }
}

/// Mean RMS over FRAME_LEN windows advanced by HOP_LEN.
fn mean_rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let mut sum = 0.0f64;
    let mut frames = 0usize;
    let mut start = 0usize;
    while start < samples.len() {
        let end = (start + FRAME_LEN).min(samples.len());
        let frame = &samples[start..end];
        let energy: f64 = frame.iter().map(|s| (*s as f64) * (*s as f64)).sum();
        sum += (energy / frame.len() as f64).sqrt();
        frames += 1;
        start += HOP_LEN;
    }

    sum / frames as f64
}

fn amplitude_std_dev(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean: f64 = samples.iter().map(|s| *s as f64).sum::<f64>() / n;
    let var: f64 = samples
        .iter()
        .map(|s| {
            let d = *s as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    var.sqrt()
}

/// Mean of the positive pitch-track entries.
///
/// Each Hann-windowed frame contributes its spectral peaks within the
/// voice band; a peak counts when it is a local maximum above 10% of the
/// frame's strongest bin. A waveform with no voiced frames (e.g. silence)
/// yields 0.0 rather than an undefined mean.
fn mean_pitch(samples: &[f32], sample_rate: u32) -> f64 {
    if samples.len() < FRAME_LEN {
        return 0.0;
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(FRAME_LEN);

    let window: Vec<f64> = (0..FRAME_LEN)
        .map(|i| {
            let x = std::f64::consts::PI * 2.0 * i as f64 / (FRAME_LEN as f64 - 1.0);
            0.5 * (1.0 - x.cos())
        })
        .collect();

    let bin_hz = sample_rate as f64 / FRAME_LEN as f64;
    let mut pitch_sum = 0.0f64;
    let mut pitch_count = 0usize;

    let mut start = 0usize;
    while start + FRAME_LEN <= samples.len() {
        let mut buf: Vec<Complex<f64>> = samples[start..start + FRAME_LEN]
            .iter()
            .zip(window.iter())
            .map(|(s, w)| Complex::new(*s as f64 * w, 0.0))
            .collect();
        fft.process(&mut buf);

        let mags: Vec<f64> = buf[..FRAME_LEN / 2].iter().map(|c| c.norm()).collect();
        let frame_max = mags.iter().cloned().fold(0.0f64, f64::max);
        if frame_max <= 0.0 {
            start += HOP_LEN;
            continue;
        }
        let threshold = frame_max * 0.1;

        for bin in 1..mags.len() - 1 {
            let mag = mags[bin];
            if mag < threshold || mag <= mags[bin - 1] || mag <= mags[bin + 1] {
                continue;
            }
            let freq = bin as f64 * bin_hz;
            if (PITCH_MIN_HZ..=PITCH_MAX_HZ).contains(&freq) {
                pitch_sum += freq;
                pitch_count += 1;
            }
        }

        start += HOP_LEN;
    }

    if pitch_count == 0 {
        0.0
    } else {
        pitch_sum / pitch_count as f64
    }
}
