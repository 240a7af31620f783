//! Generates a deterministic synthetic dataset for the engagement study:
//! a 4×3 between-subjects design (caption length × hashtag count) with an
//! inverted-U response over caption length, a mild negative hashtag slope,
//! Gaussian noise, and a z-standardized outcome column.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

const OUT_PATH: &str = "data/FINAL_data_for_regression.csv";
const CAPTION_LENGTHS: [i64; 4] = [5, 70, 140, 200];
const HASHTAG_COUNTS: [i64; 3] = [5, 11, 15];
const PARTICIPANTS_PER_CELL: usize = 40;
const NOISE_SD: f64 = 0.6;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Inverted-U over caption length, peaking around 130 characters.
fn caption_effect(caption_length: f64) -> f64 {
    let d = (caption_length - 130.0) / 95.0;
    0.45 - d * d
}

/// Mild monotone penalty for piling on hashtags.
fn hashtag_effect(hashtags: f64) -> f64 {
    -0.018 * (hashtags - 10.0)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut captions: Vec<i64> = Vec::new();
    let mut hashtags: Vec<i64> = Vec::new();
    let mut scores: Vec<f64> = Vec::new();

    for &cap in &CAPTION_LENGTHS {
        for &tags in &HASHTAG_COUNTS {
            for _ in 0..PARTICIPANTS_PER_CELL {
                let signal = caption_effect(cap as f64) + hashtag_effect(tags as f64);
                captions.push(cap);
                hashtags.push(tags);
                scores.push(rng.gauss(signal, NOISE_SD));
            }
        }
    }

    // z-standardize the outcome across all rows (sample std, n−1).
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = var.sqrt();
    for s in &mut scores {
        *s = (*s - mean) / std;
    }

    let out = Path::new(OUT_PATH);
    if let Some(dir) = out.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut writer =
        csv::Writer::from_path(out).with_context(|| format!("creating {}", out.display()))?;
    writer.write_record(["Caption_Length", "Hashtags", "z_Engagement Intention Score"])?;
    for i in 0..captions.len() {
        writer.write_record([
            captions[i].to_string(),
            hashtags[i].to_string(),
            format!("{:.6}", scores[i]),
        ])?;
    }
    writer.flush()?;

    println!("wrote {} rows to {}", captions.len(), OUT_PATH);
    Ok(())
}
