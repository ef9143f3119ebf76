//! Writes a synthetic `student-mat.csv` with the survey's schema.
//!
//! The file is `;`-delimited like the published dataset, so loading it also
//! exercises the delimiter fallback.

use anyhow::{Context, Result};

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

    /// Uniform integer in `lo..=hi`.
    fn int(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as i64
    }

    /// Pick from `(item, weight)` pairs.
    fn weighted<'a>(&mut self, choices: &[(&'a str, f64)]) -> &'a str {
        let total: f64 = choices.iter().map(|(_, w)| w).sum();
        let mut target = self.next_f64() * total;
        for (item, weight) in choices {
            if target < *weight {
                return *item;
            }
            target -= weight;
        }
        choices[choices.len() - 1].0
    }
}

const HEADER: [&str; 14] = [
    "school", "sex", "age", "famsize", "Medu", "Fedu", "studytime", "failures", "Dalc", "Walc",
    "absences", "G1", "G2", "G3",
];

const STUDENTS: usize = 395;

fn grade(value: f64) -> i64 {
    value.round().clamp(0.0, 20.0) as i64
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "student-mat.csv".to_string());

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(HEADER)?;

    for _ in 0..STUDENTS {
        let school = rng.weighted(&[("GP", 0.88), ("MS", 0.12)]);
        let sex = rng.weighted(&[("F", 0.53), ("M", 0.47)]);
        let age = rng.int(15, 19);
        let famsize = rng.weighted(&[("GT3", 0.71), ("LE3", 0.29)]);
        let medu = rng.int(0, 4);
        let fedu = rng.int(0, 4);
        let studytime = rng.int(1, 4);
        let failures = *[0, 0, 0, 0, 0, 0, 1, 1, 2, 3]
            .get(rng.int(0, 9) as usize)
            .unwrap_or(&0);
        let dalc = rng.int(1, 5);
        let walc = (dalc + rng.int(0, 2)).min(5);
        let absences = (rng.gauss(0.0, 8.0).abs()).round() as i64;

        // Grades drift from a per-student ability; failures and absences pull down.
        let ability = rng.gauss(11.0, 3.0) + 0.4 * studytime as f64 + 0.3 * medu as f64
            - 1.8 * failures as f64
            - 0.05 * absences as f64;
        let g1 = grade(ability + rng.gauss(0.0, 1.2));
        let g2 = grade(ability + rng.gauss(0.0, 1.2));
        let g3 = if rng.next_f64() < 0.08 {
            0
        } else {
            grade(0.3 * g1 as f64 + 0.7 * g2 as f64 + rng.gauss(0.0, 1.0))
        };

        writer.write_record([
            school.to_string(),
            sex.to_string(),
            age.to_string(),
            famsize.to_string(),
            medu.to_string(),
            fedu.to_string(),
            studytime.to_string(),
            failures.to_string(),
            dalc.to_string(),
            walc.to_string(),
            absences.to_string(),
            g1.to_string(),
            g2.to_string(),
            g3.to_string(),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {STUDENTS} students to {output_path}");
    Ok(())
}
