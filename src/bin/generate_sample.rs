//! Writes a deterministic sample of processed client records.
//!
//! The headers use mixed case and padding, a few follow-up dates are not
//! dates, and some priorities are missing, so the file exercises every
//! normalization path of the loader.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const HEADERS: [&str; 8] = [
    "Client_ID",
    " Priority_Level ",
    "Follow_Up_Date",
    "Client_Tone",
    "Client_Intent",
    "Sentiment_Score",
    "Sentiment_Label",
    "Selected_Recommendation",
];

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "processed_client_data.csv".to_string());

    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("valid start date")?;

    let priorities = ["High", "Medium", "Low"];
    let tones = ["anxious", "calm", "frustrated", "optimistic"];
    let intents = [
        "plan retirement",
        "reduce fees",
        "update beneficiaries",
        "open education account",
    ];
    let recommendations = [
        "Schedule a planning call",
        "Send fee comparison",
        "Share beneficiary checklist",
        "Introduce 529 plan options",
    ];

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(HEADERS)?;

    let rows = 60;
    for i in 0..rows {
        let priority = if rng.next_f64() < 0.08 {
            ""
        } else {
            rng.pick(&priorities)
        };
        let follow_up = if rng.next_f64() < 0.1 {
            "TBD".to_string()
        } else {
            let offset = (rng.next_u64() % 120) as i64;
            (start + Duration::days(offset))
                .format("%Y-%m-%d")
                .to_string()
        };
        let score = rng.next_f64() * 2.0 - 1.0;
        let label = if score >= 0.0 { "POSITIVE" } else { "NEGATIVE" };

        writer.write_record([
            format!("C-{:04}", 1000 + i),
            priority.to_string(),
            follow_up,
            rng.pick(&tones).to_string(),
            rng.pick(&intents).to_string(),
            format!("{score:.3}"),
            label.to_string(),
            rng.pick(&recommendations).to_string(),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {rows} client records to {output_path}");
    Ok(())
}
