use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

/// One row in the upstream export layout.
#[derive(Serialize)]
struct ExportRow {
    date: String,
    #[serde(rename = "deepSleepTime")]
    deep_sleep_time: u32,
    #[serde(rename = "shallowSleepTime")]
    shallow_sleep_time: u32,
    #[serde(rename = "wakeTime")]
    wake_time: u32,
    start: i64,
    stop: i64,
}

/// Minimal deterministic PRNG (xoshiro256**). Seeded with a fixed value so
/// every run writes the same export; `gauss` draws the nightly minutes.
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

fn minutes(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let first = NaiveDate::from_ymd_opt(2018, 6, 1).context("invalid start date")?;
    let nights = 180;
    let output_path = "sample_sleep.csv";

    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    for i in 0..nights {
        let date = first + Duration::days(i);
        let weekend = matches!(date.weekday(), Weekday::Fri | Weekday::Sat);

        // Later nights before weekend days, with a longer lie-in.
        let bedtime_minutes = rng.gauss(if weekend { 60.0 } else { 0.0 }, 25.0);
        let deep = minutes(rng.gauss(95.0, 20.0));
        let shallow = minutes(rng.gauss(if weekend { 360.0 } else { 320.0 }, 35.0));
        let wake = minutes(rng.gauss(8.0, 6.0));

        let bedtime = date
            .and_hms_opt(23, 0, 0)
            .context("invalid bedtime")?
            .and_utc()
            + Duration::minutes(bedtime_minutes as i64);
        let start = bedtime.timestamp();
        let stop = start + i64::from(deep + shallow + wake) * 60;

        writer
            .serialize(ExportRow {
                date: date.format("%Y-%m-%d").to_string(),
                deep_sleep_time: deep,
                shallow_sleep_time: shallow,
                wake_time: wake,
                start,
                stop,
            })
            .with_context(|| format!("writing row for {date}"))?;
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {nights} nights to {output_path}");
    Ok(())
}
