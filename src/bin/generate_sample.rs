//! Writes a deterministic sample stock-variance CSV for demos and manual
//! testing. The output mimics the real sheet's quirks: mixed date formats,
//! Indonesian-style number formatting, and a handful of rows that fail
//! coercion on purpose.

use anyhow::{Context, Result};

const OUTPUT_PATH: &str = "sample_variance.csv";

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

    /// Uniform integer in `0..n`.
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Format a date the way one of the sheet's historical editors would have.
fn format_date(rng: &mut SimpleRng, day: u32, month: u32, year: i32) -> String {
    match rng.below(4) {
        0 => format!("{day:02}/{month:02}/{year}"),
        1 => format!("{day:02}-{month:02}-{year}"),
        2 => format!("{year}-{month:02}-{day:02}"),
        _ => {
            let names = [
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov",
                "Dec",
            ];
            format!("{day} {} {year}", names[(month - 1) as usize])
        }
    }
}

/// Format a rupiah amount with Indonesian thousands dots, sometimes plain.
fn format_value(rng: &mut SimpleRng, value: i64) -> String {
    if rng.below(2) == 0 {
        return value.to_string();
    }
    let sign = if value < 0 { "-" } else { "" };
    let digits = value.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let catalog: &[(&str, &str, &str, i64)] = &[
        ("100001", "INDOMIE GORENG 85G", "Food", 3_200),
        ("100002", "BERAS RAMOS 5KG", "Food", 68_000),
        ("100003", "MINYAK GORENG 2L", "Food", 38_500),
        ("200010", "TEH BOTOL SOSRO 450ML", "Drinks", 5_500),
        ("200011", "AQUA 600ML", "Drinks", 3_000),
        ("300055", "SABUN LIFEBUOY 85G", "Soap", 4_200),
        ("300056", "SHAMPOO CLEAR 170ML", "Soap", 21_000),
        ("400120", "ROKOK SURYA 12", "", 28_000),
    ];

    let mut writer = csv::Writer::from_path(OUTPUT_PATH)
        .with_context(|| format!("creating {OUTPUT_PATH}"))?;
    writer.write_record([
        "Tanggal SO",
        "PLU",
        "DESCP",
        "Tag",
        "Selisih Qty (Pcs)",
        "Selisih Value (Rp)",
    ])?;

    let mut rows = 0usize;
    // 90 days of counts, so the default view lands in monthly buckets and a
    // narrowed one in daily buckets.
    for day_offset in 0..90u32 {
        // 28-day months keep every generated date a valid calendar date.
        let month = 1 + day_offset / 28;
        let day = 1 + day_offset % 28;

        for (plu, descp, tag, unit_price) in catalog {
            // Not every product is counted every day.
            if rng.below(3) != 0 {
                continue;
            }

            let qty = rng.gauss(0.0, 4.0).round() as i64;
            let value = qty * unit_price;
            writer.write_record([
                format_date(&mut rng, day, month, 2025),
                plu.to_string(),
                descp.to_string(),
                tag.to_string(),
                qty.to_string(),
                format_value(&mut rng, value),
            ])?;
            rows += 1;
        }
    }

    // Rows that the cleaning stage should drop.
    for bad in [
        ["31-02-2025", "100001", "INDOMIE GORENG 85G", "Food", "5", "16000"],
        ["10/01/2025", "100002", "BERAS RAMOS 5KG", "Food", "x", "68000"],
        ["11/01/2025", "100003", "MINYAK GORENG 2L", "Food", "2", ""],
    ] {
        writer.write_record(bad)?;
        rows += 1;
    }

    writer.flush().context("flushing CSV")?;
    println!("Wrote {rows} rows to {OUTPUT_PATH}");
    Ok(())
}
