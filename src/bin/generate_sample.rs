//! Writes a deterministic demo CSV shaped like a hand-edited spreadsheet export:
//! thousands separators, currency signs, percent suffixes and the odd bad cell.

fn format_with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

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
}

fn main() {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_data.csv".to_string());

    let mut rng = SimpleRng::new(42);

    let chains = [
        ("Ethereum", "L1"),
        ("Solana", "L1"),
        ("Tron", "L1"),
        ("Arbitrum", "L2"),
        ("Base", "L2"),
        ("Optimism", "L2"),
        ("Blast", "L2"),
        ("Osmosis", "Appchain"),
        ("dYdX", "Appchain"),
        ("Injective", "Appchain"),
        ("Mystery", ""),
    ];

    let mut writer = csv::Writer::from_path(&output_path).expect("Failed to create output file");
    writer
        .write_record(["Rank", "Name", "Category", "Volume", "Change %"])
        .expect("Failed to write header");

    for (i, (name, category)) in chains.iter().enumerate() {
        // Volumes spread across K / M / B magnitudes.
        let magnitude = 10f64.powf(3.0 + rng.next_f64() * 7.0);
        let volume = match i % 4 {
            0 => format!("${}", format_with_commas(magnitude as u64)),
            1 => format_with_commas(magnitude as u64),
            2 => format!("{magnitude:.2}"),
            _ if i == 7 => "n/a".to_string(),
            _ => format!("{}", magnitude as u64),
        };

        let change = (rng.next_f64() - 0.5) * 40.0;
        let change = if i == 5 {
            "0%".to_string()
        } else {
            format!("{change:.1}%")
        };

        writer
            .write_record([
                (i + 1).to_string(),
                name.to_string(),
                category.to_string(),
                volume,
                change,
            ])
            .expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush output");

    println!("Wrote {} rows to {output_path}", chains.len());
}
