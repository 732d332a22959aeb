use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use format_num::format_num;

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

    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + self.next_u64() % (hi - lo + 1)
    }
}

/// `1234567.5` → `"$1,234,568"`, the way spreadsheet exports print money.
fn dollars(value: f64) -> String {
    format!("${}", format_num!(",.0f", value.round()))
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let retailers = ["Foot Locker", "Walmart", "Sports Direct", "West Gear", "Kohl's", "Amazon"];
    let regions = ["Northeast", "South", "West", "Midwest", "Southeast"];
    let products = [
        "Men's Street Footwear",
        "Men's Athletic Footwear",
        "Women's Street Footwear",
        "Women's Athletic Footwear",
        "Men's Apparel",
        "Women's Apparel",
    ];
    let methods = ["In-store", "Online", "Outlet"];
    let first_day = NaiveDate::from_ymd_opt(2021, 1, 1).context("invalid start date")?;

    let output_path = "sample_sales.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    // Headers carry stray whitespace on purpose; the cleaner trims them.
    writer.write_record([
        "Retailer",
        " Region",
        "Product ",
        "Price per Unit",
        "Units Sold",
        "Total Sales",
        "Operating Profit",
        "Operating Margin",
        "Sales Method",
        "Invoice Date",
    ])?;

    let n_rows = 500;
    for i in 0..n_rows {
        let price = rng.range(20, 110) as f64;
        let units = rng.range(50, 1500);
        let total = price * units as f64;
        let margin = 0.2 + rng.next_f64() * 0.4;
        let day = first_day
            .checked_add_days(Days::new(rng.range(0, 729)))
            .context("date out of range")?;

        // Every 50th row is unusable so the cleaner has something to drop.
        let total_text = if i % 50 == 7 { "free".to_string() } else { dollars(total) };
        let units_text = if i % 50 == 23 { String::new() } else { units.to_string() };

        writer.write_record([
            rng.pick(&retailers).to_string(),
            rng.pick(&regions).to_string(),
            rng.pick(&products).to_string(),
            format!("${price:.2}"),
            units_text,
            total_text,
            dollars(total * margin),
            format!("{:.0}%", margin * 100.0),
            rng.pick(&methods).to_string(),
            day.format("%m/%d/%Y").to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {n_rows} sales records to {output_path}");
    Ok(())
}
