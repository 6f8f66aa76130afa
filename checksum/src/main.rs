use std::io::Read;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input).context("read stdin")?;

    let n: i64 = input.trim().parse().context("expected a single integer")?;
    let n = u32::try_from(n.max(0)).unwrap_or(u32::MAX);

    println!("{}", checksum::compute(n));
    Ok(())
}
