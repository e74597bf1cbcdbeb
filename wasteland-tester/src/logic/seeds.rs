use anyhow::{Result, bail};
use std::collections::HashSet;

const DEFAULT_SEED: u64 = 1337;

/// Resolve a list of CLI seed arguments into session seeds.
///
/// Supports decimal integers (negative values use their magnitude) and
/// `0x`-prefixed hex. Duplicates are dropped, first occurrence wins.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        let seed = parse_seed(token)?;
        if seen.insert(seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }

    Ok(seeds)
}

fn parse_seed(token: &str) -> Result<u64> {
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        if let Ok(value) = u64::from_str_radix(&hex.replace('_', ""), 16) {
            return Ok(value);
        }
        bail!("Unrecognized seed token: {token}");
    }

    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }

    if let Ok(value) = token.parse::<u64>() {
        return Ok(value);
    }

    bail!("Unrecognized seed token: {token}");
}
