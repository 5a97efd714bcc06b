#![deny(warnings)]

//! Scenario ingestion and result export.
//!
//! Reads scenarios from the whitespace-separated text format or from JSON,
//! writes per-turn purchase records, and generates seeded synthetic scenarios
//! for benchmarks and tests.

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use sim_core::{
    EffectType, Money, PurchaseRecord, ResourceCatalog, ResourceDefinition, ResourceId, Scenario,
    TurnSpec,
};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Malformed scenario text. Line numbers are 1-based and count non-blank lines.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("input is empty")]
    MissingHeader,
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: &'static str,
        found: usize,
    },
    #[error("line {line}: field `{field}` is not a valid integer: {value:?}")]
    InvalidInteger {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("header announces {expected} lines after it, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("line {line}: resource and turn counts overflow")]
    CountOverflow { line: usize },
}

/// Map a one-letter type code to its effect; unknown codes mean no effect.
pub fn effect_from_code(code: &str) -> EffectType {
    match code {
        "A" => EffectType::SmartMeter,
        "B" => EffectType::DistributionFacility,
        "C" => EffectType::MaintenancePlan,
        "D" => EffectType::RenewablePlant,
        "E" => EffectType::Accumulator,
        _ => EffectType::None,
    }
}

pub fn effect_code(effect: EffectType) -> &'static str {
    match effect {
        EffectType::None => "X",
        EffectType::SmartMeter => "A",
        EffectType::DistributionFacility => "B",
        EffectType::MaintenancePlan => "C",
        EffectType::RenewablePlant => "D",
        EffectType::Accumulator => "E",
    }
}

fn int<T: std::str::FromStr>(line: usize, field: &'static str, raw: &str) -> Result<T, ParseError> {
    raw.parse().map_err(|_| ParseError::InvalidInteger {
        line,
        field,
        value: raw.to_string(),
    })
}

fn parse_resource(line: usize, fields: &[&str]) -> Result<ResourceDefinition, ParseError> {
    if !(8..=9).contains(&fields.len()) {
        return Err(ParseError::FieldCount {
            line,
            expected: "8 or 9",
            found: fields.len(),
        });
    }
    Ok(ResourceDefinition {
        id: ResourceId(int(line, "id", fields[0])?),
        cost: int(line, "cost", fields[1])?,
        upkeep_cost: int(line, "upkeep", fields[2])?,
        operating_duration: int(line, "operating", fields[3])?,
        maintenance_duration: int(line, "maintenance", fields[4])?,
        lifespan_cycles: int(line, "lifespan", fields[5])?,
        power_output: int(line, "power", fields[6])?,
        effect_type: effect_from_code(fields[7]),
        effect_magnitude: match fields.get(8) {
            Some(raw) => int(line, "magnitude", raw)?,
            None => 0,
        },
    })
}

fn parse_turn(line: usize, fields: &[&str]) -> Result<TurnSpec, ParseError> {
    if fields.len() != 3 {
        return Err(ParseError::FieldCount {
            line,
            expected: "3",
            found: fields.len(),
        });
    }
    Ok(TurnSpec {
        minimum_demand: int(line, "min_demand", fields[0])?,
        maximum_demand: int(line, "max_demand", fields[1])?,
        profit_rate: int(line, "profit_rate", fields[2])?,
    })
}

/// Parse the text scenario format.
///
/// ```text
/// <budget> <resources> <turns>
/// <id> <cost> <upkeep> <operating> <maintenance> <lifespan> <power> <type> [<magnitude>]
/// <min_demand> <max_demand> <profit_rate>
/// ```
pub fn parse_scenario(text: &str) -> Result<Scenario, ParseError> {
    let mut lines = text
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>())
        .filter(|fields| !fields.is_empty())
        .enumerate()
        .map(|(i, fields)| (i + 1, fields));

    let (line, header) = lines.next().ok_or(ParseError::MissingHeader)?;
    if header.len() != 3 {
        return Err(ParseError::FieldCount {
            line,
            expected: "3",
            found: header.len(),
        });
    }
    let budget: Money = int(line, "budget", header[0])?;
    let n_resources: usize = int(line, "resource_count", header[1])?;
    let n_turns: usize = int(line, "turn_count", header[2])?;

    let expected = n_resources
        .checked_add(n_turns)
        .ok_or(ParseError::CountOverflow { line })?;
    let body: Vec<(usize, Vec<&str>)> = lines.take(expected).collect();
    if body.len() < expected {
        return Err(ParseError::Truncated {
            expected,
            found: body.len(),
        });
    }
    let (resource_lines, turn_lines) = body.split_at(n_resources);
    let resources = resource_lines
        .iter()
        .map(|(line, fields)| parse_resource(*line, fields))
        .collect::<Result<Vec<_>, _>>()?;
    let turns = turn_lines
        .iter()
        .map(|(line, fields)| parse_turn(*line, fields))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(budget, resources = resources.len(), turns = turns.len(), "parsed scenario");
    Ok(Scenario {
        budget,
        resources: ResourceCatalog::new(resources),
        turns,
    })
}

/// Load a scenario file: `.json` through serde, anything else as text.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    let scenario = if is_json {
        serde_json::from_str(&text).with_context(|| format!("decoding {}", path.display()))?
    } else {
        parse_scenario(&text).with_context(|| format!("parsing {}", path.display()))?
    };
    info!(path = %path.display(), "loaded scenario");
    Ok(scenario)
}

/// One `"<turn> <count> <id>..."` line per record.
pub fn format_records(records: &[PurchaseRecord]) -> String {
    let mut out = String::new();
    for r in records {
        let _ = write!(out, "{} {}", r.turn, r.count());
        for id in &r.purchased {
            let _ = write!(out, " {id}");
        }
        out.push('\n');
    }
    out
}

pub fn write_records(path: &Path, records: &[PurchaseRecord]) -> Result<()> {
    fs::write(path, format_records(records))
        .with_context(|| format!("writing records to {}", path.display()))?;
    info!(path = %path.display(), records = records.len(), "wrote purchase records");
    Ok(())
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Deterministic random scenario with `resources` catalog entries and `turns` turns.
pub fn synthetic_scenario(seed: u64, resources: usize, turns: usize) -> Scenario {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let catalog = (0..resources)
        .map(|i| {
            let special = rng.gen_bool(0.3);
            let effect_type = if special {
                EffectType::SPECIAL[rng.gen_range(0..EffectType::SPECIAL.len())]
            } else {
                EffectType::None
            };
            ResourceDefinition {
                id: ResourceId(i as u32),
                cost: rng.gen_range(5..500),
                upkeep_cost: rng.gen_range(0..40),
                operating_duration: rng.gen_range(1..10),
                maintenance_duration: rng.gen_range(0..5),
                lifespan_cycles: rng.gen_range(0..30),
                power_output: rng.gen_range(0..60),
                effect_type,
                effect_magnitude: if special { rng.gen_range(1..50) } else { 0 },
            }
        })
        .collect();
    let turns = (0..turns)
        .map(|_| {
            let min = rng.gen_range(0..200);
            TurnSpec {
                minimum_demand: min,
                maximum_demand: min + rng.gen_range(0..200),
                profit_rate: rng.gen_range(1..20),
            }
        })
        .collect();
    Scenario {
        budget: rng.gen_range(100..5_000),
        resources: ResourceCatalog::new(catalog),
        turns,
    }
}
