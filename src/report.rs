//! Presentation of a persona run: display names, text tables and JSON reports

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::data::Overview;
use crate::pipeline::PersonaRun;

/// Operator-assigned segment names; purely cosmetic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayNames {
    names: BTreeMap<usize, String>,
}

impl DisplayNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, segment: usize, name: impl Into<String>) {
        self.names.insert(segment, name.into());
    }

    /// Assigned name, or `Persona {segment}`
    pub fn name(&self, segment: usize) -> String {
        self.names
            .get(&segment)
            .cloned()
            .unwrap_or_else(|| format!("Persona {segment}"))
    }
}

/// One segment in a serialized report
#[derive(Debug, Clone, Serialize)]
pub struct SegmentReport {
    pub segment: usize,
    pub name: String,
    pub size: usize,
    pub means: BTreeMap<String, f64>,
    pub strategy: String,
    pub profile: Option<String>,
    pub guidance: Option<String>,
}

/// Serializable summary of a run
#[derive(Debug, Clone, Serialize)]
pub struct PersonaReport {
    pub records: usize,
    pub features: Vec<String>,
    pub inertia: f64,
    pub segments: Vec<SegmentReport>,
}

impl PersonaReport {
    pub fn new(run: &PersonaRun, names: &DisplayNames) -> Self {
        let segments = run
            .profile
            .rows()
            .map(|(segment, row)| {
                let recommendation = run.strategies.get(&segment).copied();
                let strategy = recommendation.and_then(|r| r.strategy());
                SegmentReport {
                    segment,
                    name: names.name(segment),
                    size: row.size,
                    means: row.means.iter().cloned().collect(),
                    strategy: recommendation.map_or_else(String::new, |r| r.to_string()),
                    profile: strategy.map(|s| s.profile().to_string()),
                    guidance: strategy.map(|s| s.guidance().to_string()),
                }
            })
            .collect();

        Self {
            records: run.dataset.height(),
            features: run.features.names().to_vec(),
            inertia: run.inertia,
            segments,
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Text table of the per-segment feature means
pub fn render_profile(run: &PersonaRun, names: &DisplayNames) -> Result<String, fmt::Error> {
    let features = run.profile.features();
    let name_width = run
        .profile
        .segments()
        .map(|s| names.name(s).len())
        .max()
        .unwrap_or(0)
        .max("Persona".len());
    let widths: Vec<usize> = features.iter().map(|f| f.len().max(8)).collect();

    let mut out = String::new();
    write!(out, "{:<name_width$}  {:>5}", "Persona", "Size")?;
    for (feature, width) in features.iter().zip(widths.iter().copied()) {
        write!(out, "  {feature:>width$}")?;
    }
    out.push('\n');

    for (segment, row) in run.profile.rows() {
        write!(out, "{:<name_width$}  {:>5}", names.name(segment), row.size)?;
        for ((_, mean), width) in row.means.iter().zip(widths.iter().copied()) {
            write!(out, "  {mean:>width$.2}")?;
        }
        out.push('\n');
    }
    Ok(out)
}

/// Suggested strategy block for every segment
pub fn render_strategies(run: &PersonaRun, names: &DisplayNames) -> Result<String, fmt::Error> {
    let mut out = String::new();
    for (&segment, recommendation) in &run.strategies {
        writeln!(out, "Suggested Strategy for {}", names.name(segment))?;
        match recommendation.strategy() {
            Some(strategy) => {
                writeln!(out, "  - Profile: {strategy}. {}", strategy.profile())?;
                writeln!(out, "  - Strategy: {}", strategy.guidance())?;
            }
            None => {
                writeln!(out, "  - {recommendation}")?;
            }
        }
    }
    Ok(out)
}

/// Text rendering of the dataset overview
pub fn render_overview(overview: &Overview) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Total customers:  {}", overview.records)?;
    writeln!(out, "Total attributes: {}", overview.attributes)?;
    writeln!(
        out,
        "{:<24} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    )?;
    for c in &overview.columns {
        writeln!(
            out,
            "{:<24} {:>6} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            c.name, c.count, c.mean, c.std, c.min, c.q25, c.median, c.q75, c.max
        )?;
    }
    Ok(out)
}
