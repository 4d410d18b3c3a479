// ============================================================
// Layer 4 — Dataset CSV I/O
// ============================================================
// Reads and writes the tabular dataset file that connects the
// generator to the trainer.
//
// Two layouts, distinguished by their header row:
//
//   three-tier (full roster):
//     student_id,name,gpa,attendance_rate,assignments_completed,
//     household_income_bracket,parent_education_level,risk_level
//
//   binary (features only):
//     gpa,attendance_rate,assignments_completed,
//     household_income_bracket,parent_education_level,at_risk
//
// Column order and names are load-bearing — the reader rejects
// any file whose header is not an exact match. Values never
// contain commas (names come from fixed pools), so a plain
// split(',') is sufficient.
//
// Reference: Rust Book §9 (Error Handling), §12 (File I/O)

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::domain::errors::RiskError;
use crate::domain::features::StudentFeatures;
use crate::domain::record::{LabelSchema, LabeledRecord, RiskLevel, StudentRow};

/// Header of the three-tier roster layout.
pub const THREE_TIER_HEADER: &str = "student_id,name,gpa,attendance_rate,\
assignments_completed,household_income_bracket,parent_education_level,risk_level";

/// Header of the binary layout.
pub const BINARY_HEADER: &str = "gpa,attendance_rate,assignments_completed,\
household_income_bracket,parent_education_level,at_risk";

/// Write a generated roster to `path` in the layout matching
/// `schema`. The binary layout drops student_id and name.
pub fn write_csv(path: &Path, rows: &[StudentRow], schema: LabelSchema) -> Result<()> {
    let mut out = String::new();

    match schema {
        LabelSchema::ThreeTier => {
            out.push_str(THREE_TIER_HEADER);
            out.push('\n');
            for row in rows {
                let f = &row.record.features;
                let level = LabelSchema::ThreeTier.class_name(row.record.label);
                let _ = writeln!(
                    out,
                    "{},{},{},{},{},{},{},{}",
                    row.student_id,
                    row.name,
                    f.gpa,
                    f.attendance_rate,
                    f.assignments_completed,
                    f.household_income_bracket,
                    f.parent_education_level,
                    level,
                );
            }
        }
        LabelSchema::Binary => {
            out.push_str(BINARY_HEADER);
            out.push('\n');
            for row in rows {
                let f = &row.record.features;
                let _ = writeln!(
                    out,
                    "{},{},{},{},{},{}",
                    f.gpa,
                    f.attendance_rate,
                    f.assignments_completed,
                    f.household_income_bracket,
                    f.parent_education_level,
                    row.record.label,
                );
            }
        }
    }

    fs::write(path, out)
        .with_context(|| format!("Cannot write dataset to '{}'", path.display()))?;
    tracing::info!("Wrote {} rows to '{}'", rows.len(), path.display());
    Ok(())
}

/// Read a dataset file, detecting the layout from its header.
/// Returns the detected schema and the labeled records (id and
/// name are dropped — they are not features).
pub fn read_csv(path: &Path) -> Result<(LabelSchema, Vec<LabeledRecord>)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read dataset '{}'", path.display()))?;

    let mut lines = text.lines();
    let header = lines.next().unwrap_or("").trim_end();

    let schema = if header == THREE_TIER_HEADER {
        LabelSchema::ThreeTier
    } else if header == BINARY_HEADER {
        LabelSchema::Binary
    } else {
        return Err(RiskError::DatasetFormat(format!(
            "unrecognized header '{header}'"
        ))
        .into());
    };

    let mut records = Vec::new();
    for (i, line) in lines.enumerate() {
        let line_no = i + 2; // 1-based, after the header
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        records.push(parse_row(line, schema, line_no)?);
    }

    tracing::info!(
        "Loaded {} records ({:?} schema) from '{}'",
        records.len(),
        schema,
        path.display()
    );
    Ok((schema, records))
}

fn parse_row(line: &str, schema: LabelSchema, line_no: usize) -> Result<LabeledRecord> {
    let fields: Vec<&str> = line.split(',').collect();

    let expected = match schema {
        LabelSchema::ThreeTier => 8,
        LabelSchema::Binary    => 6,
    };
    if fields.len() != expected {
        return Err(RiskError::DatasetFormat(format!(
            "line {line_no}: expected {expected} columns, found {}",
            fields.len()
        ))
        .into());
    }

    // The three-tier layout prefixes two non-feature columns
    let offset = match schema {
        LabelSchema::ThreeTier => 2,
        LabelSchema::Binary    => 0,
    };

    let features = StudentFeatures::new(
        parse_field(fields[offset], "gpa", line_no)?,
        parse_field(fields[offset + 1], "attendance_rate", line_no)?,
        parse_field(fields[offset + 2], "assignments_completed", line_no)?,
        parse_field(fields[offset + 3], "household_income_bracket", line_no)?,
        parse_field(fields[offset + 4], "parent_education_level", line_no)?,
    )
    .with_context(|| format!("line {line_no}: out-of-domain feature"))?;

    let label = match schema {
        LabelSchema::ThreeTier => {
            let level: RiskLevel = fields[offset + 5]
                .parse()
                .with_context(|| format!("line {line_no}: bad risk_level"))?;
            usize::from(level)
        }
        LabelSchema::Binary => {
            let at_risk: u8 = parse_field(fields[offset + 5], "at_risk", line_no)?;
            if at_risk > 1 {
                return Err(RiskError::DatasetFormat(format!(
                    "line {line_no}: at_risk must be 0 or 1, got {at_risk}"
                ))
                .into());
            }
            at_risk as usize
        }
    };

    Ok(LabeledRecord { features, label })
}

fn parse_field<T: FromStr>(raw: &str, name: &str, line_no: usize) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        RiskError::DatasetFormat(format!(
            "line {line_no}: cannot parse {name} from '{raw}'"
        ))
        .into()
    })
}
