//! Shape-polymorphic input normalization.
//!
//! Callers may describe a digit image as a flat 64-value vector or as an 8x8
//! grid, and may submit a single image or a batch of either. Everything
//! downstream sees one canonical shape: a non-empty batch of 64-value samples.

use serde_json::Value;

use crate::error::ValidationError;

pub const FEATURE_COUNT: usize = 64;
pub const GRID_SIDE: usize = 8;

/// One canonicalized input image, flattened row-major.
///
/// The constructor does not enforce length; the normalizer guarantees it and
/// the inference engine re-checks it, so the contract stays observable at the
/// engine boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    values: Vec<f64>,
}

impl Sample {
    pub fn new(values: Vec<f64>) -> Self {
        Sample { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Canonicalize a raw `samples` payload into an ordered batch.
///
/// Accepted shapes, checked in this precedence order:
/// 1. a flat array of exactly 64 numbers (one sample);
/// 2. an 8x8 nested array of numbers (one sample, flattened row-major);
/// 3. an array of elements, each independently shape 1 or 2.
pub fn normalize(raw: Option<&Value>) -> Result<Vec<Sample>, ValidationError> {
    let value = match raw {
        None | Some(Value::Null) => return Err(ValidationError::Empty),
        Some(value) => value,
    };

    let entries = value.as_array().ok_or(ValidationError::NotAnArray)?;
    if entries.is_empty() {
        return Err(ValidationError::Empty);
    }

    if entries.iter().all(Value::is_number) {
        return Ok(vec![flat_sample(0, entries)?]);
    }

    if is_grid(entries) {
        return Ok(vec![grid_sample(0, entries)?]);
    }

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| sample_from_entry(index, entry))
        .collect()
}

fn sample_from_entry(index: usize, entry: &Value) -> Result<Sample, ValidationError> {
    let items = match entry.as_array() {
        Some(items) => items,
        None => return Err(ValidationError::Malformed { index }),
    };

    if items.iter().all(Value::is_number) {
        return flat_sample(index, items);
    }

    if items.iter().all(Value::is_array) {
        return grid_sample(index, items);
    }

    // Mixed scalars and rows: report the first entry that is not a number.
    let position = items
        .iter()
        .position(|item| !item.is_number())
        .unwrap_or(0);
    Err(ValidationError::NonNumeric { index, position })
}

fn flat_sample(index: usize, items: &[Value]) -> Result<Sample, ValidationError> {
    if items.len() != FEATURE_COUNT {
        return Err(ValidationError::WrongLength {
            index,
            got: items.len(),
        });
    }

    let mut values = Vec::with_capacity(FEATURE_COUNT);
    for (position, item) in items.iter().enumerate() {
        values.push(numeric(index, position, item)?);
    }
    Ok(Sample::new(values))
}

fn grid_sample(index: usize, rows: &[Value]) -> Result<Sample, ValidationError> {
    if rows.len() != GRID_SIDE {
        return Err(ValidationError::WrongRowCount {
            index,
            rows: rows.len(),
        });
    }

    let mut values = Vec::with_capacity(FEATURE_COUNT);
    for (row, entry) in rows.iter().enumerate() {
        let cells = match entry.as_array() {
            Some(cells) => cells,
            None => return Err(ValidationError::Malformed { index }),
        };
        if cells.len() != GRID_SIDE {
            return Err(ValidationError::WrongRowWidth {
                index,
                row,
                got: cells.len(),
            });
        }
        for (column, cell) in cells.iter().enumerate() {
            values.push(numeric(index, row * GRID_SIDE + column, cell)?);
        }
    }
    Ok(Sample::new(values))
}

/// A single 8x8 grid: exactly 8 rows, each exactly 8 numbers. Anything else
/// falls through to per-element batch handling.
fn is_grid(rows: &[Value]) -> bool {
    rows.len() == GRID_SIDE
        && rows.iter().all(|row| {
            row.as_array()
                .is_some_and(|cells| cells.len() == GRID_SIDE && cells.iter().all(Value::is_number))
        })
}

fn numeric(index: usize, position: usize, value: &Value) -> Result<f64, ValidationError> {
    value
        .as_f64()
        .filter(|parsed| parsed.is_finite())
        .ok_or(ValidationError::NonNumeric { index, position })
}
