use serde::Serialize;

use super::Series;

/// One entity's values across three indicators for a single year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedRecord {
    pub code: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Inner-joins three single-indicator series at `year`.
///
/// An entity is kept only if all three series hold a present value for it;
/// output follows the row order of `x`.
pub fn join_indicators(x: &Series, y: &Series, z: &Series, year: i32) -> Vec<JoinedRecord> {
    x.rows
        .iter()
        .filter_map(|row| {
            let code = row.code.as_str();
            Some(JoinedRecord {
                code: code.to_string(),
                x: row.values.get(&year).copied().flatten()?,
                y: y.value(code, year)?,
                z: z.value(code, year)?,
            })
        })
        .collect()
}
