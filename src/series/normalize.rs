//! Flattens the World Bank `[metadata, observations]` envelope.

use serde_json::Value;

use super::Observation;
use crate::countries;

/// Which field of an observation's `country` object identifies the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKey {
    /// `country.id`, the short code ("MY").
    Code,
    /// `country.value`, the display name ("Malaysia"). Translated to the
    /// short code through the registry; unknown names pass through as-is
    /// and are dropped later by the series builder.
    Name,
}

/// Turns a decoded payload into a flat list of observations.
///
/// Never fails: a payload whose second element is not an array yields an
/// empty list, records with an unparseable `date` are skipped, and a
/// missing or non-numeric `value` stays `None`.
pub fn normalize(payload: &Value, key: EntityKey) -> Vec<Observation> {
    let Some(records) = payload.get(1).and_then(Value::as_array) else {
        return Vec::new();
    };

    records
        .iter()
        .filter_map(|record| {
            let entity = entity_of(record, key)?;
            let year = record
                .get("date")
                .and_then(Value::as_str)
                .and_then(|d| d.trim().parse::<i32>().ok())?;
            let value = record.get("value").and_then(Value::as_f64);
            Some(Observation { entity, year, value })
        })
        .collect()
}

fn entity_of(record: &Value, key: EntityKey) -> Option<String> {
    let country = record.get("country")?;
    match key {
        EntityKey::Code => country.get("id").and_then(Value::as_str).map(str::to_string),
        EntityKey::Name => {
            let name = country.get("value").and_then(Value::as_str)?;
            Some(
                countries::code_for_name(name)
                    .map(str::to_string)
                    .unwrap_or_else(|| name.to_string()),
            )
        }
    }
}
