//! Response Normalizer — turns raw model output into a guaranteed-shape `AnalysisResult`.
//!
//! Only a total parse failure is an error. Every other deviation from
//! [`ANALYSIS_SHAPE`] is healed with a default and logged at debug level.

use serde_json::{Map, Value};
use tracing::debug;

use crate::analysis::schema::{Shape, ANALYSIS_SHAPE};
use crate::analysis::AnalysisError;
use crate::llm_client::strip_json_fences;
use crate::models::analysis::AnalysisResult;

/// Parses `raw` and coerces it onto the analysis shape.
pub fn normalize(raw: &str) -> Result<AnalysisResult, AnalysisError> {
    let parsed: Value =
        serde_json::from_str(strip_json_fences(raw)).map_err(AnalysisError::MalformedResponse)?;

    let mut coercer = Coercer::default();
    let coerced = coercer.coerce(Some(&parsed), &ANALYSIS_SHAPE, "$");
    if !coercer.healed.is_empty() {
        debug!(
            "Healed {} field(s) in model response: {}",
            coercer.healed.len(),
            coercer.healed.join(", ")
        );
    }

    serde_json::from_value(coerced).map_err(AnalysisError::MalformedResponse)
}

/// Walks a [`Shape`] and rebuilds the value so it matches exactly.
#[derive(Default)]
struct Coercer {
    healed: Vec<String>,
}

impl Coercer {
    fn coerce(&mut self, value: Option<&Value>, shape: &Shape, path: &str) -> Value {
        match shape {
            Shape::Text { placeholder } => match value {
                Some(Value::String(s)) if placeholder.is_none() || !s.is_empty() => {
                    Value::String(s.clone())
                }
                _ => {
                    self.heal(path);
                    Value::String(placeholder.unwrap_or_default().to_string())
                }
            },
            Shape::Score { min, max } => match value.and_then(Value::as_f64) {
                Some(score) if (*min..=*max).contains(&score) => value.cloned().unwrap_or_default(),
                Some(score) => {
                    self.heal(path);
                    Value::from(score.clamp(*min, *max))
                }
                None => {
                    self.heal(path);
                    Value::from(*min)
                }
            },
            Shape::List(item) => match value {
                Some(Value::Array(items)) => Value::Array(
                    items
                        .iter()
                        .enumerate()
                        .filter_map(|(i, v)| {
                            let item_path = format!("{path}[{i}]");
                            if matches_kind(v, item) {
                                Some(self.coerce(Some(v), item, &item_path))
                            } else {
                                self.heal(&item_path);
                                None
                            }
                        })
                        .collect(),
                ),
                _ => {
                    self.heal(path);
                    Value::Array(Vec::new())
                }
            },
            Shape::Object(fields) => {
                let source = match value {
                    Some(Value::Object(map)) => Some(map),
                    _ => {
                        self.heal(path);
                        None
                    }
                };
                let mut out = Map::new();
                for field in fields.iter() {
                    let field_path = format!("{path}.{}", field.name);
                    let field_value = source.and_then(|m| m.get(field.name));
                    out.insert(
                        field.name.to_string(),
                        self.coerce(field_value, &field.shape, &field_path),
                    );
                }
                Value::Object(out)
            }
        }
    }

    fn heal(&mut self, path: &str) {
        self.healed.push(path.to_string());
    }
}

/// Whether a list element is of the kind the list declares; others are dropped.
fn matches_kind(value: &Value, shape: &Shape) -> bool {
    match shape {
        Shape::Text { .. } => value.is_string(),
        Shape::Score { .. } => value.is_number(),
        Shape::List(_) => value.is_array(),
        Shape::Object(_) => value.is_object(),
    }
}
