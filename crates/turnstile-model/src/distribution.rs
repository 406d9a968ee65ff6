//! Distribution record compilation.
//!
//! Turns the wire `{type, parameters, unit}` record into a validated
//! [`Distribution`]. Type names and parameter keys accept the common
//! aliases editors emit; all durations are normalized to minutes.

use std::collections::BTreeMap;

use serde_json::Value;
use turnstile_rng::Distribution;

use crate::steps::normalize_token;
use crate::{DistributionSpec, ModelError};

/// Looks a parameter up under any of its aliases.
fn param(parameters: &BTreeMap<String, Value>, aliases: &[&str]) -> Option<f64> {
    for (key, value) in parameters {
        let normalized = normalize_token(key);
        if aliases.contains(&normalized.as_str()) {
            if let Some(number) = value.as_f64() {
                return Some(number);
            }
        }
    }
    None
}

fn param_list(parameters: &BTreeMap<String, Value>, aliases: &[&str]) -> Option<Vec<f64>> {
    for (key, value) in parameters {
        let normalized = normalize_token(key);
        if aliases.contains(&normalized.as_str()) {
            if let Some(array) = value.as_array() {
                let numbers: Option<Vec<f64>> = array.iter().map(Value::as_f64).collect();
                return numbers;
            }
        }
    }
    None
}

/// Scale factor that converts the record's unit into minutes.
fn unit_scale(unit: Option<&str>) -> f64 {
    match unit.map(normalize_token).as_deref() {
        Some("seconds" | "second" | "secs" | "sec" | "s") => 1.0 / 60.0,
        Some("hours" | "hour" | "hrs" | "hr" | "h") => 60.0,
        // Minutes are the native unit; unrecognized units fall through
        // to minutes rather than failing a model the editor accepted.
        _ => 1.0,
    }
}

/// Compiles and validates one distribution record.
pub fn compile_distribution(spec: &DistributionSpec) -> Result<Distribution, ModelError> {
    let scale = unit_scale(spec.unit.as_deref());
    let kind = normalize_token(&spec.dist_type);
    let parameters = &spec.parameters;

    let missing = |parameter: &'static str| ModelError::MissingParameter {
        distribution: spec.dist_type.clone(),
        parameter,
    };

    let distribution = match kind.as_str() {
        "constant" | "fixed" | "deterministic" => Distribution::Constant {
            value: param(parameters, &["value", "constant", "val"]).ok_or_else(|| missing("value"))?
                * scale,
        },
        "exponential" | "exp" => Distribution::Exponential {
            mean: param(parameters, &["mean", "average", "mu", "expected"])
                .ok_or_else(|| missing("mean"))?
                * scale,
        },
        "uniform" | "unif" => Distribution::Uniform {
            min: param(parameters, &["min", "minimum", "low", "lower"])
                .ok_or_else(|| missing("min"))?
                * scale,
            max: param(parameters, &["max", "maximum", "high", "upper"])
                .ok_or_else(|| missing("max"))?
                * scale,
        },
        "triangular" | "triang" | "triangle" => Distribution::Triangular {
            min: param(parameters, &["min", "minimum", "low", "lower"])
                .ok_or_else(|| missing("min"))?
                * scale,
            mode: param(parameters, &["mode", "peak", "mostlikely"])
                .ok_or_else(|| missing("mode"))?
                * scale,
            max: param(parameters, &["max", "maximum", "high", "upper"])
                .ok_or_else(|| missing("max"))?
                * scale,
        },
        "normal" | "gaussian" | "norm" => Distribution::Normal {
            mean: param(parameters, &["mean", "average", "mu", "expected"])
                .ok_or_else(|| missing("mean"))?
                * scale,
            std_dev: param(parameters, &["stddev", "std", "sigma", "sd", "deviation"])
                .ok_or_else(|| missing("std_dev"))?
                * scale,
        },
        "empirical" | "discrete" | "custom" => {
            let values = param_list(parameters, &["values"])
                .ok_or_else(|| missing("values"))?
                .into_iter()
                .map(|v| v * scale)
                .collect();
            let probabilities = param_list(parameters, &["probabilities", "probs", "weights"])
                .ok_or_else(|| missing("probabilities"))?;
            Distribution::Empirical {
                values,
                probabilities,
            }
        }
        _ => {
            return Err(ModelError::UnknownDistribution {
                name: spec.dist_type.clone(),
            });
        }
    };

    distribution.validate()?;
    Ok(distribution)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn spec(dist_type: &str, params: &[(&str, f64)], unit: Option<&str>) -> DistributionSpec {
        DistributionSpec {
            dist_type: dist_type.to_string(),
            parameters: params
                .iter()
                .map(|(k, v)| ((*k).to_string(), serde_json::json!(v)))
                .collect(),
            unit: unit.map(str::to_string),
        }
    }

    #[test_case("exponential"; "canonical")]
    #[test_case("exp"; "abbreviated")]
    #[test_case("Exponential"; "capitalized")]
    fn exponential_synonyms(name: &str) {
        let d = compile_distribution(&spec(name, &[("mean", 2.0)], None)).unwrap();
        assert_eq!(d, Distribution::Exponential { mean: 2.0 });
    }

    #[test_case("constant"; "canonical")]
    #[test_case("fixed"; "fixed")]
    #[test_case("deterministic"; "deterministic")]
    fn constant_synonyms(name: &str) {
        let d = compile_distribution(&spec(name, &[("value", 1.5)], None)).unwrap();
        assert_eq!(d, Distribution::Constant { value: 1.5 });
    }

    #[test]
    fn parameter_aliases_resolve() {
        let d = compile_distribution(&spec("normal", &[("mu", 5.0), ("sigma", 1.0)], None)).unwrap();
        assert_eq!(d, Distribution::Normal { mean: 5.0, std_dev: 1.0 });

        let d = compile_distribution(&spec("uniform", &[("low", 1.0), ("high", 2.0)], None)).unwrap();
        assert_eq!(d, Distribution::Uniform { min: 1.0, max: 2.0 });

        let d = compile_distribution(&spec(
            "triangle",
            &[("minimum", 1.0), ("peak", 2.0), ("maximum", 4.0)],
            None,
        ))
        .unwrap();
        assert_eq!(d, Distribution::Triangular { min: 1.0, mode: 2.0, max: 4.0 });
    }

    #[test]
    fn units_normalize_to_minutes() {
        let d = compile_distribution(&spec("constant", &[("value", 90.0)], Some("seconds"))).unwrap();
        assert_eq!(d, Distribution::Constant { value: 1.5 });

        let d = compile_distribution(&spec("constant", &[("value", 2.0)], Some("hours"))).unwrap();
        assert_eq!(d, Distribution::Constant { value: 120.0 });
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = compile_distribution(&spec("zipf", &[("s", 1.1)], None)).unwrap_err();
        assert!(matches!(err, ModelError::UnknownDistribution { .. }));
    }

    #[test]
    fn missing_parameter_is_reported_by_name() {
        let err = compile_distribution(&spec("exponential", &[], None)).unwrap_err();
        match err {
            ModelError::MissingParameter { parameter, .. } => assert_eq!(parameter, "mean"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn invalid_parameters_fail_validation() {
        let err = compile_distribution(&spec("uniform", &[("min", 5.0), ("max", 1.0)], None))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidDistribution(_)));
    }

    #[test]
    fn empirical_lists_compile() {
        let mut s = spec("discrete", &[], None);
        s.parameters
            .insert("values".to_string(), serde_json::json!([1.0, 2.0, 3.0]));
        s.parameters
            .insert("probs".to_string(), serde_json::json!([0.2, 0.3, 0.5]));
        let d = compile_distribution(&s).unwrap();
        assert!(matches!(d, Distribution::Empirical { .. }));
    }
}
