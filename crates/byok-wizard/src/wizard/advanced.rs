//! Optional sampling parameters and HTTP headers attached to every model.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

/// A numeric sampling knob; blank input leaves it unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingField {
    Temperature,
    TopP,
    TopK,
    FrequencyPenalty,
    PresencePenalty,
}

impl SamplingField {
    pub const ALL: [SamplingField; 5] = [
        SamplingField::Temperature,
        SamplingField::TopP,
        SamplingField::TopK,
        SamplingField::FrequencyPenalty,
        SamplingField::PresencePenalty,
    ];

    /// Key inside `extraArgs`.
    pub fn key(self) -> &'static str {
        match self {
            SamplingField::Temperature => "temperature",
            SamplingField::TopP => "top_p",
            SamplingField::TopK => "top_k",
            SamplingField::FrequencyPenalty => "frequency_penalty",
            SamplingField::PresencePenalty => "presence_penalty",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            SamplingField::Temperature => "Temperature (0.0 - 2.0):",
            SamplingField::TopP => "Top P (0.0 - 1.0):",
            SamplingField::TopK => "Top K (integer, e.g., 40):",
            SamplingField::FrequencyPenalty => "Frequency penalty (-2.0 - 2.0):",
            SamplingField::PresencePenalty => "Presence penalty (-2.0 - 2.0):",
        }
    }

    /// `Ok(None)` for blank input; `Err` carries the message to show.
    pub fn parse(self, input: &str) -> Result<Option<Value>, String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        match self {
            SamplingField::TopK => match input.parse::<u64>() {
                Ok(n) if n > 0 => Ok(Some(Value::from(n))),
                _ => Err("Must be a positive integer".to_string()),
            },
            _ => {
                let (min, max) = self.bounds();
                let value = input
                    .parse::<f64>()
                    .ok()
                    .filter(|v| (min..=max).contains(v))
                    .and_then(Number::from_f64)
                    .ok_or_else(|| format!("Must be a number between {min} and {max}"))?;
                Ok(Some(Value::Number(value)))
            }
        }
    }

    fn bounds(self) -> (f64, f64) {
        match self {
            SamplingField::Temperature => (0.0, 2.0),
            SamplingField::TopP => (0.0, 1.0),
            SamplingField::FrequencyPenalty | SamplingField::PresencePenalty => (-2.0, 2.0),
            SamplingField::TopK => (1.0, f64::MAX),
        }
    }
}

/// Comma-separated stop sequences, trimmed, blanks dropped.
pub fn parse_stop_sequences(input: &str) -> Option<Value> {
    let stops: Vec<Value> = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Value::from)
        .collect();
    (!stops.is_empty()).then_some(Value::Array(stops))
}

/// A JSON object of extra request arguments; blank input is `None`.
pub fn parse_custom_args(input: &str) -> Result<Option<Map<String, Value>>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(input) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err("Must be a JSON object".to_string()),
        Err(_) => Err("Invalid JSON format".to_string()),
    }
}

/// A JSON object of header names to string values; blank input is `None`.
pub fn parse_headers(input: &str) -> Result<Option<BTreeMap<String, String>>, String> {
    let Some(map) = parse_custom_args(input)? else {
        return Ok(None);
    };
    map.into_iter()
        .map(|(k, v)| match v {
            Value::String(s) => Ok((k, s)),
            _ => Err(format!("Header '{k}' must have a string value")),
        })
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map(Some)
}

/// Collected advanced settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvancedSettings {
    pub extra_args: Map<String, Value>,
    pub extra_headers: BTreeMap<String, String>,
}

impl AdvancedSettings {
    pub fn set(&mut self, key: &str, value: Value) {
        self.extra_args.insert(key.to_string(), value);
    }

    /// Custom arguments go in last and win over the named fields.
    pub fn merge_custom(&mut self, custom: Map<String, Value>) {
        self.extra_args.extend(custom);
    }

    pub fn extra_args(&self) -> Option<Map<String, Value>> {
        (!self.extra_args.is_empty()).then(|| self.extra_args.clone())
    }

    pub fn extra_headers(&self) -> Option<BTreeMap<String, String>> {
        (!self.extra_headers.is_empty()).then(|| self.extra_headers.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_input_skips_every_field() {
        for f in SamplingField::ALL {
            assert_eq!(f.parse("  "), Ok(None), "{}", f.key());
        }
    }

    #[test]
    fn ranges_are_inclusive() {
        assert_eq!(SamplingField::Temperature.parse("2"), Ok(Some(json!(2.0))));
        assert_eq!(SamplingField::Temperature.parse("0"), Ok(Some(json!(0.0))));
        assert_eq!(SamplingField::TopP.parse("0.95"), Ok(Some(json!(0.95))));
        assert_eq!(SamplingField::FrequencyPenalty.parse("-2"), Ok(Some(json!(-2.0))));
    }

    #[test]
    fn out_of_range_and_garbage_are_rejected() {
        assert_eq!(
            SamplingField::Temperature.parse("2.1"),
            Err("Must be a number between 0 and 2".to_string())
        );
        assert_eq!(
            SamplingField::PresencePenalty.parse("-3"),
            Err("Must be a number between -2 and 2".to_string())
        );
        assert!(SamplingField::TopP.parse("abc").is_err());
        assert!(SamplingField::TopP.parse("NaN").is_err());
    }

    #[test]
    fn top_k_wants_a_positive_integer() {
        assert_eq!(SamplingField::TopK.parse("40"), Ok(Some(json!(40))));
        assert!(SamplingField::TopK.parse("0").is_err());
        assert!(SamplingField::TopK.parse("-1").is_err());
        assert!(SamplingField::TopK.parse("4.5").is_err());
    }

    #[test]
    fn stop_sequences() {
        assert_eq!(parse_stop_sequences(" END , ###,, "), Some(json!(["END", "###"])));
        assert_eq!(parse_stop_sequences(""), None);
    }

    #[test]
    fn custom_args_must_be_an_object() {
        assert_eq!(parse_custom_args(""), Ok(None));
        assert_eq!(parse_custom_args("[1]"), Err("Must be a JSON object".to_string()));
        assert_eq!(parse_custom_args("{seed"), Err("Invalid JSON format".to_string()));
        let map = parse_custom_args(r#"{"seed": 42}"#).unwrap().unwrap();
        assert_eq!(map["seed"], json!(42));
    }

    #[test]
    fn headers_require_string_values() {
        let h = parse_headers(r#"{"X-Team": "ml"}"#).unwrap().unwrap();
        assert_eq!(h["X-Team"], "ml");
        assert!(parse_headers(r#"{"X-Retries": 3}"#).is_err());
        assert_eq!(parse_headers(" "), Ok(None));
    }

    #[test]
    fn custom_args_override_named_fields() {
        let mut adv = AdvancedSettings::default();
        adv.set("temperature", json!(0.2));
        adv.merge_custom(parse_custom_args(r#"{"temperature": 0.9, "seed": 1}"#).unwrap().unwrap());
        let args = adv.extra_args().unwrap();
        assert_eq!(args["temperature"], json!(0.9));
        assert_eq!(args["seed"], json!(1));
        assert_eq!(adv.extra_headers(), None);
    }
}
