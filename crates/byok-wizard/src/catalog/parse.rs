use serde_json::Value;

use super::{FetchError, ModelInfo};

const UNKNOWN_OWNER: &str = "unknown";

/// Read a models listing in any of the accepted shapes:
/// `{"data": [...]}`, `{"models": [...]}` or a bare array.
pub fn parse_models(body: &Value) -> Result<Vec<ModelInfo>, FetchError> {
    let items = match body {
        Value::Object(map) => match (map.get("data"), map.get("models")) {
            (Some(Value::Array(items)), _) => items,
            (_, Some(Value::Array(items))) => items,
            _ => return Err(FetchError::UnexpectedShape),
        },
        Value::Array(items) => items,
        _ => return Err(FetchError::UnexpectedShape),
    };
    Ok(items.iter().filter_map(model_from_value).collect())
}

fn model_from_value(item: &Value) -> Option<ModelInfo> {
    match item {
        Value::String(s) if !s.is_empty() => Some(ModelInfo {
            id: s.clone(),
            name: s.clone(),
            owned_by: UNKNOWN_OWNER.to_string(),
        }),
        Value::Object(map) => {
            let text = |key: &str| {
                map.get(key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };
            let id = text("id");
            let name = text("name");
            let id = id.or_else(|| name.clone())?;
            Some(ModelInfo {
                name: name.unwrap_or_else(|| id.clone()),
                id,
                owned_by: text("owned_by").unwrap_or_else(|| UNKNOWN_OWNER.to_string()),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn openai_data_envelope() {
        let models = parse_models(&json!({
            "object": "list",
            "data": [
                {"id": "gpt-4o", "object": "model", "owned_by": "openai"},
                {"id": "gpt-4o-mini", "name": "GPT-4o mini"}
            ]
        }))
        .unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "gpt-4o");
        assert_eq!(models[0].owned_by, "openai");
        assert_eq!(models[1].name, "GPT-4o mini");
        assert_eq!(models[1].owned_by, "unknown");
    }

    #[test]
    fn models_envelope_with_strings_and_name_only_objects() {
        let models = parse_models(&json!({
            "models": ["llama3.2:latest", {"name": "qwen2.5:7b"}]
        }))
        .unwrap();
        assert_eq!(models[0].id, "llama3.2:latest");
        assert_eq!(models[1].id, "qwen2.5:7b");
        assert_eq!(models[1].name, "qwen2.5:7b");
    }

    #[test]
    fn bare_array() {
        let models = parse_models(&json!(["a", {"id": "b", "owned_by": "acme"}])).unwrap();
        assert_eq!(
            models.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(models[1].owned_by, "acme");
    }

    #[test]
    fn entries_without_identity_are_dropped() {
        let models = parse_models(&json!({"data": [{}, {"id": ""}, 42, null, "", {"id": "ok"}]})).unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].id, "ok");
    }

    #[test]
    fn data_takes_precedence_but_must_be_an_array() {
        let models = parse_models(&json!({"data": "nope", "models": ["x"]})).unwrap();
        assert_eq!(models[0].id, "x");
    }

    #[test]
    fn unknown_shapes_are_errors() {
        assert!(matches!(
            parse_models(&json!({"items": []})),
            Err(FetchError::UnexpectedShape)
        ));
        assert!(matches!(parse_models(&json!("x")), Err(FetchError::UnexpectedShape)));
    }
}
