//! Argument validation against a tool's declared JSON Schema.

use jsonschema::JSONSchema;
use serde_json::Value;

/// Validate `args` against `schema`.
///
/// Returns every violation joined into one message so the model can fix
/// all of them in a single retry.
pub fn validate(schema: &Value, args: &Value) -> Result<(), String> {
    let compiled =
        JSONSchema::compile(schema).map_err(|e| format!("invalid parameter schema: {}", e))?;

    let result = compiled.validate(args);
    if let Err(errors) = result {
        let messages: Vec<String> = errors
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", path, e)
                }
            })
            .collect();
        return Err(messages.join(", "));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transfer_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "recipientPublicKey": {"type": "string"},
                "amountCSPR": {"type": "number", "exclusiveMinimum": 0}
            },
            "required": ["recipientPublicKey", "amountCSPR"]
        })
    }

    #[test]
    fn test_valid_args() {
        let args = json!({"recipientPublicKey": "01ab", "amountCSPR": 10});
        assert!(validate(&transfer_schema(), &args).is_ok());
    }

    #[test]
    fn test_missing_required() {
        let err = validate(&transfer_schema(), &json!({"amountCSPR": 10})).unwrap_err();
        assert!(err.contains("recipientPublicKey"));
    }

    #[test]
    fn test_non_positive_amount() {
        let args = json!({"recipientPublicKey": "01ab", "amountCSPR": 0});
        let err = validate(&transfer_schema(), &args).unwrap_err();
        assert!(err.contains("amountCSPR"));
    }

    #[test]
    fn test_wrong_type() {
        let args = json!({"recipientPublicKey": 5, "amountCSPR": "ten"});
        assert!(validate(&transfer_schema(), &args).is_err());
    }
}
