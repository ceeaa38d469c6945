//! JSON Schema gate applied to every document before flattening.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use jsonschema::Validator;
use serde_json::Value;

pub struct SchemaValidator {
    validator: Validator,
}

impl SchemaValidator {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file {}", path.display()))?;
        let schema: Value = serde_json::from_str(&text)
            .with_context(|| format!("Schema file {} is not valid JSON", path.display()))?;
        Self::from_value(&schema)
    }

    pub fn from_value(schema: &Value) -> Result<Self> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|err| anyhow!("Schema is not a valid JSON Schema: {err}"))?;
        Ok(Self { validator })
    }

    /// Report-ready message for the first violation, or `None` when the
    /// document conforms.
    pub fn check(&self, instance: &Value) -> Option<String> {
        self.validator
            .iter_errors(instance)
            .next()
            .map(|err| format!("The JSON object is invalid: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn site_schema() -> Value {
        json!({
            "type": "object",
            "required": ["id", "siteModel"],
            "properties": {
                "id": {"type": "string"},
                "siteModel": {"type": "object"}
            }
        })
    }

    #[test]
    fn test_conforming_document_passes() {
        let validator = SchemaValidator::from_value(&site_schema()).unwrap();
        let doc = json!({"id": "site-1", "siteModel": {}});
        assert_eq!(validator.check(&doc), None);
    }

    #[test]
    fn test_first_violation_is_reported() {
        let validator = SchemaValidator::from_value(&site_schema()).unwrap();
        let doc = json!({"siteModel": {}});
        let message = validator.check(&doc).unwrap();
        assert!(
            message.starts_with("The JSON object is invalid: "),
            "unexpected message: {message}"
        );
        assert!(message.contains("id"), "unexpected message: {message}");
    }

    #[test]
    fn test_broken_schema_is_rejected() {
        let schema = json!({"type": 12});
        assert!(SchemaValidator::from_value(&schema).is_err());
    }

    #[test]
    fn test_from_path_reads_schema_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, site_schema().to_string()).unwrap();
        let validator = SchemaValidator::from_path(&path).unwrap();
        assert!(validator.check(&json!({"id": "x", "siteModel": {}})).is_none());

        let missing = dir.path().join("absent.json");
        assert!(SchemaValidator::from_path(&missing).is_err());
    }
}
