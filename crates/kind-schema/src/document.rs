//! # Schema Documents
//!
//! A record type declared as data. Documents carry the field schema, the
//! extra-field policy, and optionally a base type's static defaults.
//! Behaviors are code and are attached after loading with
//! [`SchemaDocument::build_with`].
//!
//! ```yaml
//! name: Profile
//! extra_fields: drop          # reject | drop | pass_through
//! base:
//!   name: Audited
//!   fields:
//!     revision: 1
//! fields:
//!   name: string
//!   age: optional<number>
//!   emails: email[]
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use kind_core::{BaseType, BehaviorTable, ExtraFields, Factory, Schema, Value};

use crate::error::SchemaError;
use crate::registry::TypeRegistry;

/// Path label used for documents parsed from in-memory text.
const INLINE: &str = "<inline>";

/// Static state embedded in every instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaseDocument {
    /// Name reported by [`Instance::extends`](kind_core::Instance::extends).
    pub name: String,
    /// Default field values, copied into each instance's base state.
    #[serde(default)]
    pub fields: IndexMap<String, serde_json::Value>,
}

/// A declarative record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Factory name.
    pub name: String,
    /// Free-form description, shown by `kind describe`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Policy for input keys not listed in `fields`.
    #[serde(default)]
    pub extra_fields: ExtraFields,
    /// Optional base type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<BaseDocument>,
    /// Field name → type expression, in declaration order.
    pub fields: IndexMap<String, String>,
}

impl SchemaDocument {
    /// Load a document from disk. `.json` files are parsed as JSON,
    /// everything else as YAML.
    ///
    /// # Errors
    ///
    /// [`SchemaError::DocumentLoad`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::DocumentLoad {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let document = if ext.eq_ignore_ascii_case("json") {
            parse_json(&content, &path.display().to_string())?
        } else {
            parse_yaml(&content, &path.display().to_string())?
        };

        tracing::debug!(
            path = %path.display(),
            name = %document.name,
            fields = document.fields.len(),
            "loaded schema document"
        );
        Ok(document)
    }

    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// [`SchemaError::DocumentLoad`] on invalid YAML or an invalid shape.
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        parse_yaml(text, INLINE)
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// [`SchemaError::DocumentLoad`] on invalid JSON or an invalid shape.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        parse_json(text, INLINE)
    }

    /// Resolve every field's type expression.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidField`] for the first field whose expression
    /// does not parse or names an unknown type.
    pub fn schema(&self, registry: &TypeRegistry) -> Result<Schema, SchemaError> {
        let mut schema = Schema::new();
        for (field, text) in &self.fields {
            let descriptor = registry
                .parse(text)
                .map_err(|source| SchemaError::InvalidField {
                    field: field.clone(),
                    source,
                })?;
            schema.insert(field.clone(), descriptor);
        }
        Ok(schema)
    }

    /// The base type described by the `base` section, without behaviors.
    pub fn base_type(&self) -> Option<BaseType> {
        self.base.as_ref().map(|base| {
            base.fields
                .iter()
                .fold(BaseType::new(base.name.clone()), |acc, (name, value)| {
                    acc.with_field(name.clone(), Value::from(value.clone()))
                })
        })
    }

    /// Build a factory with no behaviors.
    ///
    /// # Errors
    ///
    /// As [`SchemaDocument::build_with`].
    pub fn build(&self, registry: &TypeRegistry) -> Result<Factory, SchemaError> {
        self.build_with(registry, BehaviorTable::new())
    }

    /// Build a factory, attaching application-supplied behaviors.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidField`] for an unresolvable field, or
    /// [`SchemaError::Definition`] when a behavior shares a field's name.
    pub fn build_with(
        &self,
        registry: &TypeRegistry,
        behaviors: BehaviorTable,
    ) -> Result<Factory, SchemaError> {
        let schema = self.schema(registry)?;
        let factory = Factory::new(self.name.clone(), schema, behaviors)?
            .with_extra_fields(self.extra_fields);
        Ok(match self.base_type() {
            Some(base) => factory.with_base(base),
            None => factory,
        })
    }
}

fn parse_yaml(text: &str, path: &str) -> Result<SchemaDocument, SchemaError> {
    serde_yaml::from_str(text).map_err(|e| SchemaError::DocumentLoad {
        path: path.to_string(),
        reason: format!("invalid YAML: {e}"),
    })
}

fn parse_json(text: &str, path: &str) -> Result<SchemaDocument, SchemaError> {
    serde_json::from_str(text).map_err(|e| SchemaError::DocumentLoad {
        path: path.to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kind_core::{array_of, number, optional, string, ConstructionError};
    use serde_json::json;

    const PROFILE: &str = r#"
name: Profile
description: A user profile
extra_fields: drop
fields:
  name: string
  age: optional<number>
  tags: str[]
"#;

    #[test]
    fn test_yaml_document() {
        let doc = SchemaDocument::from_yaml_str(PROFILE).unwrap();
        assert_eq!(doc.name, "Profile");
        assert_eq!(doc.description.as_deref(), Some("A user profile"));
        assert_eq!(doc.extra_fields, ExtraFields::Drop);
        let names: Vec<_> = doc.fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["name", "age", "tags"]);

        let schema = doc.schema(&TypeRegistry::new()).unwrap();
        assert_eq!(schema.get("age"), Some(&optional(number())));
        assert_eq!(schema.get("tags"), Some(&array_of(string())));
    }

    #[test]
    fn test_json_document_defaults_to_reject() {
        let doc = SchemaDocument::from_json_str(r#"{"name": "Point", "fields": {"x": "number"}}"#)
            .unwrap();
        assert_eq!(doc.extra_fields, ExtraFields::Reject);
        let factory = doc.build(&TypeRegistry::new()).unwrap();
        let err = factory.construct_json(json!({"x": 1, "y": 2})).unwrap_err();
        assert!(matches!(err, ConstructionError::UnexpectedField { .. }));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = SchemaDocument::from_yaml_str("name: X\nfields: {}\nextra: 1\n").unwrap_err();
        assert!(matches!(err, SchemaError::DocumentLoad { .. }));
    }

    #[test]
    fn test_invalid_field_names_field() {
        let doc = SchemaDocument::from_yaml_str("name: X\nfields:\n  price: Money\n").unwrap();
        let err = doc.schema(&TypeRegistry::new()).unwrap_err();
        assert_eq!(err.to_string(), "field 'price': unknown type 'Money'");
    }

    #[test]
    fn test_base_section_becomes_base_type() {
        let doc = SchemaDocument::from_yaml_str(
            "name: Doc\nbase:\n  name: Audited\n  fields:\n    revision: 1\nfields:\n  title: string\n",
        )
        .unwrap();
        let factory = doc.build(&TypeRegistry::new()).unwrap();
        let instance = factory.construct_json(json!({"title": "hello"})).unwrap();
        assert!(instance.extends("Audited"));
        assert_eq!(instance.number("revision"), Some(1.0));
    }

    #[test]
    fn test_behavior_sharing_a_field_name() {
        let doc = SchemaDocument::from_yaml_str(PROFILE).unwrap();
        let behaviors = BehaviorTable::new().getter("name", |_| Value::Null);
        let err = doc.build_with(&TypeRegistry::new(), behaviors).unwrap_err();
        assert!(matches!(err, SchemaError::Definition(_)));
    }
}
