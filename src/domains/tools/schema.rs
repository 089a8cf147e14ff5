//! Parameter schema model for tool definitions.
//!
//! Each tool declares the shape of its arguments with a [`ParamSchema`]:
//! an ordered list of fields with types, requiredness, defaults, and
//! constraints (email format, minimum string length, numeric range).
//! The schema drives both validation (see `validator.rs`) and the
//! `parameters` object exposed by `tools/list`.

use serde_json::{json, Map, Value};

// ============================================================================
// Field Types
// ============================================================================

/// The expected JSON type of a parameter field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    /// An array of strings (e.g. role ids).
    StringArray,
    Object,
}

impl FieldType {
    /// Wire name used in the `parameters` object.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::StringArray => "array",
            Self::Object => "object",
        }
    }

    /// Whether string-typed input may be coerced into this type.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Number)
    }
}

/// Format constraints beyond the primitive type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Format {
    /// Must look like an email address.
    Email,
}

// ============================================================================
// Field Specification
// ============================================================================

/// Declaration of a single parameter field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub description: Option<String>,
    pub field_type: FieldType,
    pub required: bool,
    /// Applied when an optional field is absent from the arguments.
    pub default: Option<Value>,
    /// Sensitive fields keep their default out of the wire projection.
    pub sensitive: bool,
    pub format: Option<Format>,
    pub min_length: Option<usize>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl FieldSpec {
    fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            description: None,
            field_type,
            required: false,
            default: None,
            sensitive: false,
            format: None,
            min_length: None,
            minimum: None,
            maximum: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn string_array(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::StringArray)
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Object)
    }

    /// Human-readable description shown to clients in `tools/list`.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Default value applied when the field is absent. Validation checks
    /// `required` first, so a required field never receives a default.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Mark the field as carrying a secret. Its default still applies
    /// during validation but is never serialized into `tools/list`.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }
}

// ============================================================================
// Parameter Schema
// ============================================================================

/// Ordered set of field declarations for one tool.
#[derive(Debug, Clone, Default)]
pub struct ParamSchema {
    fields: Vec<FieldSpec>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field declaration. Declaration order is preserved in the
    /// wire representation.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Project the schema into the `parameters` wire object:
    /// `{type: "object", properties: {...}, required: [...]}`.
    pub fn to_wire(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut prop = Map::new();
            prop.insert("type".into(), json!(field.field_type.wire_name()));
            if let Some(desc) = &field.description {
                prop.insert("description".into(), json!(desc));
            }
            if let Some(default) = &field.default {
                if !field.sensitive {
                    prop.insert("default".into(), default.clone());
                }
            }
            if let Some(Format::Email) = field.format {
                prop.insert("format".into(), json!("email"));
            }
            if let Some(min_length) = field.min_length {
                prop.insert("minLength".into(), json!(min_length));
            }
            if let Some(minimum) = field.minimum {
                prop.insert("minimum".into(), json!(minimum));
            }
            if let Some(maximum) = field.maximum {
                prop.insert("maximum".into(), json!(maximum));
            }
            if field.field_type == FieldType::StringArray {
                prop.insert("items".into(), json!({ "type": "string" }));
            }
            properties.insert(field.name.clone(), Value::Object(prop));

            if field.required {
                required.push(json!(field.name));
            }
        }

        let mut wire = Map::new();
        wire.insert("type".into(), json!("object"));
        wire.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            wire.insert("required".into(), Value::Array(required));
        }
        Value::Object(wire)
    }
}

// ============================================================================
// Tests
// ============================================================================
