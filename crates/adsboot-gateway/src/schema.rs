//! Structured-output contracts
//!
//! A contract is the single source of truth for a call's output shape. It is
//! rendered into the backend's response-schema dialect so the model is told
//! what to emit, and the decoder validates replies against the same
//! definition.

use serde_json::{json, Map, Value};

use crate::constants::bounds::VARIANTS_PER_CALL;

/// Which call a contract belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    Audience,
    Copy,
    Creative,
    Chat,
}

/// Top-level shape of a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A JSON array of exactly `items` objects
    Array { items: usize },
    /// A single JSON object
    Object,
    /// Unstructured text, no schema
    FreeText,
}

/// JSON type of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    StringArray,
    /// A string restricted to the listed values (case-insensitive)
    Choice(&'static [&'static str]),
}

impl FieldType {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "whole number",
            FieldType::StringArray => "array of strings",
            FieldType::Choice(_) => "one of the allowed values",
        }
    }

    /// Whether `value` has this type. `null` never matches.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => matches!(value, Value::Number(n) if whole_i64(n).is_some()),
            FieldType::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            FieldType::Choice(choices) => value.as_str().is_some_and(|raw| {
                choices
                    .iter()
                    .any(|choice| choice.eq_ignore_ascii_case(raw.trim()))
            }),
        }
    }

    fn render(&self, description: Option<&str>) -> Value {
        let mut schema = match self {
            FieldType::String => json!({ "type": "STRING" }),
            FieldType::Number => json!({ "type": "NUMBER" }),
            FieldType::StringArray => json!({ "type": "ARRAY", "items": { "type": "STRING" } }),
            FieldType::Choice(choices) => {
                json!({ "type": "STRING", "format": "enum", "enum": choices })
            }
        };
        if let Some(description) = description {
            schema["description"] = Value::String(description.to_string());
        }
        schema
    }
}

/// One field of a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    pub description: Option<&'static str>,
}

const fn required(name: &'static str, ty: FieldType) -> FieldSpec {
    FieldSpec {
        name,
        ty,
        required: true,
        description: None,
    }
}

/// The exact integer a JSON number denotes, if it has one
///
/// Whole floats such as `87.0` qualify; fractions and values outside the
/// `i64` range do not.
pub fn whole_i64(number: &serde_json::Number) -> Option<i64> {
    if let Some(n) = number.as_i64() {
        return Some(n);
    }
    let f = number.as_f64()?;
    // 2^63 is the first float past i64::MAX
    let in_range = f >= i64::MIN as f64 && f < 9_223_372_036_854_775_808.0;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

/// Declarative description of a call's expected output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaContract {
    pub kind: ContractKind,
    pub shape: Shape,
    pub fields: &'static [FieldSpec],
}

pub const AUDIENCE: SchemaContract = SchemaContract {
    kind: ContractKind::Audience,
    shape: Shape::Array {
        items: VARIANTS_PER_CALL,
    },
    fields: &[
        required("segmentName", FieldType::String),
        required("interests", FieldType::StringArray),
        required("demographics", FieldType::String),
        required("behaviors", FieldType::StringArray),
        required("exclusions", FieldType::StringArray),
        required("reasoning", FieldType::String),
        required("matchScore", FieldType::Number),
        required("estimatedReach", FieldType::String),
        required("personaEmoji", FieldType::String),
    ],
};

pub const COPY: SchemaContract = SchemaContract {
    kind: ContractKind::Copy,
    shape: Shape::Array {
        items: VARIANTS_PER_CALL,
    },
    fields: &[
        required("angle", FieldType::String),
        required("headline", FieldType::String),
        required("primaryText", FieldType::String),
        required("description", FieldType::String),
    ],
};

pub const CREATIVE: SchemaContract = SchemaContract {
    kind: ContractKind::Creative,
    shape: Shape::Object,
    fields: &[
        required("score", FieldType::Number),
        FieldSpec {
            name: "stopScrollPotential",
            ty: FieldType::Choice(&["High", "Medium", "Low"]),
            required: true,
            description: Some("High, Medium, or Low"),
        },
        required("strengths", FieldType::StringArray),
        required("weaknesses", FieldType::StringArray),
        required("improvements", FieldType::StringArray),
        required("overallFeedback", FieldType::String),
    ],
};

pub const CHAT: SchemaContract = SchemaContract {
    kind: ContractKind::Chat,
    shape: Shape::FreeText,
    fields: &[],
};

impl SchemaContract {
    pub fn is_structured(&self) -> bool {
        self.shape != Shape::FreeText
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> + '_ {
        self.fields.iter().filter(|field| field.required)
    }

    /// Render as a backend response schema. `None` for free-text contracts.
    pub fn response_schema(&self) -> Option<Value> {
        let object = self.object_schema();
        match self.shape {
            Shape::Array { .. } => Some(json!({ "type": "ARRAY", "items": object })),
            Shape::Object => Some(object),
            Shape::FreeText => None,
        }
    }

    fn object_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| (field.name.to_string(), field.ty.render(field.description)))
            .collect();
        let required: Vec<&str> = self.required_fields().map(|field| field.name).collect();
        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": required,
        })
    }
}
