//! Response schema model
//!
//! A [`Schema`] describes the JSON document the model must return. It is
//! provider-neutral and renders to the dialect each provider expects:
//!
//! - [`Schema::to_gemini`]: Gemini's OpenAPI subset (`"type": "OBJECT"`,
//!   `nullable`, `propertyOrdering`)
//! - [`Schema::to_json_schema`]: strict JSON Schema as used by OpenAI
//!   structured outputs (`"type": ["number", "null"]`,
//!   `additionalProperties: false`)
//!
//! # Example
//!
//! ```
//! use stockcast_llm::Schema;
//!
//! let schema = Schema::object()
//!     .property("name", Schema::string())
//!     .property("pe_ratio", Schema::number().nullable())
//!     .property("direction", Schema::string().enumeration(["up", "down", "neutral"]))
//!     .required(["name", "pe_ratio", "direction"]);
//!
//! let gemini = schema.to_gemini();
//! assert_eq!(gemini["type"], "OBJECT");
//! assert_eq!(gemini["properties"]["pe_ratio"]["nullable"], true);
//! ```

use serde_json::{Map, Value, json};

/// Primitive schema type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl SchemaType {
    fn gemini_name(self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Integer => "INTEGER",
            Self::Boolean => "BOOLEAN",
            Self::Array => "ARRAY",
            Self::Object => "OBJECT",
        }
    }

    fn json_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// A response schema node
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Node type
    pub kind: SchemaType,
    /// Optional description shown to the model
    pub description: Option<String>,
    /// Whether `null` is an accepted value
    pub nullable: bool,
    /// Allowed string values (empty means unrestricted)
    pub enum_values: Vec<String>,
    /// Item schema for arrays
    pub items: Option<Box<Schema>>,
    /// Object properties in declaration order
    pub properties: Vec<(String, Schema)>,
    /// Required property names
    pub required: Vec<String>,
}

impl Schema {
    fn of(kind: SchemaType) -> Self {
        Self {
            kind,
            description: None,
            nullable: false,
            enum_values: Vec::new(),
            items: None,
            properties: Vec::new(),
            required: Vec::new(),
        }
    }

    /// String node
    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    /// Floating point node
    pub fn number() -> Self {
        Self::of(SchemaType::Number)
    }

    /// Integer node
    pub fn integer() -> Self {
        Self::of(SchemaType::Integer)
    }

    /// Boolean node
    pub fn boolean() -> Self {
        Self::of(SchemaType::Boolean)
    }

    /// Array node with the given item schema
    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(SchemaType::Array)
        }
    }

    /// Empty object node; add fields with [`Schema::property`]
    pub fn object() -> Self {
        Self::of(SchemaType::Object)
    }

    /// Add a property (objects only; order is preserved)
    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.push((name.into(), schema));
        self
    }

    /// Set the required property names
    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = names.into_iter().map(Into::into).collect();
        self
    }

    /// Accept `null` in addition to the node type
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Restrict a string node to a fixed set of values
    pub fn enumeration<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a description
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Look up a property by name
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.properties
            .iter()
            .find_map(|(key, schema)| (key == name).then_some(schema))
    }

    /// Render in Gemini's `responseSchema` dialect
    pub fn to_gemini(&self) -> Value {
        let mut node = Map::new();
        node.insert("type".into(), json!(self.kind.gemini_name()));
        self.common_fields(&mut node);
        if self.nullable {
            node.insert("nullable".into(), json!(true));
        }
        if let Some(items) = &self.items {
            node.insert("items".into(), items.to_gemini());
        }
        if self.kind == SchemaType::Object {
            let properties: Map<String, Value> = self
                .properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.to_gemini()))
                .collect();
            let ordering: Vec<&str> = self.properties.iter().map(|(n, _)| n.as_str()).collect();
            node.insert("properties".into(), Value::Object(properties));
            node.insert("propertyOrdering".into(), json!(ordering));
            if !self.required.is_empty() {
                node.insert("required".into(), json!(self.required));
            }
        }
        Value::Object(node)
    }

    /// Render as strict JSON Schema (OpenAI structured outputs)
    pub fn to_json_schema(&self) -> Value {
        let mut node = Map::new();
        let type_name = self.kind.json_name();
        if self.nullable {
            node.insert("type".into(), json!([type_name, "null"]));
        } else {
            node.insert("type".into(), json!(type_name));
        }
        self.common_fields(&mut node);
        if let Some(items) = &self.items {
            node.insert("items".into(), items.to_json_schema());
        }
        if self.kind == SchemaType::Object {
            let properties: Map<String, Value> = self
                .properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.to_json_schema()))
                .collect();
            node.insert("properties".into(), Value::Object(properties));
            node.insert("required".into(), json!(self.required));
            node.insert("additionalProperties".into(), json!(false));
        }
        Value::Object(node)
    }

    fn common_fields(&self, node: &mut Map<String, Value>) {
        if let Some(description) = &self.description {
            node.insert("description".into(), json!(description));
        }
        if !self.enum_values.is_empty() {
            node.insert("enum".into(), json!(self.enum_values));
        }
    }
}
