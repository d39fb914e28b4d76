use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::response::{FieldMapping, IndexMapping, IndexOption, Mappings};

/// Flat view of an index mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSchema {
    pub name: String,
    pub fields: Vec<SchemaField>,
}

impl IndexSchema {
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A field in the flattened schema; object children use dotted names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
    pub indexed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_dims: Option<usize>,
}

/// Normalized field types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Keyword,
    I64,
    F64,
    Bool,
    Date,
    Vector,
    Object,
    Unknown(String),
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Keyword => write!(f, "keyword"),
            Self::I64 => write!(f, "i64"),
            Self::F64 => write!(f, "f64"),
            Self::Bool => write!(f, "bool"),
            Self::Date => write!(f, "date"),
            Self::Vector => write!(f, "vector"),
            Self::Object => write!(f, "object"),
            Self::Unknown(s) => write!(f, "unknown({})", s),
        }
    }
}

impl IndexMapping {
    pub fn fields(&self, index_name: &str) -> IndexSchema {
        convert_mapping(index_name, &self.mappings)
    }
}

/// Flatten a mapping into a sorted field list.
///
/// Legacy typed mappings (`mappings.<type>.properties`) are merged in.
pub fn convert_mapping(index_name: &str, mappings: &Mappings) -> IndexSchema {
    let mut fields = Vec::new();

    collect_fields("", &mappings.properties, &mut fields);

    for (type_name, typed) in &mappings.types {
        let Some(props) = typed.get("properties") else {
            continue;
        };
        match serde_json::from_value::<HashMap<String, FieldMapping>>(props.clone()) {
            Ok(props) => collect_fields("", &props, &mut fields),
            Err(e) => {
                tracing::warn!("Skipping mapping type '{}' of '{}': {}", type_name, index_name, e);
            }
        }
    }

    fields.sort_by(|a, b| a.name.cmp(&b.name));

    IndexSchema {
        name: index_name.to_string(),
        fields,
    }
}

fn collect_fields(prefix: &str, props: &HashMap<String, FieldMapping>, out: &mut Vec<SchemaField>) {
    for (name, prop) in props {
        let full_name = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };

        out.push(convert_field(&full_name, prop));

        if let Some(children) = &prop.properties {
            collect_fields(&full_name, children, out);
        }
    }
}

fn convert_field(name: &str, prop: &FieldMapping) -> SchemaField {
    let es_type = prop.field_type.as_deref().unwrap_or("object");

    let (field_type, vector_dims) = match es_type {
        "text" | "match_only_text" | "string" => (FieldType::Text, None),
        "keyword" | "constant_keyword" | "wildcard" => (FieldType::Keyword, None),
        "long" | "integer" | "short" | "byte" => (FieldType::I64, None),
        "float" | "double" | "half_float" | "scaled_float" => (FieldType::F64, None),
        "boolean" => (FieldType::Bool, None),
        "date" | "date_nanos" => (FieldType::Date, None),
        "dense_vector" => (FieldType::Vector, prop.dims),
        "object" | "nested" | "flattened" => (FieldType::Object, None),
        other => {
            tracing::warn!("Unknown mapping type '{}' for field '{}'", other, name);
            (FieldType::Unknown(other.to_string()), None)
        }
    };

    SchemaField {
        name: name.to_string(),
        field_type,
        indexed: prop.index.as_ref().map_or(true, IndexOption::is_indexed),
        vector_dims,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convert_basic_types() {
        let mappings: Mappings = serde_json::from_value(json!({
            "properties": {
                "title": { "type": "text" },
                "category": { "type": "keyword" },
                "price": { "type": "float" },
                "count": { "type": "integer" },
                "active": { "type": "boolean" },
                "created": { "type": "date" }
            }
        }))
        .unwrap();

        let schema = convert_mapping("products", &mappings);

        assert_eq!(schema.name, "products");
        assert_eq!(schema.fields.len(), 6);
        assert_eq!(schema.field("title").unwrap().field_type, FieldType::Text);
        assert_eq!(schema.field("price").unwrap().field_type, FieldType::F64);
        assert_eq!(schema.fields[0].name, "active");
    }

    #[test]
    fn test_nested_objects_are_flattened() {
        let mappings: Mappings = serde_json::from_value(json!({
            "properties": {
                "author": {
                    "properties": {
                        "name": { "type": "keyword" },
                        "age": { "type": "long", "index": false }
                    }
                }
            }
        }))
        .unwrap();

        let schema = convert_mapping("posts", &mappings);

        assert_eq!(schema.field("author").unwrap().field_type, FieldType::Object);
        assert_eq!(schema.field("author.name").unwrap().field_type, FieldType::Keyword);
        assert!(!schema.field("author.age").unwrap().indexed);
    }

    #[test]
    fn test_legacy_typed_mapping() {
        let mappings: Mappings = serde_json::from_value(json!({
            "post": {
                "properties": {
                    "data": { "type": "object" },
                    "body": { "type": "string" }
                }
            }
        }))
        .unwrap();

        let schema = convert_mapping("posts", &mappings);

        assert_eq!(schema.fields.len(), 2);
        assert_eq!(schema.field("body").unwrap().field_type, FieldType::Text);
    }

    #[test]
    fn test_legacy_string_index_modes() {
        let mappings: Mappings = serde_json::from_value(json!({
            "post": {
                "properties": {
                    "title": { "type": "string" },
                    "slug": { "type": "string", "index": "not_analyzed" },
                    "secret": { "type": "string", "index": "no" }
                }
            }
        }))
        .unwrap();

        let schema = convert_mapping("posts", &mappings);

        assert_eq!(schema.fields.len(), 3);
        assert_eq!(schema.field("title").unwrap().field_type, FieldType::Text);
        assert!(schema.field("slug").unwrap().indexed);
        assert!(!schema.field("secret").unwrap().indexed);
    }

    #[test]
    fn test_vector_and_unknown() {
        let mappings: Mappings = serde_json::from_value(json!({
            "properties": {
                "embedding": { "type": "dense_vector", "dims": 384 },
                "geo": { "type": "geo_point" }
            }
        }))
        .unwrap();

        let schema = convert_mapping("docs", &mappings);

        let embedding = schema.field("embedding").unwrap();
        assert_eq!(embedding.field_type, FieldType::Vector);
        assert_eq!(embedding.vector_dims, Some(384));
        assert!(matches!(schema.field("geo").unwrap().field_type, FieldType::Unknown(_)));
    }
}
