//! introspection payloads
//!
//! serde shapes for a standard `__schema` introspection response and the
//! query text that produces it.

use crate::schema::{CleanTypeRef, TypeKind};
use serde::{Deserialize, Serialize};

/// introspection query covering everything the type registry needs
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    types {
      kind
      name
      fields(includeDeprecated: true) {
        name
        args { name type { ...TypeRef } }
        type { ...TypeRef }
      }
      inputFields { name type { ...TypeRef } }
      enumValues(includeDeprecated: true) { name }
      possibleTypes { kind name }
    }
  }
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType { kind name }
      }
    }
  }
}
"#;

/// `data` envelope of an introspection response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionData {
    #[serde(rename = "__schema")]
    pub schema: IntrospectionSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionSchema {
    #[serde(default)]
    pub query_type: Option<NamedRef>,
    #[serde(default)]
    pub mutation_type: Option<NamedRef>,
    pub types: Vec<IntrospectionType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionType {
    pub kind: TypeKind,
    pub name: String,
    #[serde(default)]
    pub fields: Option<Vec<IntrospectionField>>,
    #[serde(default)]
    pub input_fields: Option<Vec<IntrospectionInputValue>>,
    #[serde(default)]
    pub enum_values: Option<Vec<NamedRef>>,
    #[serde(default)]
    pub possible_types: Option<Vec<CleanTypeRef>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionField {
    pub name: String,
    #[serde(default)]
    pub args: Vec<IntrospectionInputValue>,
    #[serde(rename = "type")]
    pub field_type: CleanTypeRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionInputValue {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: CleanTypeRef,
}

/// accept both a bare `{"__schema": ..}` object and a `{"data": {..}}` response
pub fn parse_introspection(value: serde_json::Value) -> serde_json::Result<IntrospectionSchema> {
    let value = match value {
        serde_json::Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    };
    let data: IntrospectionData = serde_json::from_value(value)?;
    Ok(data.schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_with_and_without_envelope() {
        let schema = json!({
            "__schema": {
                "queryType": {"name": "Query"},
                "types": [
                    {"kind": "SCALAR", "name": "UUID"},
                    {
                        "kind": "INPUT_OBJECT",
                        "name": "UserInput",
                        "inputFields": [
                            {"name": "email", "type": {"kind": "SCALAR", "name": "String", "ofType": null}}
                        ]
                    }
                ]
            }
        });

        let bare = parse_introspection(schema.clone()).unwrap();
        assert_eq!(bare.types.len(), 2);
        assert_eq!(bare.query_type.unwrap().name, "Query");

        let wrapped = parse_introspection(json!({ "data": schema })).unwrap();
        let input = &wrapped.types[1];
        assert_eq!(input.kind, TypeKind::InputObject);
        assert_eq!(input.input_fields.as_ref().unwrap()[0].name, "email");
    }

    #[test]
    fn test_query_text_is_valid_graphql() {
        assert!(graphql_parser::parse_query::<String>(INTROSPECTION_QUERY).is_ok());
    }
}
