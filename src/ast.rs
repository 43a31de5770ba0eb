//! query ast constructors
//!
//! thin helpers over `graphql_parser::query` so builders read as the tree
//! they produce. all nodes use owned `String` text and a zero position.
//!
//! object values are `BTreeMap`s, so input objects print with their keys
//! sorted: `{patch: {..}, userId: $userId}` whatever the insertion order.

use crate::resolve::TypeNode;
use graphql_parser::query::{
    Definition, Document, Field, FragmentDefinition, InlineFragment, Mutation, Number,
    OperationDefinition, Query, Selection, SelectionSet, TypeCondition, Value,
    VariableDefinition,
};
use graphql_parser::Pos;
use std::collections::BTreeMap;

pub type Doc = Document<'static, String>;
pub type FieldNode = Field<'static, String>;
pub type SelectionNode = Selection<'static, String>;
pub type ValueNode = Value<'static, String>;
pub type VariableNode = VariableDefinition<'static, String>;
pub type Argument = (String, ValueNode);

const POS: Pos = Pos { line: 0, column: 0 };

pub fn selection_set(items: Vec<SelectionNode>) -> SelectionSet<'static, String> {
    SelectionSet {
        span: (POS, POS),
        items,
    }
}

/// leaf field
pub fn field(name: impl Into<String>) -> FieldNode {
    field_with(name, Vec::new(), Vec::new())
}

/// field with arguments and a nested selection
pub fn field_with(
    name: impl Into<String>,
    arguments: Vec<Argument>,
    selections: Vec<SelectionNode>,
) -> FieldNode {
    Field {
        position: POS,
        alias: None,
        name: name.into(),
        arguments,
        directives: Vec::new(),
        selection_set: selection_set(selections),
    }
}

pub fn select(name: impl Into<String>) -> SelectionNode {
    Selection::Field(field(name))
}

pub fn select_nested(name: impl Into<String>, selections: Vec<SelectionNode>) -> SelectionNode {
    Selection::Field(field_with(name, Vec::new(), selections))
}

pub fn inline_fragment(on: impl Into<String>, selections: Vec<SelectionNode>) -> SelectionNode {
    Selection::InlineFragment(InlineFragment {
        position: POS,
        type_condition: Some(TypeCondition::On(on.into())),
        directives: Vec::new(),
        selection_set: selection_set(selections),
    })
}

pub fn variable(name: impl Into<String>) -> ValueNode {
    Value::Variable(name.into())
}

pub fn variable_definition(name: impl Into<String>, var_type: TypeNode) -> VariableNode {
    VariableDefinition {
        position: POS,
        name: name.into(),
        var_type,
        default_value: None,
    }
}

/// `name: $name`
pub fn variable_argument(name: impl Into<String>) -> Argument {
    let name = name.into();
    (name.clone(), variable(name))
}

pub fn object_value(fields: Vec<(String, ValueNode)>) -> ValueNode {
    Value::Object(fields.into_iter().collect::<BTreeMap<_, _>>())
}

/// literal argument value from json
pub fn json_value(value: &serde_json::Value) -> ValueNode {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        // graphql `Int` is 32-bit; wider integers keep their digits as strings
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => {
            match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
                Some(i) => Value::Int(Number::from(i)),
                None => Value::String(n.to_string()),
            }
        }
        serde_json::Value::Number(n) => Value::Float(n.as_f64().unwrap_or_default()),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(json_value).collect()),
        serde_json::Value::Object(map) => object_value(
            map.iter()
                .map(|(key, value)| (key.clone(), json_value(value)))
                .collect(),
        ),
    }
}

pub fn query_document(
    name: impl Into<String>,
    variables: Vec<VariableNode>,
    selections: Vec<SelectionNode>,
) -> Doc {
    Document {
        definitions: vec![Definition::Operation(OperationDefinition::Query(Query {
            position: POS,
            name: Some(name.into()),
            variable_definitions: variables,
            directives: Vec::new(),
            selection_set: selection_set(selections),
        }))],
    }
}

pub fn mutation_document(
    name: impl Into<String>,
    variables: Vec<VariableNode>,
    selections: Vec<SelectionNode>,
) -> Doc {
    Document {
        definitions: vec![Definition::Operation(OperationDefinition::Mutation(
            Mutation {
                position: POS,
                name: Some(name.into()),
                variable_definitions: variables,
                directives: Vec::new(),
                selection_set: selection_set(selections),
            },
        ))],
    }
}

pub fn fragment_document(
    name: impl Into<String>,
    on: impl Into<String>,
    selections: Vec<SelectionNode>,
) -> Doc {
    Document {
        definitions: vec![Definition::Fragment(FragmentDefinition {
            position: POS,
            name: name.into(),
            type_condition: TypeCondition::On(on.into()),
            directives: Vec::new(),
            selection_set: selection_set(selections),
        })],
    }
}

/// variable definitions of the document's first operation
pub fn variables_of(doc: &Doc) -> &[VariableNode] {
    match doc.definitions.first() {
        Some(Definition::Operation(OperationDefinition::Query(q))) => &q.variable_definitions,
        Some(Definition::Operation(OperationDefinition::Mutation(m))) => &m.variable_definitions,
        _ => &[],
    }
}

/// top-level selections of the document's first definition
pub fn root_selections(doc: &Doc) -> &[SelectionNode] {
    match doc.definitions.first() {
        Some(Definition::Operation(OperationDefinition::Query(q))) => &q.selection_set.items,
        Some(Definition::Operation(OperationDefinition::Mutation(m))) => &m.selection_set.items,
        Some(Definition::Operation(OperationDefinition::SelectionSet(s))) => &s.items,
        Some(Definition::Fragment(f)) => &f.selection_set.items,
        _ => &[],
    }
}

/// names of the fields directly under a selection list
pub fn field_names(selections: &[SelectionNode]) -> Vec<&str> {
    selections
        .iter()
        .filter_map(|selection| match selection {
            Selection::Field(field) => Some(field.name.as_str()),
            _ => None,
        })
        .collect()
}

/// child field named `name` in a selection list
pub fn find_field<'d>(selections: &'d [SelectionNode], name: &str) -> Option<&'d FieldNode> {
    selections.iter().find_map(|selection| match selection {
        Selection::Field(field) if field.name == name => Some(field),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_document_prints() {
        let doc = query_document(
            "getUserQuery",
            Vec::new(),
            vec![select_nested("user", vec![select("id")])],
        );
        let printed = doc.to_string();
        assert!(printed.starts_with("query getUserQuery {"));
        assert!(printed.contains("user {"));
        assert_eq!(field_names(root_selections(&doc)), vec!["user"]);
    }

    #[test]
    fn test_json_value_conversion() {
        let value = json_value(&json!({"first": 10, "ratio": 0.5, "tags": ["a"], "on": true}));
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        assert_eq!(map["first"], Value::Int(Number::from(10)));
        assert_eq!(map["ratio"], Value::Float(0.5));
        assert_eq!(map["on"], Value::Boolean(true));
        assert!(matches!(map["tags"], Value::List(_)));
    }

    #[test]
    fn test_json_value_wide_integers() {
        assert_eq!(
            json_value(&json!(3_000_000_000_u64)),
            Value::String("3000000000".into())
        );
        assert_eq!(
            json_value(&json!(-3_000_000_000_i64)),
            Value::String("-3000000000".into())
        );
        assert_eq!(json_value(&json!(i32::MAX)), Value::Int(Number::from(i32::MAX)));
        assert_eq!(json_value(&json!(2.5)), Value::Float(2.5));
    }
}
