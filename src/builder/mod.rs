//! query and mutation document builders
//!
//! each builder turns one [`GqlField`] descriptor into a named document.
//! query builders return `None` when nothing would be selected; mutation
//! builders return a [`BuildSkip`] when the descriptor lacks the inputs they
//! need.

mod mutation;
mod query;

pub use mutation::{create_mutation, create_one, delete_one, patch_one};
pub use query::{
    get_fragment, get_many, get_many_paginated_edges, get_many_paginated_nodes,
    get_order_by_enums, get_one,
};

use crate::ast::{field_with, json_value, select, select_nested, Argument, Doc, SelectionNode};
use crate::custom_ast::custom_field_node;
use crate::gql_map::{GqlField, NestedSelection, SelectionItem};
use crate::options::{ConnectionStyle, SelectionConfig};
use crate::registry::TypeIndex;
use crate::resolve::TypeNameOverrides;
use graphql_parser::query::{Definition, OperationDefinition, Selection};
use std::collections::BTreeMap;

static DEFAULT_SELECTION: SelectionConfig = SelectionConfig::const_default();
static NO_OVERRIDES: TypeNameOverrides = BTreeMap::new();

/// shared inputs for every builder call
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub selection: &'a SelectionConfig,
    pub overrides: &'a TypeNameOverrides,
    /// schema lookups; without one, types come from descriptors only
    pub type_index: Option<&'a dyn TypeIndex>,
}

impl Default for BuildContext<'_> {
    fn default() -> Self {
        Self {
            selection: &DEFAULT_SELECTION,
            overrides: &NO_OVERRIDES,
            type_index: None,
        }
    }
}

impl<'a> BuildContext<'a> {
    pub fn new(selection: &'a SelectionConfig) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    pub fn with_overrides(mut self, overrides: &'a TypeNameOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_type_index(mut self, type_index: &'a dyn TypeIndex) -> Self {
        self.type_index = Some(type_index);
        self
    }
}

/// kind of the document's single definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Query,
    Mutation,
    Fragment,
}

/// a generated document and its name
#[derive(Debug, Clone, PartialEq)]
pub struct NamedDocument {
    pub name: String,
    pub ast: Doc,
    /// mutation variables collapsed into a single `$input`
    pub raw_input: bool,
}

impl NamedDocument {
    pub fn new(name: impl Into<String>, ast: Doc) -> Self {
        Self {
            name: name.into(),
            ast,
            raw_input: false,
        }
    }

    /// graphql source text
    pub fn print(&self) -> String {
        self.ast.to_string()
    }

    pub fn kind(&self) -> DocumentKind {
        match self.ast.definitions.first() {
            Some(Definition::Operation(OperationDefinition::Mutation(_))) => DocumentKind::Mutation,
            Some(Definition::Fragment(_)) => DocumentKind::Fragment,
            _ => DocumentKind::Query,
        }
    }
}

/// why a mutation builder produced no document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildSkip {
    #[error("mutation `{operation}` has no input properties")]
    MissingInput { operation: String },
    #[error("mutation `{operation}` has no `{model}` input object")]
    MissingModelInput { operation: String, model: String },
}

/// selections for a descriptor, narrowed to `fields` when non-empty
pub(crate) fn get_selections(
    query: &GqlField,
    fields: &[String],
    style: ConnectionStyle,
) -> Vec<SelectionNode> {
    query
        .selection
        .iter()
        .filter(|item| fields.is_empty() || fields.iter().any(|f| f == item.name()))
        .map(|item| selection_node(item, style))
        .collect()
}

fn selection_node(item: &SelectionItem, style: ConnectionStyle) -> SelectionNode {
    match item {
        SelectionItem::Field(name) => select(name.as_str()),
        SelectionItem::Typed(typed) => {
            Selection::Field(custom_field_node(&typed.name, &typed.field_type))
        }
        SelectionItem::Nested(nested) => Selection::Field(nested_field(nested, style)),
    }
}

fn nested_field(nested: &NestedSelection, style: ConnectionStyle) -> crate::ast::FieldNode {
    let arguments: Vec<Argument> = nested
        .variables
        .iter()
        .map(|(name, value)| (name.clone(), json_value(value)))
        .collect();
    let children: Vec<SelectionNode> = nested
        .selection
        .iter()
        .map(|item| selection_node(item, style))
        .collect();
    let selections = if nested.is_connection() {
        let items = match style {
            ConnectionStyle::Nodes => select_nested("nodes", children),
            ConnectionStyle::Edges => {
                select_nested("edges", vec![select_nested("node", children)])
            }
        };
        vec![select("totalCount"), items]
    } else {
        children
    };
    field_with(nested.name.as_str(), arguments, selections)
}
