use super::{get_selections, BuildContext, NamedDocument};
use crate::ast::{
    field_with, fragment_document, query_document, select, select_nested, variable_argument,
    variable_definition, Argument, SelectionNode, VariableNode,
};
use crate::gql_map::GqlField;
use crate::naming::{camel_join, classify, model_key, query_document_name, singularize};
use crate::options::ConnectionStyle;
use crate::resolve::{flags_to_type_node, resolve_type_name, type_name_or_fallback};
use graphql_parser::query::{Type, Value};

const PAGE_INFO: [&str; 4] = ["hasNextPage", "hasPreviousPage", "endCursor", "startCursor"];

/// single-row lookup: required descriptor properties become variables
pub fn get_one(
    operation_name: &str,
    query: &GqlField,
    fields: &[String],
    ctx: &BuildContext<'_>,
) -> Option<NamedDocument> {
    let selections = get_selections(query, fields, ctx.selection.connection_style);
    if selections.is_empty() {
        return None;
    }

    let (variables, arguments): (Vec<VariableNode>, Vec<Argument>) = query
        .properties
        .iter()
        .filter(|(_, prop)| prop.flags().not_null)
        .map(|(name, prop)| {
            let resolved = resolve_type_name(name, prop.type_spec.as_ref(), ctx.overrides);
            let var_type = flags_to_type_node(type_name_or_fallback(&resolved), prop.flags());
            (variable_definition(name.as_str(), var_type), variable_argument(name.as_str()))
        })
        .unzip();

    let name = query_document_name(operation_name);
    let root = field_with(operation_name, arguments, selections);
    let ast = query_document(name.as_str(), variables, vec![SelectionNode::Field(root)]);
    Some(NamedDocument::new(name, ast))
}

/// unpaginated connection read over edges
pub fn get_many(
    operation_name: &str,
    query: &GqlField,
    fields: &[String],
    ctx: &BuildContext<'_>,
) -> Option<NamedDocument> {
    let selections = get_selections(query, fields, ctx.selection.connection_style);
    if selections.is_empty() {
        return None;
    }

    let name = query_document_name(operation_name);
    let root = field_with(operation_name, Vec::new(), connection(ConnectionStyle::Edges, selections));
    let ast = query_document(name.as_str(), Vec::new(), vec![SelectionNode::Field(root)]);
    Some(NamedDocument::new(name, ast))
}

/// paginated connection read over `edges { cursor node }`
pub fn get_many_paginated_edges(
    operation_name: &str,
    query: &GqlField,
    fields: &[String],
    ctx: &BuildContext<'_>,
) -> Option<NamedDocument> {
    paginated(
        camel_join(&["get", operation_name, "paginated"]),
        operation_name,
        query,
        fields,
        ctx,
        ConnectionStyle::Edges,
    )
}

/// paginated connection read over `nodes`
pub fn get_many_paginated_nodes(
    operation_name: &str,
    query: &GqlField,
    fields: &[String],
    ctx: &BuildContext<'_>,
) -> Option<NamedDocument> {
    paginated(
        camel_join(&["get", operation_name, "paginated", "nodes"]),
        operation_name,
        query,
        fields,
        ctx,
        ConnectionStyle::Nodes,
    )
}

/// enum values of the connection's `OrderBy` type via `__type`
pub fn get_order_by_enums(operation_name: &str) -> NamedDocument {
    let name = camel_join(&["get", operation_name, "order_by_enums"]);
    let type_name = format!("{}OrderBy", classify(operation_name));
    let root = field_with(
        "__type",
        vec![("name".to_string(), Value::String(type_name))],
        vec![select_nested("enumValues", vec![select("name")])],
    );
    let ast = query_document(name.as_str(), Vec::new(), vec![SelectionNode::Field(root)]);
    NamedDocument::new(name, ast)
}

/// reusable fragment over the model's selection
pub fn get_fragment(
    query: &GqlField,
    fields: &[String],
    ctx: &BuildContext<'_>,
) -> Option<NamedDocument> {
    if query.model.is_empty() {
        return None;
    }
    let selections = get_selections(query, fields, ctx.selection.connection_style);
    if selections.is_empty() {
        return None;
    }

    let type_name = classify(&singularize(&query.model));
    let ast = fragment_document(format!("{type_name}Fragment"), type_name, selections);
    Some(NamedDocument::new(
        format!("{}Fragment", model_key(&query.model)),
        ast,
    ))
}

fn paginated(
    name: String,
    operation_name: &str,
    query: &GqlField,
    fields: &[String],
    ctx: &BuildContext<'_>,
    style: ConnectionStyle,
) -> Option<NamedDocument> {
    let selections = get_selections(query, fields, ctx.selection.connection_style);
    if selections.is_empty() {
        return None;
    }

    let model = if query.model.is_empty() {
        classify(&singularize(operation_name))
    } else {
        classify(&singularize(&query.model))
    };
    let plural = classify(operation_name);
    let variables = pagination_variables(&model, &plural);
    let arguments = variables
        .iter()
        .map(|var| variable_argument(var.name.as_str()))
        .collect();

    let root = field_with(operation_name, arguments, connection(style, selections));
    let ast = query_document(name.as_str(), variables, vec![SelectionNode::Field(root)]);
    Some(NamedDocument::new(name, ast))
}

fn pagination_variables(model: &str, plural: &str) -> Vec<VariableNode> {
    let named = |name: &str| Type::NamedType(name.to_string());
    vec![
        variable_definition("first", named("Int")),
        variable_definition("last", named("Int")),
        variable_definition("offset", named("Int")),
        variable_definition("after", named("Cursor")),
        variable_definition("before", named("Cursor")),
        variable_definition("condition", named(&format!("{model}Condition"))),
        variable_definition("filter", named(&format!("{model}Filter"))),
        variable_definition(
            "orderBy",
            Type::ListType(Box::new(Type::NonNullType(Box::new(named(&format!(
                "{plural}OrderBy"
            )))))),
        ),
    ]
}

/// `totalCount pageInfo { .. }` plus edges or nodes around `selections`
fn connection(style: ConnectionStyle, selections: Vec<SelectionNode>) -> Vec<SelectionNode> {
    let page_info = select_nested("pageInfo", PAGE_INFO.iter().map(|f| select(*f)).collect());
    let items = match style {
        ConnectionStyle::Edges => select_nested(
            "edges",
            vec![select("cursor"), select_nested("node", selections)],
        ),
        ConnectionStyle::Nodes => select_nested("nodes", selections),
    };
    vec![select("totalCount"), page_info, items]
}
