use super::{BuildContext, BuildSkip, NamedDocument};
use crate::ast::{
    field_with, mutation_document, object_value, select, select_nested, variable,
    variable_argument, variable_definition, Argument, SelectionNode, ValueNode, VariableNode,
};
use crate::gql_map::{GqlField, PropertySpec, NON_MUTABLE_PROPS};
use crate::naming::{classify, is_id_suppressed_model, model_key, mutation_document_name, singularize};
use crate::options::MutationInputMode;
use crate::registry::TypeIndex;
use crate::resolve::{
    flags_to_type_node, ref_to_type_node, resolve_type_name, type_name_or_fallback, TypeNode,
};
use crate::schema::TypeKind;
use graphql_parser::query::Type;
use indexmap::IndexMap;
use tracing::debug;

const CLIENT_MUTATION_ID: &str = "clientMutationId";
const INPUT: &str = "input";

/// one input attribute that becomes a variable
struct Attribute<'q> {
    name: &'q str,
    spec: &'q PropertySpec,
}

fn attributes(properties: &IndexMap<String, PropertySpec>) -> Vec<Attribute<'_>> {
    properties
        .iter()
        .filter(|(name, _)| name.as_str() != CLIENT_MUTATION_ID)
        .map(|(name, spec)| Attribute {
            name: name.as_str(),
            spec,
        })
        .collect()
}

fn is_mutable(attr: &Attribute<'_>) -> bool {
    if attr.name == "id" {
        return attr.spec.flags().not_null;
    }
    !NON_MUTABLE_PROPS.contains(&attr.name)
}

/// variable type for an attribute: the registry's input field type when one is
/// known, else the descriptor's name plus its wrapping flags
///
/// the flag is true when no name could be found.
fn attribute_type(
    attr: &Attribute<'_>,
    input_type: &str,
    ctx: &BuildContext<'_>,
    optional: bool,
) -> (TypeNode, bool) {
    let from_registry = ctx
        .type_index
        .and_then(|index| index.input_field_type(input_type, attr.name))
        .and_then(|r| ref_to_type_node(r, ctx.overrides));
    if let Some(node) = from_registry {
        return (node, false);
    }

    let resolved = resolve_type_name(attr.name, attr.spec.type_spec.as_ref(), ctx.overrides);
    let mut flags = attr.spec.flags();
    if optional {
        flags.not_null = false;
    }
    let node = flags_to_type_node(type_name_or_fallback(&resolved), flags);
    (node, resolved.is_err())
}

/// variable definitions plus the number of attributes left unresolved
fn attribute_variables(
    attrs: &[Attribute<'_>],
    input_type: &str,
    ctx: &BuildContext<'_>,
    optional: bool,
) -> (Vec<VariableNode>, usize) {
    attrs
        .iter()
        .fold((Vec::new(), 0), |(mut variables, unresolved), attr| {
            let (node, missed) = attribute_type(attr, input_type, ctx, optional);
            variables.push(variable_definition(attr.name, node));
            (variables, unresolved + usize::from(missed))
        })
}

fn attribute_object(attrs: &[Attribute<'_>]) -> ValueNode {
    object_value(
        attrs
            .iter()
            .map(|attr| (attr.name.to_string(), variable(attr.name)))
            .collect(),
    )
}

fn non_null(name: &str) -> TypeNode {
    Type::NonNullType(Box::new(Type::NamedType(name.to_string())))
}

/// `$input: <InputType>!` bound straight to `input`
fn raw_input(input_type: &str) -> (Vec<VariableNode>, Vec<Argument>) {
    (
        vec![variable_definition(INPUT, non_null(input_type))],
        vec![variable_argument(INPUT)],
    )
}

fn input_arguments(value: ValueNode) -> Vec<Argument> {
    vec![(INPUT.to_string(), value)]
}

fn input_properties<'q>(
    operation_name: &str,
    mutation: &'q GqlField,
) -> Result<&'q IndexMap<String, PropertySpec>, BuildSkip> {
    mutation
        .input_properties()
        .ok_or_else(|| BuildSkip::MissingInput {
            operation: operation_name.to_string(),
        })
}

/// name of the mutation's input type, `<Operation>Input` when undeclared
fn input_type_name(operation_name: &str, mutation: &GqlField, ctx: &BuildContext<'_>) -> String {
    let spec = mutation
        .properties
        .get(INPUT)
        .and_then(|input| input.type_spec.as_ref());
    resolve_type_name(INPUT, spec, ctx.overrides)
        .unwrap_or_else(|_| format!("{}Input", classify(operation_name)))
}

/// model named by the descriptor, or by the operation name minus its verb
fn model_name(operation_name: &str, mutation: &GqlField) -> String {
    if !mutation.model.is_empty() {
        return mutation.model.clone();
    }
    let stripped = ["create", "update", "delete"]
        .iter()
        .find_map(|verb| operation_name.strip_prefix(verb))
        .unwrap_or(operation_name);
    classify(stripped)
}

fn model_type_name(model: &str) -> String {
    classify(&singularize(model))
}

/// whether `id` may be selected on the model type
fn id_selectable(model_type: &str, ctx: &BuildContext<'_>) -> bool {
    if is_id_suppressed_model(model_type) {
        return false;
    }
    match ctx.type_index.and_then(|index| index.by_name(model_type)) {
        Some(ty) => ty.field("id").is_some(),
        None => true,
    }
}

/// configured model fields with `id` dropped where it cannot be selected
fn model_fields(key: &str, model_type: &str, ctx: &BuildContext<'_>) -> Vec<SelectionNode> {
    let mut fields = ctx.selection.mutation_model_fields(key);
    if !id_selectable(model_type, ctx) {
        fields.retain(|field| field != "id");
    }
    fields.into_iter().map(select).collect()
}

/// `<modelKey> { .. }`, or nothing when no field is left to select
fn model_selection(
    key: &str,
    mut fields: Vec<SelectionNode>,
    ctx: &BuildContext<'_>,
) -> Option<SelectionNode> {
    if fields.is_empty() && ctx.selection.force_model_output {
        fields.push(select("__typename"));
    }
    (!fields.is_empty()).then(|| select_nested(key, fields))
}

/// `<modelKey> { .. } clientMutationId`
fn payload_selections(
    key: &str,
    fields: Vec<SelectionNode>,
    ctx: &BuildContext<'_>,
) -> Vec<SelectionNode> {
    model_selection(key, fields, ctx)
        .into_iter()
        .chain(std::iter::once(select(CLIENT_MUTATION_ID)))
        .collect()
}

fn document(
    operation_name: &str,
    variables: Vec<VariableNode>,
    arguments: Vec<Argument>,
    payload: Vec<SelectionNode>,
    raw: bool,
) -> NamedDocument {
    let name = mutation_document_name(operation_name);
    let root = field_with(operation_name, arguments, payload);
    let ast = mutation_document(name.as_str(), variables, vec![SelectionNode::Field(root)]);
    NamedDocument {
        raw_input: raw,
        ..NamedDocument::new(name, ast)
    }
}

/// create mutation: `input: { <modelKey>: { attr: $attr .. } }`
pub fn create_one(
    operation_name: &str,
    mutation: &GqlField,
    ctx: &BuildContext<'_>,
) -> Result<NamedDocument, BuildSkip> {
    let properties = input_properties(operation_name, mutation)?;
    let model = model_name(operation_name, mutation);
    let model_type = model_type_name(&model);

    // the declared key wins over the inflected one
    let inflected = model_key(&model);
    let model_input = properties
        .get_key_value(&inflected)
        .filter(|(_, spec)| spec.properties.is_some())
        .or_else(|| {
            properties
                .iter()
                .find(|(name, spec)| name.as_str() != CLIENT_MUTATION_ID && spec.properties.is_some())
        })
        .and_then(|(name, spec)| spec.properties.as_ref().map(|props| (name, spec, props)));
    let Some((key, model_spec, model_props)) = model_input else {
        return Err(BuildSkip::MissingModelInput {
            operation: operation_name.to_string(),
            model: inflected,
        });
    };
    let key = key.clone();

    let input_type = input_type_name(operation_name, mutation, ctx);
    let model_input_type = resolve_type_name(&key, model_spec.type_spec.as_ref(), ctx.overrides)
        .unwrap_or_else(|_| format!("{model_type}Input"));

    let attrs: Vec<Attribute<'_>> = attributes(model_props)
        .into_iter()
        .filter(is_mutable)
        .collect();
    let (variables, unresolved) = attribute_variables(&attrs, &model_input_type, ctx, false);

    let mode = ctx.selection.mutation_input_mode;
    let raw = mode == MutationInputMode::Raw || unresolved > 0;
    let (variables, arguments) = if raw {
        debug!(operation = operation_name, unresolved, "using raw input");
        raw_input(&input_type)
    } else if mode == MutationInputMode::Model {
        (
            vec![variable_definition(key.as_str(), non_null(&model_input_type))],
            input_arguments(object_value(vec![(key.clone(), variable(key.as_str()))])),
        )
    } else {
        (
            variables,
            input_arguments(object_value(vec![(key.clone(), attribute_object(&attrs))])),
        )
    };

    let payload = payload_selections(&key, model_fields(&key, &model_type, ctx), ctx);
    Ok(document(operation_name, variables, arguments, payload, raw))
}

/// patch mutation: lookup attributes plus `patch: { .. }`
pub fn patch_one(
    operation_name: &str,
    mutation: &GqlField,
    ctx: &BuildContext<'_>,
) -> Result<NamedDocument, BuildSkip> {
    let properties = input_properties(operation_name, mutation)?;
    let model = model_name(operation_name, mutation);
    let key = model_key(&model);
    let model_type = model_type_name(&model);
    let input_type = input_type_name(operation_name, mutation, ctx);

    let patch = properties
        .iter()
        .find(|(name, _)| name.as_str() == "patch" || name.ends_with("Patch"));
    let by_attrs: Vec<Attribute<'_>> = attributes(properties)
        .into_iter()
        .filter(|attr| patch.map_or(true, |(patch_key, _)| attr.name != patch_key.as_str()))
        .collect();

    let (mut variables, mut unresolved) = attribute_variables(&by_attrs, &input_type, ctx, false);
    let mut fields: Vec<(String, ValueNode)> = by_attrs
        .iter()
        .map(|attr| (attr.name.to_string(), variable(attr.name)))
        .collect();

    let mode = ctx.selection.mutation_input_mode;
    if let Some((patch_key, patch_spec)) = patch {
        let patch_type = resolve_type_name(patch_key, patch_spec.type_spec.as_ref(), ctx.overrides)
            .unwrap_or_else(|_| format!("{model_type}Patch"));
        if matches!(
            mode,
            MutationInputMode::PatchCollapsed | MutationInputMode::Model
        ) {
            variables.push(variable_definition(patch_key.as_str(), non_null(&patch_type)));
            fields.push((patch_key.clone(), variable(patch_key.as_str())));
        } else {
            let patch_attrs: Vec<Attribute<'_>> = patch_spec
                .properties
                .as_ref()
                .map(attributes)
                .unwrap_or_default()
                .into_iter()
                .filter(|attr| !NON_MUTABLE_PROPS.contains(&attr.name))
                .filter(|attr| by_attrs.iter().all(|by| by.name != attr.name))
                .collect();
            let (patch_vars, missed) = attribute_variables(&patch_attrs, &patch_type, ctx, true);
            variables.extend(patch_vars);
            unresolved += missed;
            fields.push((patch_key.clone(), attribute_object(&patch_attrs)));
        }
    }

    let raw = mode == MutationInputMode::Raw || unresolved > 0;
    let (variables, arguments) = if raw {
        debug!(operation = operation_name, unresolved, "using raw input");
        raw_input(&input_type)
    } else {
        (variables, input_arguments(object_value(fields)))
    };

    let payload = payload_selections(&key, model_fields(&key, &model_type, ctx), ctx);
    Ok(document(operation_name, variables, arguments, payload, raw))
}

/// delete mutation: lookup attributes only, selects `clientMutationId`
pub fn delete_one(
    operation_name: &str,
    mutation: &GqlField,
    ctx: &BuildContext<'_>,
) -> Result<NamedDocument, BuildSkip> {
    let properties = input_properties(operation_name, mutation)?;
    let input_type = input_type_name(operation_name, mutation, ctx);
    let attrs = attributes(properties);
    let (variables, unresolved) = attribute_variables(&attrs, &input_type, ctx, false);

    let raw = ctx.selection.mutation_input_mode == MutationInputMode::Raw || unresolved > 0;
    let (variables, arguments) = if raw {
        raw_input(&input_type)
    } else {
        (variables, input_arguments(attribute_object(&attrs)))
    };

    Ok(document(
        operation_name,
        variables,
        arguments,
        vec![select(CLIENT_MUTATION_ID)],
        raw,
    ))
}

/// custom mutation over arbitrary input attributes
///
/// the payload selects the output field typed as the model, when one can be
/// found among declared outputs or in the registry's payload type.
pub fn create_mutation(
    operation_name: &str,
    mutation: &GqlField,
    ctx: &BuildContext<'_>,
) -> Result<NamedDocument, BuildSkip> {
    let properties = input_properties(operation_name, mutation)?;
    let input_type = input_type_name(operation_name, mutation, ctx);
    let attrs = attributes(properties);
    let (variables, unresolved) = attribute_variables(&attrs, &input_type, ctx, false);

    let raw = ctx.selection.mutation_input_mode == MutationInputMode::Raw
        || unresolved > 0
        || attrs.is_empty();
    let (variables, arguments) = if raw {
        raw_input(&input_type)
    } else {
        (variables, input_arguments(attribute_object(&attrs)))
    };

    let mut payload = Vec::new();
    if !mutation.model.is_empty() {
        let model_type = model_type_name(&mutation.model);
        let key = model_key(&mutation.model);
        match model_output_field(operation_name, mutation, &model_type, ctx) {
            Some(output) => {
                let fields = ctx
                    .type_index
                    .and_then(|index| leaf_fields(index, &model_type))
                    .unwrap_or_else(|| model_fields(&key, &model_type, ctx));
                if !fields.is_empty() {
                    payload.push(select_nested(output, fields));
                }
            }
            None if ctx.selection.force_model_output => {
                payload.extend(model_selection(
                    &key,
                    model_fields(&key, &model_type, ctx),
                    ctx,
                ));
            }
            None => {}
        }
    }
    payload.push(select(CLIENT_MUTATION_ID));

    Ok(document(operation_name, variables, arguments, payload, raw))
}

/// payload field whose type is the model
fn model_output_field(
    operation_name: &str,
    mutation: &GqlField,
    model_type: &str,
    ctx: &BuildContext<'_>,
) -> Option<String> {
    let declared = mutation.outputs.iter().find(|output| {
        output.name != CLIENT_MUTATION_ID
            && resolve_type_name(&output.name, output.type_spec.as_ref(), ctx.overrides)
                .is_ok_and(|name| name == model_type && name != "Query")
    });
    if let Some(output) = declared {
        return Some(output.name.clone());
    }

    let index = ctx.type_index?;
    let payload_type = resolve_type_name("output", mutation.output.as_ref(), ctx.overrides)
        .unwrap_or_else(|_| format!("{}Payload", classify(operation_name)));
    index
        .by_name(&payload_type)?
        .fields
        .iter()
        .find(|field| {
            let base = field.type_ref.base_name();
            field.name != CLIENT_MUTATION_ID && base != Some("Query") && base == Some(model_type)
        })
        .map(|field| field.name.clone())
}

/// scalar and enum fields of a registry object type
fn leaf_fields(index: &dyn TypeIndex, type_name: &str) -> Option<Vec<SelectionNode>> {
    let ty = index.by_name(type_name)?;
    Some(
        ty.fields
            .iter()
            .filter(|field| {
                matches!(
                    field.type_ref.base().kind,
                    TypeKind::Scalar | TypeKind::Enum
                )
            })
            .map(|field| select(field.name.as_str()))
            .collect(),
    )
}
