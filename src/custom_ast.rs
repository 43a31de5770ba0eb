//! subfield selection for complex scalars
//!
//! some postgres-backed types surface as objects and cannot be selected as a
//! bare leaf. geometry and interval columns get a fixed subfield selection;
//! everything else is a plain field.

use crate::ast::{field, field_with, inline_fragment, select, select_nested, FieldNode};
use crate::schema::{CleanField, CleanFieldType};

/// graphql type names that require a nested selection set
pub const COMPLEX_GQL_TYPES: [&str; 4] = [
    "GeometryPoint",
    "Interval",
    "GeometryGeometryCollection",
    "GeoJSON",
];

const INTERVAL_PARTS: [&str; 6] = ["days", "hours", "minutes", "months", "seconds", "years"];

/// true iff the field's graphql type is one of [`COMPLEX_GQL_TYPES`]
pub fn requires_subfield_selection(field: &CleanField) -> bool {
    COMPLEX_GQL_TYPES.contains(&field.field_type.base_gql_type())
}

/// field node for a table column, with subfields where the type needs them
pub fn get_custom_ast_for_clean_field(clean: &CleanField) -> FieldNode {
    custom_field_node(&clean.name, &clean.field_type)
}

/// dispatch on graphql type name first, then on the storage type name
pub fn custom_field_node(name: &str, ty: &CleanFieldType) -> FieldNode {
    match ty.base_gql_type() {
        "GeometryPoint" => return geometry_point(name),
        "Interval" => return interval(name),
        "GeometryGeometryCollection" => return geometry_collection(name),
        "GeoJSON" => return geometry(name),
        _ => {}
    }

    match ty.pg_type.as_deref() {
        Some("geometry") => geometry(name),
        Some("interval") => interval(name),
        _ => field(name),
    }
}

fn geometry_point(name: &str) -> FieldNode {
    field_with(name, Vec::new(), vec![select("x"), select("y")])
}

fn geometry(name: &str) -> FieldNode {
    field_with(name, Vec::new(), vec![select("geojson")])
}

fn geometry_collection(name: &str) -> FieldNode {
    let point = inline_fragment("GeometryPoint", vec![select("x"), select("y")]);
    let geometries = select_nested("geometries", vec![point]);
    field_with(name, Vec::new(), vec![geometries])
}

fn interval(name: &str) -> FieldNode {
    field_with(
        name,
        Vec::new(),
        INTERVAL_PARTS.iter().map(|part| select(*part)).collect(),
    )
}
