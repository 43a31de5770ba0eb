//! field selection
//!
//! turns a user-facing selection (a preset name or an include/exclude spec)
//! into a concrete field map for one table. relations can be pulled in; when
//! the caller does not list the related fields, a bounded preview of the
//! related table's most descriptive columns is chosen.

use crate::custom_ast::requires_subfield_selection;
use crate::naming::{classify, singularize};
use crate::schema::CleanTable;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// related-table columns ranked for relation previews
pub const PREFERRED_RELATED_FIELDS: [&str; 15] = [
    "displayName",
    "fullName",
    "preferredName",
    "nickname",
    "firstName",
    "lastName",
    "username",
    "email",
    "name",
    "title",
    "label",
    "slug",
    "code",
    "createdAt",
    "updatedAt",
];

/// cap on fields selected for a relation preview
pub const MAX_RELATED_FIELDS: usize = 8;

/// deepest relation nesting a selection may ask for
pub const MAX_SELECTION_DEPTH: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionPreset {
    /// first three columns
    Minimal,
    /// first half of the columns, at least five
    Display,
    /// every column
    All,
    /// every column plus every relation
    Full,
}

/// related fields asked for by `include`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncludeSpec {
    All(bool),
    Fields(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleFieldSelection {
    #[serde(default)]
    pub select: Option<Vec<String>>,
    #[serde(default)]
    pub include_relations: Option<Vec<String>>,
    #[serde(default)]
    pub include: Option<IndexMap<String, IncludeSpec>>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub max_depth: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSelection {
    Preset(SelectionPreset),
    Custom(SimpleFieldSelection),
}

impl Default for FieldSelection {
    fn default() -> Self {
        FieldSelection::Preset(SelectionPreset::Display)
    }
}

/// one entry of a concrete field map
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionValue {
    /// plain column
    Field,
    /// relation with its own nested field map
    Relation {
        select: SelectionOptions,
        variables: IndexMap<String, serde_json::Value>,
    },
}

/// field name -> selection, in selection order
pub type SelectionOptions = IndexMap<String, SelectionValue>;

/// resolve a selection against `table`
///
/// `None` selects the `display` preset. returns `None` when nothing is left
/// to select.
pub fn convert_to_selection_options(
    table: &CleanTable,
    all_tables: &[CleanTable],
    selection: Option<&FieldSelection>,
) -> Option<SelectionOptions> {
    let options = match selection {
        None => preset_options(table, all_tables, SelectionPreset::Display),
        Some(FieldSelection::Preset(preset)) => preset_options(table, all_tables, *preset),
        Some(FieldSelection::Custom(custom)) => custom_options(table, all_tables, custom),
    };

    (!options.is_empty()).then_some(options)
}

fn preset_options(
    table: &CleanTable,
    all_tables: &[CleanTable],
    preset: SelectionPreset,
) -> SelectionOptions {
    let scalars: Vec<&str> = table.scalar_fields().map(|f| f.name.as_str()).collect();
    let take = match preset {
        SelectionPreset::Minimal => 3,
        SelectionPreset::Display => std::cmp::max(5, scalars.len() / 2),
        SelectionPreset::All | SelectionPreset::Full => scalars.len(),
    };

    let mut options: SelectionOptions = scalars
        .into_iter()
        .take(take)
        .map(|name| (name.to_string(), SelectionValue::Field))
        .collect();

    if preset == SelectionPreset::Full {
        for relation in table.relations.iter() {
            options.insert(
                relation.field_name.to_string(),
                relation_preview(relation.related_table, all_tables),
            );
        }
    }

    options
}

fn custom_options(
    table: &CleanTable,
    all_tables: &[CleanTable],
    custom: &SimpleFieldSelection,
) -> SelectionOptions {
    let mut options: SelectionOptions = match &custom.select {
        Some(select) => select
            .iter()
            .filter(|name| !table.is_relational_field(name))
            .map(|name| (name.clone(), SelectionValue::Field))
            .collect(),
        None => table
            .scalar_fields()
            .map(|f| (f.name.clone(), SelectionValue::Field))
            .collect(),
    };

    let bare = custom
        .include_relations
        .iter()
        .flatten()
        .map(|name| (name.as_str(), IncludeSpec::All(true)));
    let keyed = custom
        .include
        .iter()
        .flatten()
        .map(|(name, spec)| (name.as_str(), spec.clone()));

    for (name, spec) in bare.chain(keyed) {
        let Some(relation) = table.relations.find(name) else {
            continue;
        };
        let value = match spec {
            IncludeSpec::All(false) => continue,
            IncludeSpec::All(true) => relation_preview(relation.related_table, all_tables),
            IncludeSpec::Fields(fields) => SelectionValue::Relation {
                select: fields
                    .iter()
                    .map(|f| (f.clone(), SelectionValue::Field))
                    .collect(),
                variables: IndexMap::new(),
            },
        };
        options.insert(name.to_string(), value);
    }

    for name in custom.exclude.iter().flatten() {
        options.shift_remove(name);
    }

    options
}

pub(crate) fn find_table<'t>(all_tables: &'t [CleanTable], name: &str) -> Option<&'t CleanTable> {
    all_tables
        .iter()
        .find(|t| t.name == name)
        .or_else(|| {
            let class = classify(&singularize(name));
            all_tables.iter().find(|t| t.name == class)
        })
}

/// preview selection for a related table
pub fn relation_preview(related_table: &str, all_tables: &[CleanTable]) -> SelectionValue {
    SelectionValue::Relation {
        select: related_preview_fields(related_table, all_tables)
            .into_iter()
            .map(|name| (name, SelectionValue::Field))
            .collect(),
        variables: IndexMap::new(),
    }
}

/// `id`/`nodeId` first, then the preferred columns, capped at
/// [`MAX_RELATED_FIELDS`]
pub fn related_preview_fields(related_table: &str, all_tables: &[CleanTable]) -> Vec<String> {
    let Some(table) = find_table(all_tables, related_table) else {
        return vec!["id".to_string()];
    };

    let available: Vec<&str> = table
        .scalar_fields()
        .filter(|f| !requires_subfield_selection(f))
        .map(|f| f.name.as_str())
        .collect();

    let mut picked: Vec<String> = Vec::new();
    let ranked = ["id", "nodeId"]
        .into_iter()
        .chain(PREFERRED_RELATED_FIELDS);
    for name in ranked {
        if picked.len() >= MAX_RELATED_FIELDS {
            break;
        }
        if available.contains(&name) && !picked.iter().any(|p| p == name) {
            picked.push(name.to_string());
        }
    }

    if picked.is_empty() {
        picked = available
            .into_iter()
            .take(MAX_RELATED_FIELDS)
            .map(str::to_string)
            .collect();
    }

    picked
}

/// outcome of [`validate_field_selection`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// check a selection against a table without resolving it
pub fn validate_field_selection(selection: &FieldSelection, table: &CleanTable) -> ValidationResult {
    let FieldSelection::Custom(custom) = selection else {
        return ValidationResult {
            is_valid: true,
            errors: Vec::new(),
        };
    };

    let exists = |name: &str| table.field(name).is_some() || table.is_relational_field(name);
    let mut errors = Vec::new();

    for name in custom.select.iter().flatten() {
        if !exists(name) {
            errors.push(format!("field `{name}` does not exist on `{}`", table.name));
        }
    }
    for name in custom.exclude.iter().flatten() {
        if !exists(name) {
            errors.push(format!(
                "excluded field `{name}` does not exist on `{}`",
                table.name
            ));
        }
    }

    let included = custom
        .include_relations
        .iter()
        .flatten()
        .chain(custom.include.iter().flat_map(|map| map.keys()));
    for name in included {
        if !table.is_relational_field(name) {
            errors.push(format!("`{name}` is not a relation of `{}`", table.name));
        }
    }

    if let Some(depth) = custom.max_depth {
        if !(0..=MAX_SELECTION_DEPTH).contains(&depth) {
            errors.push(format!(
                "maxDepth must be between 0 and {MAX_SELECTION_DEPTH}, got {depth}"
            ));
        }
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}
