//! codegen options
//!
//! [`SelectionConfig`] steers how the builders shape mutation inputs and
//! connection selections. [`GraphQLCodegenOptions`] is the full json config
//! file read by the `graphile-codegen` binary; every field has a default.

use crate::error::Result;
use crate::naming::DocumentConvention;
use crate::resolve::TypeNameOverrides;
use crate::selection::FieldSelection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// variable strategy for mutation inputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationInputMode {
    /// one variable per input attribute
    #[default]
    Expanded,
    /// one variable holding the whole model input object
    Model,
    /// one `$input` variable holding the whole mutation input
    Raw,
    /// patch attributes travel as a single `$patch` variable
    PatchCollapsed,
}

/// relay connection shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionStyle {
    Nodes,
    #[default]
    Edges,
}

/// selection settings shared by every builder call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionConfig {
    pub default_mutation_model_fields: Option<Vec<String>>,
    pub model_fields: BTreeMap<String, Vec<String>>,
    pub mutation_input_mode: MutationInputMode,
    pub connection_style: ConnectionStyle,
    pub force_model_output: bool,
}

impl SelectionConfig {
    /// usable in statics
    pub const fn const_default() -> Self {
        Self {
            default_mutation_model_fields: None,
            model_fields: BTreeMap::new(),
            mutation_input_mode: MutationInputMode::Expanded,
            connection_style: ConnectionStyle::Edges,
            force_model_output: false,
        }
    }

    /// fields selected on a mutation's returned model, before id suppression
    pub fn mutation_model_fields(&self, model_key: &str) -> Vec<String> {
        self.model_fields
            .get(model_key)
            .or(self.default_mutation_model_fields.as_ref())
            .cloned()
            .unwrap_or_else(|| vec!["id".to_string()])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputOptions {
    /// sdl schema file
    pub schema: Option<PathBuf>,
    /// introspection json file
    pub introspection: Option<PathBuf>,
    /// graphql endpoint to introspect
    pub endpoint: Option<String>,
    pub headers: BTreeMap<String, String>,
    /// `CleanTable[]` json file
    pub tables: Option<PathBuf>,
    /// operation descriptor json file
    pub gql_map: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentFormat {
    #[default]
    Gql,
    Ts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentsOptions {
    pub format: DocumentFormat,
    pub convention: DocumentConvention,
    pub exclude_patterns: Vec<String>,
}

impl DocumentsOptions {
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && name.contains(pattern.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputOptions {
    pub root: PathBuf,
    pub operations_dir: PathBuf,
    pub sdk_file: PathBuf,
    pub react_query_file: PathBuf,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("graphql/codegen/dist"),
            operations_dir: PathBuf::from("operations"),
            sdk_file: PathBuf::from("sdk.ts"),
            react_query_file: PathBuf::from("react-query.ts"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureOptions {
    pub emit_operations: bool,
    pub emit_sdk: bool,
    pub emit_react_query: bool,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self {
            emit_operations: true,
            emit_sdk: true,
            emit_react_query: true,
        }
    }
}

/// full codegen configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphQLCodegenOptions {
    pub input: InputOptions,
    pub documents: DocumentsOptions,
    pub output: OutputOptions,
    pub features: FeatureOptions,
    pub selection: SelectionConfig,
    pub field_selection: Option<FieldSelection>,
    pub type_name_overrides: TypeNameOverrides,
}

impl GraphQLCodegenOptions {
    /// read a json config file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
