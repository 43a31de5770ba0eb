//! graphql operation codegen for postgraphile-style schemas
//!
//! this crate turns operation descriptors ([`GqlMap`]) into graphql
//! documents: `getOne`/`getMany` queries with relay pagination, and
//! create/patch/delete/custom mutations whose variable types come from the
//! introspected schema when one is available. start with [`generate`] and a
//! [`BuildContext`], then render files with [`emit_documents`].
//!
//! ## quick start
//!
//! ```
//! use graphile_codegen::{generate, BuildContext, GqlMap};
//!
//! let map: GqlMap = serde_json::from_value(serde_json::json!({
//!     "users": {"qtype": "getMany", "model": "User", "selection": ["id", "email"]}
//! }))
//! .unwrap();
//! let out = generate(&map, &BuildContext::default());
//! assert!(out.ast_map.contains_key("getUsersQuery"));
//! ```
//!
//! ## schema sources
//!
//! descriptors can be derived from table metadata with
//! [`gql_map_from_tables`]. exact variable types come from a
//! [`TypeRegistry`], built from sdl, an introspection json file, or a live
//! endpoint through [`IntrospectionClient`].

pub mod ast;
pub mod builder;
mod client;
mod config;
pub mod custom_ast;
mod diagnostics;
mod emit;
mod error;
mod generate;
mod gql_map;
mod graphql;
mod introspection;
pub mod naming;
mod options;
mod registry;
pub mod resolve;
mod schema;
mod selection;

pub use builder::{BuildContext, BuildSkip, DocumentKind, NamedDocument};
pub use client::IntrospectionClient;
pub use config::ClientConfig;
pub use diagnostics::{Diagnostic, Severity};
pub use emit::{emit_documents, write_files, EmittedFile};
pub use error::{Error, Result};
pub use generate::{generate, generate_granular, AstMap, GenerateOutput};
pub use gql_map::{
    gql_map_from_tables, operation_names, GqlField, GqlMap, MutationKind, NestedSelection,
    Operation, OutputSpec, PropertySpec, SelectionItem, TypedSelection, NON_MUTABLE_PROPS,
};
pub use graphql::{GraphQlError, GraphQlResponse};
pub use introspection::{parse_introspection, IntrospectionSchema, INTROSPECTION_QUERY};
pub use options::{
    ConnectionStyle, DocumentFormat, DocumentsOptions, FeatureOptions, GraphQLCodegenOptions,
    InputOptions, MutationInputMode, OutputOptions, SelectionConfig,
};
pub use registry::{ResolvedField, ResolvedInputField, ResolvedType, TypeIndex, TypeRegistry};
pub use schema::{
    BelongsToRelation, CleanField, CleanFieldType, CleanRelations, CleanTable, CleanTypeRef,
    HasRelation, ManyToManyRelation, QueryNames, RelationKind, RelationRef, TypeKind,
};
pub use selection::{
    convert_to_selection_options, validate_field_selection, FieldSelection, IncludeSpec,
    SelectionOptions, SelectionPreset, SelectionValue, SimpleFieldSelection, ValidationResult,
};
