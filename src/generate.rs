//! generation entry points
//!
//! [`generate`] walks a [`GqlMap`] and dispatches each descriptor to its
//! builders. a descriptor that cannot be built is skipped with a diagnostic;
//! generation itself never fails.

use crate::builder::{
    create_mutation, create_one, delete_one, get_fragment, get_many, get_many_paginated_edges,
    get_many_paginated_nodes, get_one, get_order_by_enums, patch_one, BuildContext, BuildSkip,
    NamedDocument,
};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::gql_map::{GqlField, GqlMap, MutationKind, Operation};
use crate::naming::query_document_name;
use crate::options::ConnectionStyle;
use indexmap::IndexMap;
use tracing::debug;

/// document key -> document
pub type AstMap = IndexMap<String, NamedDocument>;

#[derive(Debug, Default)]
pub struct GenerateOutput {
    pub ast_map: AstMap,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Default)]
struct Collector {
    ast_map: AstMap,
    diagnostics: Diagnostics,
}

impl Collector {
    fn insert(&mut self, operation: &str, key: String, doc: NamedDocument) {
        if let Some(previous) = self.ast_map.insert(key.clone(), doc) {
            self.diagnostics.warn(
                operation,
                format!("document `{key}` replaces an earlier `{}`", previous.name),
            );
        }
    }

    fn query(&mut self, operation: &str, key: String, doc: Option<NamedDocument>) {
        match doc {
            Some(doc) => self.insert(operation, key, doc),
            None => self
                .diagnostics
                .info(operation, format!("`{key}` selects nothing, skipped")),
        }
    }

    fn mutation(&mut self, operation: &str, result: Result<NamedDocument, BuildSkip>) {
        match result {
            Ok(doc) => {
                if doc.raw_input {
                    self.diagnostics
                        .info(operation, "input types unresolved, using `$input`");
                }
                self.insert(operation, doc.name.clone(), doc);
            }
            Err(skip) => self.diagnostics.warn(operation, skip.to_string()),
        }
    }

    fn finish(self) -> GenerateOutput {
        GenerateOutput {
            ast_map: self.ast_map,
            diagnostics: self.diagnostics.into_vec(),
        }
    }
}

/// build documents for every descriptor in `gql_map`
///
/// a `getMany` descriptor fans out into the plain edges query, a paginated
/// query, the order-by enum lookup, and a model fragment.
pub fn generate(gql_map: &GqlMap, ctx: &BuildContext<'_>) -> GenerateOutput {
    let mut collector = Collector::default();
    for (operation, descriptor) in gql_map {
        debug!(operation = operation.as_str(), qtype = descriptor.qtype.as_str(), "generating");
        match descriptor.operation() {
            Some(Operation::GetOne) => {
                query_one(&mut collector, operation, descriptor, &[], ctx);
            }
            Some(Operation::GetMany) => {
                query_many(&mut collector, operation, descriptor, &[], ctx);
            }
            Some(Operation::Mutation(kind)) => {
                let result = match kind {
                    MutationKind::Create => create_one(operation, descriptor, ctx),
                    MutationKind::Patch => patch_one(operation, descriptor, ctx),
                    MutationKind::Delete => delete_one(operation, descriptor, ctx),
                    MutationKind::Custom => create_mutation(operation, descriptor, ctx),
                };
                collector.mutation(operation, result);
            }
            None => collector.diagnostics.warn(
                operation,
                format!("unsupported qtype `{}`, skipped", descriptor.qtype),
            ),
        }
    }
    collector.finish()
}

/// query documents for one model, narrowed to `fields`
///
/// only `getOne`/`getMany` descriptors whose model matches are considered.
pub fn generate_granular(
    gql_map: &GqlMap,
    model: &str,
    fields: &[String],
    ctx: &BuildContext<'_>,
) -> GenerateOutput {
    let mut collector = Collector::default();
    for (operation, descriptor) in gql_map {
        if !descriptor.model.eq_ignore_ascii_case(model) {
            continue;
        }
        match descriptor.operation() {
            Some(Operation::GetOne) => {
                query_one(&mut collector, operation, descriptor, fields, ctx);
            }
            Some(Operation::GetMany) => {
                query_many(&mut collector, operation, descriptor, fields, ctx);
            }
            _ => {}
        }
    }
    collector.finish()
}

fn query_one(
    collector: &mut Collector,
    operation: &str,
    descriptor: &GqlField,
    fields: &[String],
    ctx: &BuildContext<'_>,
) {
    let doc = get_one(operation, descriptor, fields, ctx);
    let key = doc
        .as_ref()
        .map_or_else(|| query_document_name(operation), |doc| doc.name.clone());
    collector.query(operation, key, doc);
}

fn query_many(
    collector: &mut Collector,
    operation: &str,
    descriptor: &GqlField,
    fields: &[String],
    ctx: &BuildContext<'_>,
) {
    let many = get_many(operation, descriptor, fields, ctx);
    let paginated = match ctx.selection.connection_style {
        ConnectionStyle::Edges => get_many_paginated_edges(operation, descriptor, fields, ctx),
        ConnectionStyle::Nodes => get_many_paginated_nodes(operation, descriptor, fields, ctx),
    };
    let order_by = get_order_by_enums(operation);
    let fragment = get_fragment(descriptor, fields, ctx);

    if many.is_none() {
        collector
            .diagnostics
            .info(operation, "connection selects nothing, only order-by enums emitted");
    }
    for doc in [many, paginated, Some(order_by), fragment].into_iter().flatten() {
        collector.insert(operation, doc.name.clone(), doc);
    }
}
