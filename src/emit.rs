//! document emission
//!
//! renders an [`AstMap`] into output files: one operation file per document,
//! an sdk module of document constants, and a react-query hooks module.
//! nothing touches the filesystem here; [`write_files`] does that.

use crate::builder::{DocumentKind, NamedDocument};
use crate::error::Result;
use crate::generate::AstMap;
use crate::naming::classify;
use crate::options::{DocumentFormat, GraphQLCodegenOptions};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

/// a rendered output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// render every enabled output for the documents not excluded by pattern
pub fn emit_documents(ast_map: &AstMap, options: &GraphQLCodegenOptions) -> Vec<EmittedFile> {
    let documents: Vec<&NamedDocument> = ast_map
        .values()
        .filter(|doc| {
            let excluded = options.documents.is_excluded(&doc.name);
            if excluded {
                debug!(document = doc.name.as_str(), "excluded by pattern");
            }
            !excluded
        })
        .collect();

    let output = &options.output;
    let mut files = Vec::new();

    if options.features.emit_operations {
        let dir = output.root.join(&output.operations_dir);
        for doc in &documents {
            let stem = options.documents.convention.file_stem(&doc.name);
            let (extension, contents) = match options.documents.format {
                DocumentFormat::Gql => ("graphql", doc.print()),
                DocumentFormat::Ts => ("ts", operation_module(doc)),
            };
            files.push(EmittedFile {
                path: dir.join(format!("{stem}.{extension}")),
                contents,
            });
        }
    }

    if options.features.emit_sdk {
        files.push(EmittedFile {
            path: output.root.join(&output.sdk_file),
            contents: sdk_module(&documents),
        });
    }

    if options.features.emit_react_query {
        files.push(EmittedFile {
            path: output.root.join(&output.react_query_file),
            contents: react_query_module(&documents, &output.sdk_file),
        });
    }

    files
}

/// write rendered files, creating parent directories
pub fn write_files(files: &[EmittedFile]) -> Result<()> {
    for file in files {
        if let Some(parent) = file.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file.path, &file.contents)?;
        debug!(path = %file.path.display(), "wrote file");
    }
    Ok(())
}

fn document_const(doc: &NamedDocument) -> String {
    format!("{}Document", doc.name)
}

fn operation_module(doc: &NamedDocument) -> String {
    format!(
        "import gql from 'graphql-tag';\n\nexport const {} = gql`\n{}`;\n",
        document_const(doc),
        doc.print()
    )
}

fn sdk_module(documents: &[&NamedDocument]) -> String {
    let mut out = String::from("/* generated by graphile-codegen, do not edit */\n");
    for doc in documents {
        let _ = write!(
            out,
            "\nexport const {} = /* GraphQL */ `\n{}`;\n",
            document_const(doc),
            doc.print()
        );
    }
    out
}

fn react_query_module(documents: &[&NamedDocument], sdk_file: &Path) -> String {
    let sdk = sdk_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sdk".to_string());

    let mut out = String::from("/* generated by graphile-codegen, do not edit */\n");
    out.push_str("import { useMutation, useQuery } from '@tanstack/react-query';\n");
    out.push_str("import type { GraphQLClient } from 'graphql-request';\n");
    let _ = writeln!(out, "import * as Documents from './{sdk}';");

    for doc in documents {
        let hook = format!("use{}", classify(&doc.name));
        let document = format!("Documents.{}", document_const(doc));
        match doc.kind() {
            DocumentKind::Query => {
                let _ = write!(
                    out,
                    "\nexport function {hook}(client: GraphQLClient, variables?: Record<string, unknown>) {{\n  return useQuery({{\n    queryKey: ['{name}', variables],\n    queryFn: () => client.request({document}, variables),\n  }});\n}}\n",
                    name = doc.name,
                );
            }
            DocumentKind::Mutation => {
                let _ = write!(
                    out,
                    "\nexport function {hook}(client: GraphQLClient) {{\n  return useMutation({{\n    mutationFn: (variables: Record<string, unknown>) => client.request({document}, variables),\n  }});\n}}\n",
                );
            }
            DocumentKind::Fragment => {}
        }
    }
    out
}
