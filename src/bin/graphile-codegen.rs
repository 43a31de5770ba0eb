//! generate graphql documents for a postgraphile-style schema
//!
//! this binary reads table metadata and/or operation descriptors, optionally
//! loads the schema for exact variable types, and writes:
//! - one document per operation under the operations directory
//! - an sdk module exporting every document
//! - react-query hooks wrapping the sdk
//!
//! command help reference (kept in sync with `graphile-codegen --help`):
#[doc = concat!("```text\n", include_str!("graphile-codegen-help.txt"), "\n```")]
pub const CLI_HELP: &str = include_str!("graphile-codegen-help.txt");

use graphile_codegen::{
    emit_documents, generate, generate_granular, gql_map_from_tables, validate_field_selection,
    write_files, BuildContext, CleanTable, ClientConfig, Error, GqlMap, GraphQLCodegenOptions,
    InputOptions, IntrospectionClient, Result, TypeRegistry,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    tables: Option<PathBuf>,
    gql_map: Option<PathBuf>,
    schema: Option<PathBuf>,
    introspection: Option<PathBuf>,
    endpoint: Option<String>,
    token: Option<String>,
    model: Option<String>,
    fields: Vec<String>,
    out_dir: Option<PathBuf>,
}

enum ParseArgsError {
    Help,
    Message(String),
}

#[tokio::main]
async fn main() {
    let args = match parse_args(std::env::args().collect()) {
        Ok(args) => args,
        Err(ParseArgsError::Help) => {
            print!("{CLI_HELP}");
            return;
        }
        Err(ParseArgsError::Message(err)) => {
            eprintln!("{err}\n\n{CLI_HELP}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(args).await {
        error!("codegen failed: {err}");
        std::process::exit(1);
    }
}

fn parse_args(args: Vec<String>) -> std::result::Result<Args, ParseArgsError> {
    let mut parsed = Args::default();

    let mut iter = args.into_iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => parsed.config = iter.next().map(PathBuf::from),
            "--tables" => parsed.tables = iter.next().map(PathBuf::from),
            "--gql-map" => parsed.gql_map = iter.next().map(PathBuf::from),
            "--schema" => parsed.schema = iter.next().map(PathBuf::from),
            "--introspection" => parsed.introspection = iter.next().map(PathBuf::from),
            "--endpoint" => parsed.endpoint = iter.next(),
            "--token" => parsed.token = iter.next(),
            "--model" => parsed.model = iter.next(),
            "--fields" => {
                parsed.fields = iter
                    .next()
                    .map(|list| {
                        list.split(',')
                            .map(str::trim)
                            .filter(|field| !field.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default()
            }
            "--out" => parsed.out_dir = iter.next().map(PathBuf::from),
            "--help" | "-h" => return Err(ParseArgsError::Help),
            _ => return Err(ParseArgsError::Message(format!("unknown argument: {arg}"))),
        }
    }

    if parsed.config.is_none() && parsed.tables.is_none() && parsed.gql_map.is_none() {
        return Err(ParseArgsError::Message(
            "--tables, --gql-map, or --config is required".to_string(),
        ));
    }

    let schema_sources = [
        parsed.schema.is_some(),
        parsed.introspection.is_some(),
        parsed.endpoint.is_some(),
    ];
    if schema_sources.iter().filter(|given| **given).count() > 1 {
        return Err(ParseArgsError::Message(
            "use only one of --schema, --introspection, --endpoint".to_string(),
        ));
    }

    if !parsed.fields.is_empty() && parsed.model.is_none() {
        return Err(ParseArgsError::Message(
            "--fields requires --model".to_string(),
        ));
    }

    Ok(parsed)
}

/// config file values with command-line flags applied on top
fn resolve_options(args: &Args) -> Result<GraphQLCodegenOptions> {
    let mut options = match &args.config {
        Some(path) => GraphQLCodegenOptions::load(path)?,
        None => GraphQLCodegenOptions::default(),
    };

    let input = &mut options.input;
    if args.tables.is_some() {
        input.tables = args.tables.clone();
    }
    if args.gql_map.is_some() {
        input.gql_map = args.gql_map.clone();
    }
    if args.schema.is_some() || args.introspection.is_some() || args.endpoint.is_some() {
        input.schema = args.schema.clone();
        input.introspection = args.introspection.clone();
        input.endpoint = args.endpoint.clone();
    }
    if let Some(out_dir) = &args.out_dir {
        options.output.root = out_dir.clone();
    }

    Ok(options)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .map_err(|err| Error::Config(format!("failed to read {}: {err}", path.display())))?;
    Ok(serde_json::from_str(&text)?)
}

async fn load_registry(input: &InputOptions, token: Option<&str>) -> Result<Option<TypeRegistry>> {
    if let Some(path) = &input.schema {
        let sdl = fs::read_to_string(path)?;
        return TypeRegistry::from_sdl(&sdl).map(Some);
    }

    if let Some(path) = &input.introspection {
        let value: serde_json::Value = read_json(path)?;
        return TypeRegistry::from_introspection(value).map(Some);
    }

    if let Some(endpoint) = &input.endpoint {
        let mut config = ClientConfig::new(endpoint).with_header_pairs(&input.headers)?;
        if let Some(token) = token {
            config = config.with_token(token);
        }
        let client = IntrospectionClient::new(config)?;
        return client.fetch_registry().await.map(Some);
    }

    Ok(None)
}

fn load_gql_map(options: &GraphQLCodegenOptions) -> Result<GqlMap> {
    let mut map = GqlMap::new();

    if let Some(path) = &options.input.tables {
        let tables: Vec<CleanTable> = read_json(path)?;
        if let Some(selection) = &options.field_selection {
            for table in &tables {
                let result = validate_field_selection(selection, table);
                for problem in result.errors {
                    warn!(table = table.name.as_str(), "{problem}");
                }
            }
        }
        map.extend(gql_map_from_tables(&tables, options.field_selection.as_ref()));
    }

    if let Some(path) = &options.input.gql_map {
        let descriptors: GqlMap = read_json(path)?;
        map.extend(descriptors);
    }

    if map.is_empty() {
        return Err(Error::Config(
            "no operations found: set input.tables or input.gqlMap".to_string(),
        ));
    }
    Ok(map)
}

async fn run(args: Args) -> Result<()> {
    let options = resolve_options(&args)?;
    let registry = load_registry(&options.input, args.token.as_deref()).await?;
    let gql_map = load_gql_map(&options)?;
    info!(operations = gql_map.len(), "loaded operation descriptors");

    let mut ctx = BuildContext::new(&options.selection).with_overrides(&options.type_name_overrides);
    if let Some(registry) = &registry {
        info!(types = registry.len(), "using schema types");
        ctx = ctx.with_type_index(registry);
    }

    let output = match &args.model {
        Some(model) => generate_granular(&gql_map, model, &args.fields, &ctx),
        None => generate(&gql_map, &ctx),
    };

    let files = emit_documents(&output.ast_map, &options);
    write_files(&files)?;
    info!(
        documents = output.ast_map.len(),
        files = files.len(),
        diagnostics = output.diagnostics.len(),
        root = %options.output.root.display(),
        "codegen complete"
    );
    Ok(())
}
