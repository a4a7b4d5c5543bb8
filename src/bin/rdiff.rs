//! rdiff - Resource diff CLI tool
//!
//! Diffs resource argument documents (YAML or JSON), applies ignore-changes
//! paths and inspects schemas and property paths.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use resource_diff::diff::{diff, diff_trees, DiffResult};
use resource_diff::fieldpath::PropertyPath;
use resource_diff::ignore::apply_ignore_changes;
use resource_diff::schema::{ObjectSchema, SchemaDocument, Shape};
use resource_diff::typed::ArgsValue;
use resource_diff::value::{self, Value};

#[derive(Parser)]
#[command(name = "rdiff", about = "Structural diffs of resource arguments", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output location. Use '-' for stdout
    #[arg(short, long, global = true, default_value = "-")]
    output: String,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Command {
    /// Diff two argument documents
    Diff(DiffArgs),
    /// Pin ignored paths of the new document to their current values
    IgnoreChanges(IgnoreArgs),
    /// List the described fields of a schema type
    Describe(DescribeArgs),
    /// Parse property paths and print their canonical form
    Path(PathArgs),
}

#[derive(Args)]
struct SchemaArgs {
    /// Path to a schema document. Without one every key is compared and
    /// nothing is immutable
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Name of the type in the schema to use (default: the first one)
    #[arg(short = 't', long = "type")]
    type_name: Option<String>,
}

#[derive(Args)]
struct DiffArgs {
    #[command(flatten)]
    schema: SchemaArgs,

    #[arg(long)]
    current: PathBuf,

    #[arg(long)]
    new: PathBuf,

    /// Property path whose changes are not reported (repeatable)
    #[arg(short, long = "ignore")]
    ignore: Vec<String>,
}

#[derive(Args)]
struct IgnoreArgs {
    #[arg(long)]
    current: PathBuf,

    #[arg(long)]
    new: PathBuf,

    /// Property path to pin (repeatable)
    #[arg(short, long = "ignore", required = true)]
    ignore: Vec<String>,
}

#[derive(Args)]
struct DescribeArgs {
    #[arg(short, long)]
    schema: PathBuf,

    /// Only describe this type
    #[arg(short = 't', long = "type")]
    type_name: Option<String>,
}

#[derive(Args)]
struct PathArgs {
    /// Reject a '.' directly followed by '['
    #[arg(long)]
    strict: bool,

    #[arg(required = true)]
    paths: Vec<String>,
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    let mut output: Box<dyn Write> = if cli.output == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(
            fs::File::create(&cli.output).with_context(|| format!("failed to create output file {:?}", cli.output))?,
        )
    };

    match cli.command {
        Command::Diff(args) => run_diff(args, cli.format, &mut output),
        Command::IgnoreChanges(args) => run_ignore_changes(args, cli.format, &mut output),
        Command::Describe(args) => run_describe(args, cli.format, &mut output),
        Command::Path(args) => run_path(args, cli.format, &mut output),
    }
}

fn run_diff(args: DiffArgs, format: OutputFormat, output: &mut dyn Write) -> anyhow::Result<()> {
    let current = read_document(&args.current)?;
    let new = read_document(&args.new)?;

    let result = match load_schema(&args.schema)? {
        Some(schema) => diff(
            &ArgsValue::new(current, schema.clone()),
            &ArgsValue::new(new, schema),
            args.ignore.as_slice(),
        )?,
        None => diff_trees(&current, &new, &Shape::Any, args.ignore.as_slice())?,
    };

    match format {
        OutputFormat::Text => write_diff_text(&result, output)?,
        _ => write_serialized(&result, format, output)?,
    }
    Ok(())
}

fn write_diff_text(result: &DiffResult, output: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(output, "{}", result)?;
    if result.requires_replace() {
        writeln!(output, "\nReplacement required by: {}", result.replaces().join(", "))?;
    }
    Ok(())
}

fn run_ignore_changes(args: IgnoreArgs, format: OutputFormat, output: &mut dyn Write) -> anyhow::Result<()> {
    let current = read_document(&args.current)?;
    let new = read_document(&args.new)?;
    let pinned = apply_ignore_changes(&current, &new, args.ignore.as_slice())?;

    match format {
        OutputFormat::Json => write_serialized(&pinned, format, output),
        _ => write_serialized(&pinned, OutputFormat::Yaml, output),
    }
}

#[derive(Serialize)]
struct FieldRow<'a> {
    name: &'a str,
    field: &'a str,
    shape: String,
    required: bool,
    immutable: bool,
    deprecated: bool,
    secret: bool,
}

#[derive(Serialize)]
struct TypeRows<'a> {
    name: &'a str,
    fields: Vec<FieldRow<'a>>,
}

fn run_describe(args: DescribeArgs, format: OutputFormat, output: &mut dyn Write) -> anyhow::Result<()> {
    let document = read_schema_document(&args.schema)?;
    let names: Vec<String> = match args.type_name {
        Some(name) => vec![name],
        None => document.type_names().into_iter().map(str::to_string).collect(),
    };

    let schemas = names
        .iter()
        .map(|name| document.compile(name).with_context(|| format!("failed to compile type {}", name)))
        .collect::<anyhow::Result<Vec<Arc<ObjectSchema>>>>()?;

    let types: Vec<TypeRows<'_>> = schemas
        .iter()
        .map(|schema| TypeRows {
            name: schema.type_name(),
            fields: schema
                .fields()
                .iter()
                .map(|f| FieldRow {
                    name: &f.name,
                    field: &f.field,
                    shape: f.shape.to_string(),
                    required: f.required,
                    immutable: f.immutable,
                    deprecated: f.deprecated,
                    secret: f.secret,
                })
                .collect(),
        })
        .collect();

    if format != OutputFormat::Text {
        return write_serialized(&types, format, output);
    }
    for t in &types {
        writeln!(output, "{}:", t.name)?;
        for f in &t.fields {
            let mut flags = vec![if f.required { "required" } else { "optional" }];
            if f.immutable {
                flags.push("immutable");
            }
            if f.deprecated {
                flags.push("deprecated");
            }
            if f.secret {
                flags.push("secret");
            }
            writeln!(output, "  {} ({}) {} [{}]", f.name, f.field, f.shape, flags.join(", "))?;
        }
    }
    Ok(())
}

fn run_path(args: PathArgs, format: OutputFormat, output: &mut dyn Write) -> anyhow::Result<()> {
    let mut canonical = Vec::with_capacity(args.paths.len());
    for raw in &args.paths {
        let parsed = if args.strict {
            PropertyPath::parse_strict(raw)
        } else {
            PropertyPath::parse(raw)
        };
        let path = parsed.with_context(|| format!("invalid property path {:?}", raw))?;
        canonical.push(path.to_string());
    }

    if format != OutputFormat::Text {
        return write_serialized(&canonical, format, output);
    }
    for path in canonical {
        writeln!(output, "{}", path)?;
    }
    Ok(())
}

fn load_schema(args: &SchemaArgs) -> anyhow::Result<Option<Arc<ObjectSchema>>> {
    let Some(path) = &args.schema else {
        if args.type_name.is_some() {
            bail!("--type requires --schema");
        }
        return Ok(None);
    };
    let document = read_schema_document(path)?;
    let name = match &args.type_name {
        Some(name) => name.clone(),
        None => document
            .type_names()
            .first()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("no types found in schema {:?}", path))?,
    };
    let schema = document
        .compile(&name)
        .with_context(|| format!("failed to compile type {}", name))?;
    Ok(Some(schema))
}

fn read_schema_document(path: &Path) -> anyhow::Result<SchemaDocument> {
    let content = fs::read_to_string(path).with_context(|| format!("failed to read schema file {:?}", path))?;
    SchemaDocument::from_yaml(&content).with_context(|| format!("failed to parse schema file {:?}", path))
}

/// Reads a JSON document if the file name ends in `.json`, YAML otherwise.
fn read_document(path: &Path) -> anyhow::Result<Value> {
    let content = fs::read_to_string(path).with_context(|| format!("failed to read file {:?}", path))?;
    let parsed = if path.extension().is_some_and(|ext| ext == "json") {
        value::from_json(&content).map_err(anyhow::Error::from)
    } else {
        value::from_yaml(&content).map_err(anyhow::Error::from)
    };
    parsed.with_context(|| format!("failed to parse file {:?}", path))
}

fn write_serialized<T: Serialize + ?Sized>(
    data: &T,
    format: OutputFormat,
    output: &mut dyn Write,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => writeln!(output, "{}", serde_json::to_string_pretty(data)?)?,
        _ => write!(output, "{}", serde_yaml::to_string(data)?)?,
    }
    Ok(())
}
