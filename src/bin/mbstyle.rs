use std::path::Path;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mbstyle", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Type-check an expression for a property and print its classification.
    Check(Target),
    /// Evaluate an expression at a zoom level, optionally against a feature.
    Eval(EvalArgs),
}

#[derive(Args, Debug)]
struct Target {
    /// Expression JSON, or `@path` to read it from a file.
    #[arg(long)]
    expr: String,

    /// Name of a property in the built-in catalog.
    #[arg(long, required_unless_present = "spec", conflicts_with = "spec")]
    property: Option<String>,

    /// Property spec JSON, or `@path`.
    #[arg(long)]
    spec: Option<String>,
}

#[derive(Args, Debug)]
struct EvalArgs {
    #[command(flatten)]
    target: Target,

    /// Zoom level.
    #[arg(long, default_value_t = 0.0)]
    zoom: f64,

    /// Feature JSON (`{"properties": {..}, "type": .., "id": ..}`), or `@path`.
    #[arg(long)]
    feature: Option<String>,

    /// Report runtime errors instead of falling back to the property default.
    #[arg(long)]
    strict: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(target) => cmd_check(&target),
        Command::Eval(args) => cmd_eval(&args),
    }
}

/// Inline JSON, or the contents of the file named after a leading `@`.
fn read_json(arg: &str, what: &str) -> anyhow::Result<serde_json::Value> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("read {what} file '{path}'"))?,
        None => arg.to_owned(),
    };
    serde_json::from_str(&text).with_context(|| format!("parse {what} JSON"))
}

fn resolve_spec(target: &Target) -> anyhow::Result<mbstyle::PropertySpec> {
    if let Some(name) = &target.property {
        let catalog = mbstyle::PropertyCatalog::builtin()?;
        return catalog
            .get(name)
            .cloned()
            .with_context(|| format!("unknown property '{name}'"));
    }
    let spec = target.spec.as_deref().context("--property or --spec is required")?;
    serde_json::from_value(read_json(spec, "spec")?).context("invalid property spec")
}

fn compile(
    target: &Target,
    options: &mbstyle::ExpressionOptions,
) -> anyhow::Result<mbstyle::PropertyExpression> {
    let spec = resolve_spec(target)?;
    let value = read_json(&target.expr, "expression")?;
    let expression = mbstyle::normalize_property_value(&value, &spec)?;
    match mbstyle::create_property_expression(&expression, &spec, options) {
        Ok(compiled) => Ok(compiled),
        Err(errors) => {
            let listed: Vec<serde_json::Value> = errors
                .iter()
                .map(|e| serde_json::json!({"key": e.key, "message": e.message}))
                .collect();
            println!("{}", serde_json::to_string_pretty(&listed)?);
            anyhow::bail!("expression has {} error(s)", errors.len())
        }
    }
}

fn cmd_check(target: &Target) -> anyhow::Result<()> {
    let compiled = compile(target, &mbstyle::ExpressionOptions::default())?;
    let stops: Vec<serde_json::Value> = compiled
        .zoom_stops()
        .iter()
        .map(|&z| {
            let stop = mbstyle::Value::Number(z);
            if z.is_finite() {
                stop.to_json()
            } else {
                serde_json::Value::String(stop.to_string())
            }
        })
        .collect();
    let report = serde_json::json!({
        "kind": compiled.kind(),
        "type": compiled.expression().expression().ty().to_string(),
        "zoomStops": stops,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_eval(args: &EvalArgs) -> anyhow::Result<()> {
    let options = if args.strict {
        mbstyle::ExpressionOptions::strict()
    } else {
        mbstyle::ExpressionOptions::default()
    };
    let compiled = compile(&args.target, &options)?;
    let feature: Option<mbstyle::Feature> = args
        .feature
        .as_deref()
        .map(|f| read_json(f, "feature"))
        .transpose()?
        .map(serde_json::from_value)
        .transpose()
        .context("invalid feature")?;

    let globals = mbstyle::Globals::at_zoom(args.zoom);
    let value = compiled.evaluate(&globals, feature.as_ref())?;
    println!("{}", value.to_json());
    Ok(())
}
