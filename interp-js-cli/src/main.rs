use anyhow::anyhow;
use anyhow::Context;
use clap::Parser;
use interp_js::write_json;
use interp_js::ConsoleSink;
use interp_js::Globals;
use interp_js::Runtime;
use interp_js::RunError;
use interp_js::RuntimeOptions;
use interp_js::Value;
use interp_js::DEFAULT_MAX_CALL_DEPTH;
use parse_script_js::parse;
use std::fs;
use std::io::stdin;
use std::io::stdout;
use std::io::Read;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "interp-js", about = "Runs a script and prints its module.exports as JSON")]
struct Cli {
  /// Script to run; omit for stdin.
  input: Option<PathBuf>,

  /// Print the parsed syntax tree as JSON instead of running.
  #[arg(long)]
  ast: bool,

  /// Extra global binding, as NAME=JSON. May be repeated; the first binding of a name wins.
  #[arg(short, long = "global", value_name = "NAME=JSON", value_parser = parse_global)]
  globals: Vec<(String, serde_json::Value)>,

  /// Indent the JSON output.
  #[arg(long)]
  pretty: bool,

  /// Log interpreter events to stderr. Filter with `RUST_LOG`.
  #[arg(long)]
  trace: bool,

  /// Maximum nesting of script function calls.
  #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
  max_call_depth: usize,
}

fn parse_global(raw: &str) -> Result<(String, serde_json::Value), String> {
  let (name, json) = raw
    .split_once('=')
    .ok_or_else(|| format!("expected NAME=JSON, got '{raw}'"))?;
  if name.is_empty() {
    return Err("global name is empty".to_string());
  }
  let value = serde_json::from_str(json).map_err(|err| format!("invalid JSON for '{name}': {err}"))?;
  Ok((name.to_string(), value))
}

fn install_subscriber(trace: bool) {
  if !trace {
    return;
  }
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .try_init();
}

fn read_source(input: Option<&PathBuf>) -> anyhow::Result<String> {
  match input {
    Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display())),
    None => {
      let mut source = String::new();
      stdin()
        .read_to_string(&mut source)
        .context("failed to read stdin")?;
      Ok(source)
    }
  }
}

fn execute(args: Cli) -> anyhow::Result<String> {
  let source = read_source(args.input.as_ref())?;
  let indent = if args.pretty { "  " } else { "" };

  if args.ast {
    let parsed = parse(&source).map_err(|err| anyhow!("syntax error: {}", err.describe(&source)))?;
    let json = serde_json::to_value(&parsed).context("failed to serialize syntax tree")?;
    return Ok(write_json(&json, indent));
  }

  let options = RuntimeOptions::default()
    .with_console(ConsoleSink::Stdout)
    .with_max_call_depth(args.max_call_depth);
  let globals: Globals = args
    .globals
    .iter()
    .map(|(name, json)| (name.clone(), Value::from_json(json)))
    .collect();
  tracing::debug!(globals = globals.len(), "running script");
  // RunError holds script values, which are not thread-safe, so it's rendered here.
  let exports = Runtime::new(options)
    .run(&source, globals)
    .map_err(|err| match err {
      RunError::Syntax(err) => anyhow!("syntax error: {}", err.describe(&source)),
      err => anyhow!("{err}"),
    })?;
  Ok(write_json(&exports.to_json(), indent))
}

fn main() {
  let args = Cli::parse();
  install_subscriber(args.trace);
  match execute(args) {
    Ok(output) => {
      let mut out = stdout().lock();
      if let Err(err) = writeln!(out, "{output}") {
        eprintln!("error: failed to write output: {err}");
        process::exit(1);
      }
    }
    Err(err) => {
      eprintln!("error: {err:#}");
      process::exit(1);
    }
  }
}
