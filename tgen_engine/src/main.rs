//! `tgen` command-line renderer
//!
//! Reads a template file, optionally seeds the render context from a
//! TOML table, and writes the rendered output to stdout or a file.
//!
//! Exit codes: 0 on success, 1 on an engine or I/O failure, 2 on a
//! usage error.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use tgen_engine::config::constants::template::MAX_TEMPLATE_SIZE;
use tgen_engine::logging::{codes, init_global_logging};
use tgen_engine::runtime::{MapValue, NativeMap};
use tgen_engine::{log_error, Template, Value};

const USAGE: &str = "Usage: tgen <template> [--vars <file.toml>] [--out <file>]";

struct CliArgs {
    template: PathBuf,
    vars: Option<PathBuf>,
    out: Option<PathBuf>,
}

impl CliArgs {
    fn parse(args: &[String]) -> Result<CliArgs, String> {
        let mut template = None;
        let mut vars = None;
        let mut out = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--vars" => {
                    let path = iter.next().ok_or("--vars requires a file argument")?;
                    vars = Some(PathBuf::from(path));
                }
                "--out" => {
                    let path = iter.next().ok_or("--out requires a file argument")?;
                    out = Some(PathBuf::from(path));
                }
                flag if flag.starts_with("--") => {
                    return Err(format!("Unknown option '{}'", flag));
                }
                positional => {
                    if template.is_some() {
                        return Err(format!("Unexpected argument '{}'", positional));
                    }
                    template = Some(PathBuf::from(positional));
                }
            }
        }

        Ok(CliArgs {
            template: template.ok_or("Missing template path")?,
            vars,
            out,
        })
    }
}

/// Map a TOML value onto the engine's value model: arrays become native
/// lists, tables become native maps, datetimes print as strings
fn toml_to_value(value: toml::Value) -> Value {
    match value {
        toml::Value::String(text) => Value::Str(text),
        toml::Value::Integer(number) => Value::Int(number),
        toml::Value::Float(number) => Value::Float(number),
        toml::Value::Boolean(flag) => Value::Bool(flag),
        toml::Value::Datetime(stamp) => Value::Str(stamp.to_string()),
        toml::Value::Array(items) => {
            Value::list_from(items.into_iter().map(toml_to_value).collect())
        }
        toml::Value::Table(table) => {
            let mut map = NativeMap::new();
            for (key, entry) in table {
                map.put(key, toml_to_value(entry));
            }
            Value::Map(map.into_shared())
        }
    }
}

fn run(cli: &CliArgs) -> Result<(), String> {
    let metadata = fs::metadata(&cli.template)
        .map_err(|error| format!("Cannot access '{}': {}", cli.template.display(), error))?;
    if metadata.len() > MAX_TEMPLATE_SIZE {
        log_error!(
            codes::template::TEMPLATE_TOO_LARGE,
            "Template exceeds the size limit",
            "size" => metadata.len(),
            "limit" => MAX_TEMPLATE_SIZE
        );
        return Err(format!(
            "Template '{}' exceeds the size limit of {} bytes",
            cli.template.display(),
            MAX_TEMPLATE_SIZE
        ));
    }

    let source = fs::read_to_string(&cli.template).map_err(|error| {
        log_error!(
            codes::template::TEMPLATE_READ_FAILED,
            "Template could not be read",
            "path" => cli.template.display()
        );
        format!("Cannot read '{}': {}", cli.template.display(), error)
    })?;

    let template = Template::parse(&source).map_err(|error| error.to_string())?;
    let ctx = template.new_context();

    if let Some(vars_path) = &cli.vars {
        let vars_text = fs::read_to_string(vars_path)
            .map_err(|error| format!("Cannot read '{}': {}", vars_path.display(), error))?;
        let table: toml::Table = toml::from_str(&vars_text).map_err(|error| {
            log_error!(
                codes::template::VARS_FILE_INVALID,
                "Variables file is not a valid TOML table",
                "path" => vars_path.display()
            );
            format!("Invalid TOML in '{}': {}", vars_path.display(), error)
        })?;
        let mut scope = ctx.borrow_mut();
        for (name, value) in table {
            scope.set(&name, toml_to_value(value));
        }
    }

    template.execute(&ctx).map_err(|error| error.to_string())?;
    let output = ctx.borrow_mut().take_output().unwrap_or_default();

    match &cli.out {
        Some(path) => fs::write(path, output)
            .map_err(|error| format!("Cannot write '{}': {}", path.display(), error))?,
        None => print!("{}", output),
    }
    Ok(())
}

fn main() -> ExitCode {
    let _ = init_global_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match CliArgs::parse(&args) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}
