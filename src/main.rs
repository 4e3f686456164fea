//! json-kv command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use json_kv::config::{LogFormat, LoggingConfig};
use json_kv::kv::Param;
use json_kv::{Backend, KvError, Operation, Store, StoreConfig};

#[derive(Parser)]
#[command(name = "json-kv")]
#[command(about = "JSON key-value store over an embedded database", version)]
struct Cli {
    /// Database file (sqlite) or directory (fjall)
    #[arg(long, global = true, env = "JSON_KV_PATH")]
    path: Option<PathBuf>,

    /// Storage engine
    #[arg(long, global = true, value_enum, env = "JSON_KV_BACKEND")]
    backend: Option<Backend>,

    /// TOML configuration file
    #[arg(short, long, global = true, env = "JSON_KV_CONFIG")]
    config: Option<PathBuf>,

    /// Print results on a single line
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a store operation by name or alias
    Run {
        /// Operation name, e.g. `get`, `add`, `fetchAll`
        operation: String,

        /// Positional arguments. Values and elements are parsed as JSON,
        /// falling back to a plain string.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// List operations, their parameters and aliases
    Operations,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::default(),
    };
    if let Some(path) = cli.path {
        config.path = path;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    init_tracing(&config.logging);

    match cli.command {
        Commands::Operations => {
            for operation in Operation::ALL {
                println!("{}", describe(operation));
            }
        }
        Commands::Run { operation, args } => {
            let resolved = Operation::resolve(&operation)
                .ok_or_else(|| KvError::UnknownOperation(operation.clone()))?;
            let args = convert_args(resolved, &args);

            let store = Store::open(&config).await?;
            let result = store.run(resolved, &args).await;
            store.close().await?;

            match result? {
                Some(value) if cli.compact => println!("{}", serde_json::to_string(&value)?),
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => println!("undefined"),
            }
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match logging.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Turn raw command-line text into the JSON arguments `operation` expects.
fn convert_args(operation: Operation, args: &[String]) -> Vec<Value> {
    let params = operation.params();
    args.iter()
        .enumerate()
        .map(|(index, raw)| match params.get(index) {
            Some(Param::Value | Param::Element) => parse_json_or_string(raw),
            Some(Param::Amount) => parse_number_or_string(raw),
            _ => Value::String(raw.clone()),
        })
        .collect()
}

fn parse_json_or_string(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_number_or_string(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Number(_)) => value,
        _ => Value::String(raw.to_string()),
    }
}

fn describe(operation: Operation) -> String {
    let params: Vec<&str> = operation
        .params()
        .iter()
        .map(|param| match param {
            Param::Key => "<key>",
            Param::Pattern => "<pattern>",
            Param::Value => "<value>",
            Param::Element => "<element>",
            Param::Amount => "<amount>",
            Param::Operator => "<operator>",
            Param::Predicate => "<predicate>",
            Param::Filename => "[filename]",
        })
        .collect();
    let aliases: Vec<&str> = operation.aliases().collect();

    let mut line = operation.name().to_string();
    if !params.is_empty() {
        line.push(' ');
        line.push_str(&params.join(" "));
    }
    if !aliases.is_empty() {
        line.push_str(&format!("  (aliases: {})", aliases.join(", ")));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_values_parse_as_json() {
        let args = convert_args(
            Operation::Set,
            &["user1".to_string(), r#"{"name":"ada"}"#.to_string()],
        );
        assert_eq!(args, vec![json!("user1"), json!({"name": "ada"})]);
    }

    #[test]
    fn test_unparseable_values_fall_back_to_strings() {
        let args = convert_args(Operation::Push, &["tags".to_string(), "rust".to_string()]);
        assert_eq!(args, vec![json!("tags"), json!("rust")]);
    }

    #[test]
    fn test_keys_stay_strings() {
        let args = convert_args(Operation::Get, &["42".to_string()]);
        assert_eq!(args, vec![json!("42")]);
    }

    #[test]
    fn test_amounts_must_be_numbers() {
        let args = convert_args(
            Operation::Math,
            &["n".to_string(), "-2.5".to_string(), "*".to_string()],
        );
        assert_eq!(args, vec![json!("n"), json!(-2.5), json!("*")]);

        let args = convert_args(Operation::Add, &["n".to_string(), "true".to_string()]);
        assert_eq!(args, vec![json!("n"), json!("true")]);
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(Operation::Has), "has <key>  (aliases: exists, includes)");
        assert_eq!(describe(Operation::Last), "last");
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from(["json-kv", "--backend", "memory", "run", "add", "n", "-1"]);
        assert!(cli.is_ok_and(|cli| matches!(
            cli.command,
            Commands::Run { ref operation, ref args } if operation == "add" && args == &["n", "-1"]
        )));
    }
}
