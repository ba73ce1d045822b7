use std::path::PathBuf;
use std::process;

use clap::Parser;

use jvm_bridge::bootstrap;
use jvm_bridge::logging;
use jvm_bridge::{getclass, Value, VmConfig};

/// Calls a method of a Java class and prints the result.
#[derive(Debug, Parser)]
#[command(name = "jvm-bridge", version)]
struct Args {
    /// Class name, e.g. java.lang.Math
    class: String,
    /// Method or static field name
    method: String,
    /// Arguments: null, true, false, integers, floats; anything else is a string
    args: Vec<String>,
    /// Path to the JVM library; defaults to JVM_BRIDGE_LIBJVM or a search of the usual places
    #[arg(long)]
    libjvm: Option<PathBuf>,
    /// Option passed to the JVM, e.g. -Xmx256m (repeatable)
    #[arg(long = "option", allow_hyphen_values = true)]
    options: Vec<String>,
    /// Log level: off, error, warn, info, debug or trace
    #[arg(long)]
    log: Option<String>,
}

fn run(args: Args) -> jvm_bridge::Result<Value> {
    let mut config = VmConfig::from_env();
    if let Some(path) = args.libjvm {
        config.library_path = Some(path);
    }
    config.options.extend(args.options);
    if let Some(ref level) = args.log {
        config.log_level = logging::parse_level(level);
    }
    logging::init(config.log_level);

    let ctx = bootstrap::launch(&config)?;
    let class = getclass(&ctx, &args.class)?;
    let values: Vec<Value> = args.args.iter().map(|arg| Value::parse_literal(arg)).collect();
    let attribute = class.getattr(&args.method)?;
    if values.is_empty() && attribute.as_callable().is_none() {
        return Ok(attribute.into_value().unwrap_or(Value::None));
    }
    attribute.call(&values)
}

fn main() {
    match run(Args::parse()) {
        Ok(value) => println!("{}", value),
        Err(e) => {
            eprintln!("jvm-bridge: {}", e);
            process::exit(1);
        },
    }
}
