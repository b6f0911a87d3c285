//! mfe-shell CLI - route inspector
//!
//! Loads a JSON shell configuration and shows what the shell would do for
//! a path, without a browser:
//!   mfe-shell resolve  <config.json> <path>  → PathData
//!   mfe-shell redirect <config.json> <path>  → {"redirect": "home"} or null
//!   mfe-shell nav      <config.json> <path>  → top / left / tab nav view-models
//!
//! Output format:
//!   --json     Compact JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)

use mfe_shell::logging::init_logging;
use mfe_shell::navigation::{get_left_nav_data, get_tab_nav_data, get_top_nav_data, PathResolver};
use mfe_shell::{AppContext, ShellConfig};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use tracing::debug;

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("mfe-shell {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some(cmd @ ("resolve" | "redirect" | "nav")) => run(cmd, &opts),
        Some(cmd) => Err(format!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    let pretty = !opts.json && (opts.pretty || std::io::stdout().is_terminal());
    match result {
        Ok(output) => println!("{}", render(&output, pretty)),
        Err(e) => {
            eprintln!("{}", render(&json!({ "error": e }), pretty));
            std::process::exit(1);
        }
    }
}

fn render(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    config: Option<String>,
    path: Option<String>,
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                _ => positional.push(arg.clone()),
            }
        }

        let mut positional = positional.into_iter();
        opts.command = positional.next();
        opts.config = positional.next();
        opts.path = positional.next();
        opts
    }
}

fn run(command: &str, opts: &ParsedArgs) -> Result<Value, String> {
    let config_path = opts.config.as_deref().ok_or("missing <config.json>")?;
    let path = opts.path.clone().unwrap_or_default();
    let config = ShellConfig::from_file(config_path).map_err(|e| e.to_string())?;
    debug!(config = config_path, path = %path, command, "inspecting route");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| e.to_string())?;

    runtime.block_on(async move {
        let ctx = AppContext::new(config);
        let resolver = PathResolver::new(ctx.clone());
        match command {
            "resolve" => serde_json::to_value(resolver.resolve(&path).await).map_err(|e| e.to_string()),
            "redirect" => Ok(match resolver.should_redirect(&path).await {
                Some(target) => json!({ "redirect": target }),
                None => Value::Null,
            }),
            _ => {
                let data = resolver.resolve(&path).await;
                let config = ctx.config();
                Ok(json!({
                    "top": get_top_nav_data(&config, &data),
                    "left": get_left_nav_data(&data),
                    "tab": get_tab_nav_data(&data),
                }))
            }
        }
    })
}

fn print_usage() {
    println!(
        r#"mfe-shell - route inspector

USAGE:
    mfe-shell <command> <config.json> [path] [options]

COMMANDS:
    resolve <config> <path>     Resolve a path to PathData
    redirect <config> <path>    Show the redirect target for a path
    nav <config> <path>         Build the top / left / tab navigation

OUTPUT OPTIONS:
    --json                      Compact JSON
    --pretty                    Pretty-print JSON
    --help, -h                  Show this help
    --version, -V               Show version

ENVIRONMENT:
    RUST_LOG                    Log filter (default: info)
    MFE_SHELL_LOG_JSON=1        JSON log lines on stderr
"#
    );
}
