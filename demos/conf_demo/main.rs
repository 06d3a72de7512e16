//! # layerconf demo application
//!
//! A sample CLI tool that shows how a program resolves its settings with
//! [layerconf](https://docs.rs/layerconf). It is **not** a real app; it exists
//! to demonstrate and manually verify layerconf's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example conf_demo -- echo
//! cargo run --example conf_demo -- --help
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                  | How to exercise it                                                        |
//! |--------------------------|---------------------------------------------------------------------------|
//! | Declared defaults        | `cargo run --example conf_demo -- echo`                                   |
//! | Config file (cwd)        | Create `conf-demo.conf` in cwd, then run `echo`                           |
//! | Config file (home)       | Place `conf-demo.conf` under `~/.conf-demo/`                              |
//! | Config file flag         | `cargo run --example conf_demo -- --config other.toml echo`               |
//! | Env var                  | `CONF_DEMO_DISPLAY_COLOR=red cargo run --example conf_demo -- echo`       |
//! | Flag                     | `cargo run --example conf_demo -- --server-port 9999 echo`                |
//! | Short flag               | `cargo run --example conf_demo -- -v -p 9999 echo`                        |
//! | Sequence value           | `cargo run --example conf_demo -- --display-tags a,b,c echo`              |
//! | Single key echo          | `cargo run --example conf_demo -- echo server.port`                       |
//! | `ENV=value` listing      | `cargo run --example conf_demo -- env`                                    |
//! | Usage text               | `cargo run --example conf_demo -- --help`                                 |
//! | Clap adapter             | `cargo run --example conf_demo -- clap --server-port 9999`                |

mod config;

use clap::Command;
use layerconf::{ClapSource, Conf, ConfBuilder, SearchPath};

use config::DemoConfig;

/// Create a [`ConfBuilder`] wired up for the demo app.
///
/// Search paths: `~/.conf-demo/` then cwd (cwd wins).
/// Env prefix: `CONF_DEMO`.
fn make_builder() -> ConfBuilder {
    Conf::builder()
        .app_name("conf-demo")
        .env_prefix("CONF_DEMO")
        .config_file("conf-demo.conf")
        .config_file_flag("config")
        .search_paths(vec![SearchPath::Home(".conf-demo"), SearchPath::Cwd])
}

// ---------------------------------------------------------------------------
// ANSI color helpers
// ---------------------------------------------------------------------------

fn ansi_color_code(name: &str) -> &str {
    match name {
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        "magenta" => "\x1b[35m",
        "cyan" => "\x1b[36m",
        _ => "\x1b[0m",
    }
}

const RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn entries(config: &DemoConfig) -> Vec<(&'static str, String)> {
    vec![
        ("name", config.name.clone()),
        ("verbose", config.verbose.to_string()),
        ("server.host", config.server.host.clone()),
        ("server.port", config.server.port.to_string()),
        ("server.max_connections", config.server.max_connections.to_string()),
        ("display.color", config.display.color.clone()),
        ("display.format", config.display.format.clone()),
        ("display.tags", config.display.tags.join(",")),
    ]
}

fn echo(config: &DemoConfig, only: Option<&str>) {
    let color = ansi_color_code(&config.display.color);
    let entries = entries(config);

    if let Some(key) = only {
        match entries.iter().find(|(k, _)| *k == key) {
            Some((key, value)) => println!("{color}{key}{RESET}  {value}"),
            None => {
                eprintln!("Unknown key: {key}");
                std::process::exit(1);
            }
        }
        return;
    }

    if config.verbose {
        println!("{color}[verbose] Resolved configuration for {:?}{RESET}", config.name);
        println!();
    }

    if config.display.format == "plain" {
        for (key, value) in &entries {
            println!("{key}={value}");
        }
    } else {
        let width = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in &entries {
            println!("{color}{key:<width$}{RESET}  {value}");
        }
    }
}

/// Let clap own the command line and feed its matches back as the flag layer.
fn parse_with_clap(builder: ConfBuilder, args: &[String]) -> DemoConfig {
    let mut config = DemoConfig::default();
    let matches = {
        let fields = layerconf::extract_fields(&mut config).unwrap_or_else(|e| {
            eprintln!("{e}");
            std::process::exit(1);
        });
        Command::new("conf-demo clap")
            .args(layerconf::args_for(&fields))
            .get_matches_from(std::iter::once("conf-demo clap".to_string()).chain(args.iter().cloned()))
    };

    builder
        .cli_source(ClapSource::from_matches(&matches))
        .parse(&mut config)
        .unwrap_or_else(|e| {
            eprintln!("Failed to load config:\n{e}");
            std::process::exit(1);
        });
    config
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().is_some_and(|a| a == "clap") {
        let config = parse_with_clap(make_builder(), &args[1..]);
        echo(&config, None);
        return;
    }

    let builder = make_builder().args(args);
    let mut config = DemoConfig::default();
    let rest = builder.parse_or_exit(&mut config);

    match rest.first().map(String::as_str) {
        None | Some("echo") => echo(&config, rest.get(1).map(String::as_str)),
        Some("env") => match layerconf::to_string(&mut config) {
            Ok(line) => println!("{line}"),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        Some("usage") => match builder.usage(&mut config) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        Some(other) => {
            eprintln!("Unknown command: {other} (expected echo, env or usage)");
            std::process::exit(1);
        }
    }
}
