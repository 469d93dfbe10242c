use anyhow::{Context, Result};
use clap::Parser;

use pagerouter::cli::{Cli, Commands};
use pagerouter::config::{RouteDefinition, RouterConfig};
use pagerouter::logging::init_tracing;
use pagerouter::simulate::{self, Step};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Routes => print_routes(&config, cli.json),
        Commands::Simulate { token, steps } => {
            let parsed = steps
                .iter()
                .map(|raw| {
                    raw.parse::<Step>()
                        .map(|step| (raw.clone(), step))
                        .with_context(|| format!("Invalid step '{}'", raw))
                })
                .collect::<Result<Vec<_>>>()?;

            let report = simulate::run(config, token, &parsed).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<RouterConfig> {
    let config = match &cli.config {
        Some(path) => RouterConfig::load_from(path)?,
        None => RouterConfig::load()?,
    };
    Ok(config)
}

fn print_routes(config: &RouterConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&config.routes)?);
        return Ok(());
    }

    fn print(route: &RouteDefinition, depth: usize) {
        let mut flags = Vec::new();
        if route.meta.auth {
            flags.push("auth");
        }
        if route.meta.tab_bar {
            flags.push("tab");
        }
        if route.meta.keep_alive {
            flags.push("keep-alive");
        }
        println!(
            "{}{:<16} {:<32} {:<16} {}",
            "  ".repeat(depth),
            route.name,
            route.path,
            route.meta.title.as_deref().unwrap_or("-"),
            flags.join(",")
        );
        for child in &route.children {
            print(child, depth + 1);
        }
    }

    for route in &config.routes {
        print(route, 0);
    }
    println!(
        "home: {}  login: {}",
        config.router.home, config.router.login
    );
    Ok(())
}
