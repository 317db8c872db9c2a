//! keynav - Main Entry Point

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use keynav_a11y::{
    ConfigError, ConfigResolver, KeyEvent, KeyboardNavigation, MarkerClasses, NavigationConfig,
    ResolvedScope,
};
use keynav_dom::{DomTree, TreeAccess, TreeFixture};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "keynav", version, about = "Route-scoped keyboard navigation tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the focus scope of every route and validate the config
    Check {
        /// Navigation config (JSON)
        config: PathBuf,
    },
    /// Replay key presses against a fixture tree
    Replay {
        /// Navigation config (JSON)
        config: PathBuf,
        /// Tree fixture (JSON)
        fixture: PathBuf,
        /// Route made active before the first key
        #[arg(long, default_value = "/")]
        route: String,
        /// Comma-separated key names, e.g. `Tab,Shift+Tab,ArrowDown,Enter`
        #[arg(long, value_delimiter = ',', default_value = "Tab")]
        keys: Vec<String>,
        #[arg(long)]
        focus_class: Option<String>,
        #[arg(long)]
        simulated_class: Option<String>,
        #[arg(long)]
        disabled_class: Option<String>,
        /// Refuse configs that fail validation
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match Cli::parse().command {
        Commands::Check { config } => check(&config),
        Commands::Replay {
            config,
            fixture,
            route,
            keys,
            focus_class,
            simulated_class,
            disabled_class,
            strict,
        } => {
            let classes = MarkerClasses::new(
                focus_class.as_deref(),
                simulated_class.as_deref(),
                disabled_class.as_deref(),
            );
            replay(&config, &fixture, &route, &keys, classes, strict)
        }
    }
}

fn load_config(path: &Path) -> Result<NavigationConfig> {
    NavigationConfig::load(path).with_context(|| format!("loading config {}", path.display()))
}

fn check(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    let resolver = ConfigResolver::new(config.clone(), 1);

    for route in &config.routes {
        match resolver.resolve_route(&route.path) {
            ResolvedScope::Active(scope) => println!("{}: {}", route.path, scope.ids().join(", ")),
            ResolvedScope::Empty => println!("{}: (empty)", route.path),
        }
    }
    let fallback: Vec<&str> = config
        .general
        .header
        .iter()
        .chain(&config.general.footer)
        .map(|s| s.id.as_str())
        .collect();
    println!("(other routes): {}", fallback.join(", "));

    match config.validate() {
        Ok(()) => {
            println!("config is valid");
            Ok(())
        }
        Err(ConfigError::Invalid(issues)) => {
            for issue in &issues {
                println!("  {issue}");
            }
            bail!("{} issue(s) in {}", issues.len(), path.display())
        }
        Err(err) => Err(err.into()),
    }
}

fn replay(
    config_path: &Path,
    fixture_path: &Path,
    route: &str,
    keys: &[String],
    classes: MarkerClasses,
    strict: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let fixture = TreeFixture::load(fixture_path)
        .with_context(|| format!("loading fixture {}", fixture_path.display()))?;

    let mut nav = KeyboardNavigation::from_fixture(&fixture)?;
    if strict {
        nav.init_validated(config, classes)
            .with_context(|| format!("validating config {}", config_path.display()))?;
    } else {
        nav.init(config, classes);
    }
    nav.on_change_route(route)
        .with_context(|| format!("activating route {route}"))?;
    tracing::info!("Replaying {} keys on {}", keys.len(), route);

    for key in keys {
        let event = KeyEvent::parse(key);
        let outcome = nav.dispatch_key(&event);
        println!("{}", describe(&nav, &event.display(), outcome.prevent_default));
    }
    Ok(())
}

fn describe(nav: &KeyboardNavigation<DomTree>, key: &str, prevented: bool) -> String {
    let state = nav.state();
    let current = nav.current().map_or("-", |e| e.id());
    let focused = nav
        .tree()
        .focused()
        .and_then(|n| nav.tree().id_of(n))
        .unwrap_or("-");
    let mut line = format!(
        "{key:<12} {:?} current={current} index={} focused={focused}",
        state.mode, state.current_index
    );
    if let Some(item) = state.highlighted().and_then(|n| nav.tree().id_of(n)) {
        line.push_str(&format!(" item={item}"));
    }
    if !state.engaged {
        line.push_str(" (disengaged)");
    }
    if prevented {
        line.push_str(" [default prevented]");
    }
    line
}
