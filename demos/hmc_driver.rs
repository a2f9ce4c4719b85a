//! Example: a minimal HMC driver selecting its modules from an input file.
//!
//! Run with `cargo run --example hmc_driver [input.toml]`. Without an
//! argument the embedded input below is used. Set `RUST_LOG=debug` to see
//! registration and build logs.

use std::path::Path;

use futures::StreamExt;
use hmc_modules::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_INPUT: &str = r#"
[Action]
name = "Wilson"

[Action.parameters]
beta = 6.0

[Observable]
name = "Plaquette"

[Observable.parameters]
output_prefix = "ckpoint_plaq"
"#;

fn load_input() -> HmcResult<TomlReader> {
    match std::env::args().nth(1) {
        Some(path) => Ok(TomlReader::from_file(Path::new(&path))?),
        None => Ok(TomlReader::parse(DEFAULT_INPUT)?),
    }
}

fn run(catalog: &ModuleCatalog<TomlReader>, input: &TomlReader) -> HmcResult<()> {
    let action = catalog.actions().create_from_section(input, "Action")?;
    let observable = catalog
        .observables()
        .create_from_section(input, "Observable")?;

    println!("Action module:     {} ({})", action.name(), action.describe());
    println!("Observable module: {} ({})", observable.name(), observable.describe());

    let action = action.get_ptr()?;
    println!("{}", action.log_parameters());

    let observable = observable.get_ptr()?;
    if let Some(logger) = observable.as_any().downcast_ref::<PlaquetteLogger>() {
        for trajectory in 0..3 {
            println!(
                "trajectory {trajectory}: {} -> {}",
                observable.observable_name(),
                logger.output_file(trajectory).display()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== HMC module driver ===\n");

    let (sender, mut events) = create_stream::<ModuleEvent>();
    let mut catalog = ModuleCatalog::<TomlReader>::with_events(sender);
    if let Err(e) = catalog.register_defaults() {
        eprintln!("Startup failed: {e}");
        std::process::exit(1);
    }
    println!("{}\n", catalog.describe());

    let outcome = load_input().and_then(|input| run(&catalog, &input));
    drop(catalog);

    println!("\n=== Module events ===");
    while let Some(event) = events.next().await {
        println!("{event:?}");
    }

    if let Err(e) = outcome {
        eprintln!("\nRun failed: {e}");
        std::process::exit(1);
    }
}
