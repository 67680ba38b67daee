//! Solar upgrade calculator entry point: CLI wiring, logging and output.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use solar_upgrade::config::ScenarioConfig;
use solar_upgrade::engine::run_simulation;
use solar_upgrade::io::export::export_csv;
use solar_upgrade::report::{markdown_summary, today, write_report};

#[derive(Parser)]
#[command(name = "solar-upgrade")]
#[command(
    about = "Estimate the benefits of a residential solar upgrade with CER incentives",
    long_about = None
)]
struct Cli {
    /// Load the scenario from a TOML file
    #[arg(long, conflicts_with = "preset")]
    scenario: Option<PathBuf>,

    /// Use a built-in preset (default, south, no_clipping)
    #[arg(long)]
    preset: Option<String>,

    /// Override the customer name
    #[arg(long)]
    customer: Option<String>,

    /// Print the named results as JSON instead of the table
    #[arg(long)]
    json: bool,

    /// Print the short markdown summary after the results
    #[arg(long)]
    markdown: bool,

    /// Export the yearly projection to CSV
    #[arg(long)]
    csv_out: Option<PathBuf>,

    /// Write the HTML report into this directory
    #[arg(long)]
    report_out: Option<PathBuf>,

    /// Start the web front-end after the run
    #[cfg(feature = "web")]
    #[arg(long)]
    serve: bool,

    /// Web front-end port
    #[cfg(feature = "web")]
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("solar_upgrade=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_scenario(cli: &Cli) -> ScenarioConfig {
    let loaded = match (&cli.scenario, &cli.preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path),
        (None, Some(name)) => ScenarioConfig::from_preset(name),
        (None, None) => Ok(ScenarioConfig::default_scenario()),
    };
    match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let mut scenario = load_scenario(&cli);
    if let Some(ref name) = cli.customer {
        scenario.customer.name.clone_from(name);
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let input = scenario.to_input();
    let params = scenario.engine_params();
    let sim = match run_simulation(&input, &params) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    info!(customer = %scenario.customer.name, "simulation complete");

    if cli.json {
        match serde_json::to_string_pretty(&sim.result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize results: {e}");
                process::exit(1);
            }
        }
    } else {
        println!("Customer: {}", scenario.customer.name);
        println!("{}", sim.result);
    }

    if cli.markdown {
        println!(
            "\n{}",
            markdown_summary(input.base_capacity_kwp, input.upgraded_capacity_kwp, &sim.result)
        );
    }

    // Export CSV if requested
    if let Some(ref path) = cli.csv_out {
        if let Err(e) = export_csv(&sim.projection, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Projection written to {}", path.display());
    }

    if let Some(ref dir) = cli.report_out {
        match write_report(dir, &scenario.customer.name, &today(), &sim) {
            Ok(path) => eprintln!("Report written to {}", path.display()),
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    }

    // Start the web front-end if requested
    #[cfg(feature = "web")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(solar_upgrade::web::AppState {
            params,
            customer: scenario.customer.name,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(solar_upgrade::web::serve(state, addr)) {
            eprintln!("error: web server failed: {e}");
            process::exit(1);
        }
    }
}
