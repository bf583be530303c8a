use chrono::Utc;
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use env_plot::chart::{self, ChartAssembler, ChartFileRenderer, ChartState};
use env_plot::cli::{self, Cli, Commands};
use env_plot::common::AppState;
use env_plot::config::{Config, LogFormat};
use env_plot::dashboard::{Dashboard, PlotOutcome};
use env_plot::envdata::Reading;
use env_plot::services::cache::CatalogKind;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration (fail-fast)
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config = config.with_api_base_url(url);
    }

    init_tracing(config.log_format);
    tracing::info!(
        api_base_url = %config.api_base_url,
        timeout_secs = ?config.api_timeout_seconds,
        "Configuration loaded"
    );

    let state = AppState::from_config(config);

    match cli.command {
        Commands::Locations => print_catalog(&state, CatalogKind::Locations).await?,
        Commands::Sensors => print_catalog(&state, CatalogKind::Sensors).await?,
        Commands::Plot {
            series,
            from,
            to,
            last,
            out,
            csv,
        } => {
            let range = cli::resolve_range(from, to, last)?;
            let out = out.unwrap_or_else(|| state.config.chart_output_path.clone());

            tracing::info!(
                series = series.len(),
                from = range.from,
                to = range.to,
                resolution = ?range.resolution(),
                "Plotting"
            );

            let assembler = ChartAssembler::new(ChartState::new(), ChartFileRenderer::new(&out));
            let mut dashboard = Dashboard::new(state, assembler);

            let queries = series.into_iter().map(|s| s.into_query(range)).collect();
            let outcomes = dashboard.add_plots(queries).await;

            let failed = outcomes.iter().filter(|(_, o)| !o.is_added()).count();
            for (query, outcome) in &outcomes {
                if let PlotOutcome::Added { label, points, .. } = outcome {
                    println!("{label}: {points} points");
                } else {
                    println!("{}: failed", query.label());
                }
            }

            if dashboard.chart().is_empty() {
                return Err(format!("none of the {failed} requested series could be fetched").into());
            }

            // Only the last redraw matters: it holds every fetched series
            if let Some((_, PlotOutcome::Added { redraw_error: Some(e), .. })) = outcomes
                .iter()
                .rev()
                .find(|(_, o)| o.is_added())
            {
                return Err(format!("chart could not be written to {}: {e}", out.display()).into());
            }

            if let Some(csv_path) = csv {
                let writer = BufWriter::new(File::create(&csv_path)?);
                chart::export_csv(dashboard.chart().series(), writer)?;
                tracing::info!(path = %csv_path.display(), "CSV written");
            }

            tracing::info!(path = %out.display(), failed, "Chart written");
        }
        Commands::AddLocation { name } => {
            let dashboard = Dashboard::new(state, logging_assembler());
            dashboard.register_location(&name).await?;
            println!("Location {name:?} created");
        }
        Commands::AddSensor { name } => {
            let dashboard = Dashboard::new(state, logging_assembler());
            dashboard.register_sensor(&name).await?;
            println!("Sensor {name:?} created");
        }
        Commands::Push {
            location,
            sensor,
            value,
            time,
        } => {
            let reading = Reading {
                unix_timestamp: time.unwrap_or_else(|| Utc::now().timestamp()),
                location,
                sensor,
                value,
            };
            state.client.submit_reading(&reading).await?;
            println!("Reading stored at {}", reading.unix_timestamp);
        }
        Commands::Ping => {
            let banner = state.client.ping().await?;
            println!("{banner}");
        }
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,env_plot=debug".into());

    // Logs go to stderr so command output stays pipeable
    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn logging_assembler() -> ChartAssembler<chart::LogRenderer> {
    ChartAssembler::new(ChartState::new(), chart::LogRenderer)
}

async fn print_catalog(
    state: &AppState,
    kind: CatalogKind,
) -> Result<(), Box<dyn std::error::Error>> {
    let dashboard = Dashboard::new(state.clone(), logging_assembler());

    let entries = match kind {
        CatalogKind::Locations => dashboard.refresh_locations().await,
        CatalogKind::Sensors => dashboard.refresh_sensors().await,
    };

    // The failure itself was already logged by the dashboard
    let entries = entries.ok_or_else(|| format!("could not fetch {}", kind.as_str()))?;
    for entry in entries.iter() {
        println!("{entry}");
    }
    Ok(())
}
