use std::collections::HashSet;
use std::fs::File;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

mod cli;

use cli::{Cli, Commands, ConfigCommands, DatabaseCommands, EstimateArgs, PricingCommands};
use replication_cost_lib::commands;
use replication_cost_lib::config::{load_config, AppConfig};
use replication_cost_lib::context::SessionContext;
use replication_cost_lib::db::import::read_metadata_csv;
use replication_cost_lib::engine::{resolve_destination, EstimateRequest};
use replication_cost_lib::export::{estimate_to_json, ExportFormat};
use replication_cost_lib::models::{CostEstimate, ServiceType};
use replication_cost_lib::pricing::{destination_service_types, PricingGrid};
use replication_cost_lib::{init_tracing, AppState};

fn main() -> ExitCode {
    let args = Cli::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Cli) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(path) = &args.db_path {
        config.database.path = Some(path.clone());
    }
    if let Some(role) = &args.role {
        config.session.role = role.clone();
    }
    if let Some(region) = &args.region {
        config.session.region = region.clone();
    }

    init_tracing(&config.log_level);

    if let Commands::Config { action: ConfigCommands::Show } = &args.command {
        return show_config(&config);
    }

    let session = SessionContext::new(config.session.role.clone(), &config.session.region)?;
    let mut state = AppState::open(config)?;

    match args.command {
        Commands::Estimate(estimate_args) => estimate(&mut state, &session, estimate_args)?,
        Commands::Databases { action } => match action {
            DatabaseCommands::List => list_databases(&mut state)?,
            DatabaseCommands::Import { file } => {
                let reader = File::open(&file).with_context(|| format!("Failed to open {:?}", file))?;
                let databases = read_metadata_csv(reader)?;
                let count = commands::import_databases(&mut state, &databases)?;
                println!("Imported {} databases", count);
            }
        },
        Commands::Pricing { action } => match action {
            PricingCommands::Show => show_pricing(&mut state)?,
            PricingCommands::Refresh => {
                let outcome = commands::refresh_pricing(&mut state)?;
                println!("{}", outcome.message);
                if let Some(at) = outcome.status.refreshed_at {
                    println!("Pricing refreshed at {}", at);
                }
            }
            PricingCommands::Export { output } => {
                let count = match output {
                    Some(path) => {
                        let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
                        commands::export_pricing(&mut state, file)?
                    }
                    None => commands::export_pricing(&mut state, std::io::stdout().lock())?,
                };
                tracing::info!("Exported {} pricing rows", count);
            }
            PricingCommands::Save { file } => {
                let reader = File::open(&file).with_context(|| format!("Failed to open {:?}", file))?;
                let grid = PricingGrid::from_csv_reader(reader)?;
                let outcome = commands::save_pricing(&mut state, &session, &grid)?;
                println!(
                    "Pricing table replaced: {} rows at {}",
                    outcome.rows_written, outcome.updated_at
                );
            }
        },
        Commands::Regions { services } => {
            let service_types: HashSet<ServiceType> = if services.is_empty() {
                destination_service_types()
            } else {
                services
                    .iter()
                    .map(|s| s.parse::<ServiceType>())
                    .collect::<Result<_, _>>()?
            };

            let ranked = commands::get_lowest_cost_regions(&mut state, &service_types)?;
            if ranked.is_empty() {
                println!("No pricing rows for the selected service types");
            }
            for (i, rank) in ranked.iter().enumerate() {
                println!("{}. {:<28} {:>12.4}", i + 1, rank.location, rank.summed_rate);
            }
        }
        Commands::Destinations => {
            for (cloud, region) in commands::get_destinations(&mut state)? {
                println!("{:<8} {}", cloud, region);
            }
        }
        // Handled before the database is opened
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn estimate(state: &mut AppState, session: &SessionContext, args: EstimateArgs) -> Result<()> {
    let rates = commands::get_pricing(state)?;
    let destination = resolve_destination(&rates, args.dest_cloud.as_deref(), args.dest_region.as_deref())?;

    let request = EstimateRequest {
        databases: args.databases,
        destination,
        daily_change_pct: args.change_pct,
        refresh_per_day: args.refreshes,
        price_per_credit: args.price_per_credit.unwrap_or(state.config.estimate.price_per_credit),
    };

    let estimate = commands::estimate_cost(state, session, &request)?;

    if args.json {
        println!("{}", estimate_to_json(&estimate)?);
    } else {
        print_estimate(&estimate);
    }

    if let Some(path) = args.csv {
        let written = commands::export_estimate(&estimate, ExportFormat::Csv, Some(&path))?;
        println!("Estimate written to {}", written.display());
    }

    Ok(())
}

fn print_estimate(estimate: &CostEstimate) {
    let a = &estimate.assumptions;
    let b = &estimate.breakdown;
    let p = &estimate.projection;
    let usd = &estimate.usd;

    match &estimate.pricing_refreshed_at {
        Some(at) => println!("Pricing refreshed at {}", at),
        None => println!("Warning: no pricing data found; all lines are zero estimates"),
    }

    println!("\nAssumptions");
    println!(
        "  Source: {} / {} | Destination: {} / {}",
        a.source_cloud,
        a.source_region,
        a.destination_cloud.as_deref().unwrap_or("-"),
        a.destination_region.as_deref().unwrap_or("-"),
    );
    println!(
        "  Daily change: {}% | Refreshes/day: {} | Selected DB size: {:.3} TB | Price/credit: ${:.2}",
        a.daily_change_pct, a.refresh_per_day, a.total_size_tb, a.price_per_credit
    );

    println!("\nCost estimate (credits)");
    println!("  {:<36} {:>14} {:>14}  {}", "Component", "Credits", "USD", "Estimate");
    for line in b.lines() {
        println!(
            "  {:<36} {:>14.4} {:>14.2}  {}",
            line.service_type.display_name(),
            line.credits,
            line.credits * a.price_per_credit,
            if line.is_estimate { "yes" } else { "no" }
        );
    }
    println!(
        "  {:<36} {:>14.4} {:>14.2}  {}",
        "Total (mix of daily/monthly)",
        b.mixed_total(),
        b.mixed_total() * a.price_per_credit,
        if b.any_estimate() { "yes" } else { "no" }
    );

    println!("\nMonthly projection");
    let rows = [
        ("Data Transfer", p.monthly_transfer, usd.monthly_transfer),
        ("Replication Compute", p.monthly_compute, usd.monthly_compute),
        ("Storage", p.monthly_storage, usd.monthly_storage),
        ("Serverless Maintenance", p.monthly_serverless, usd.monthly_serverless),
        ("Monthly total", p.monthly_total, usd.monthly_total),
        ("Annual total", p.annual_total, usd.annual_total),
    ];
    for (label, credits, dollars) in rows {
        println!("  {:<36} {:>14.4} {:>14.2}", label, credits, dollars);
    }

    println!("\nRates are credits per unit. Transfer/compute use TB of change data per day; storage/serverless use TB-month.");
    println!("Lines marked as estimates rely on a fallback rate from another region or cloud.");
}

fn list_databases(state: &mut AppState) -> Result<()> {
    let databases = commands::get_databases(state)?;
    if databases.is_empty() {
        println!("No database metadata found. Import it with `databases import <csv>`.");
    }
    for db in databases {
        println!(
            "{:<32} {:>12.3} TB  {}",
            db.name,
            db.size_tb,
            db.as_of.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn show_pricing(state: &mut AppState) -> Result<()> {
    let status = commands::get_pricing_status(state)?;
    match &status.refreshed_at {
        Some(at) => println!("Pricing refreshed at {} ({} rows)", at, status.row_count),
        None if status.row_count == 0 => println!("Warning: no pricing data found"),
        None => println!("{} rows, no refresh time recorded", status.row_count),
    }

    let privileged = replication_cost_lib::pricing::is_privileged(
        &state.config.session.role,
        &state.config.admin.privileged_roles,
    );
    if !privileged {
        println!("Read-only view (role {})", state.config.session.role);
    }

    for rate in commands::get_pricing(state)? {
        println!(
            "{:<20} {:<6} {:<16} {:<10} {:>12.4} {}",
            rate.service_type, rate.cloud, rate.region, rate.unit, rate.rate, rate.currency
        );
    }
    Ok(())
}

fn show_config(config: &AppConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
