//! # Sitewatch Configuration Validator
//!
//! Loads the layered configuration for an environment exactly as the server
//! would, checks it, and prints a sanitized view. Exits non-zero on any
//! configuration or schedule error.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use sitewatch::config::{ConfigManager, SitewatchConfig};
use sitewatch::orchestration::ScheduleSpec;

#[derive(Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate Sitewatch configuration files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment to validate
    #[arg(short, long, default_value = "development")]
    environment: String,

    /// Configuration directory path (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate every section (default)
    All,

    /// Print the merged configuration with secrets masked
    Show,

    /// Print upcoming scheduled fire times
    NextFires {
        #[arg(short = 'n', long, default_value_t = 3)]
        count: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init();

    let result = load(&cli).and_then(|config| match &cli.command {
        Some(Commands::All) | None => validate_all(&config),
        Some(Commands::Show) => show(&config),
        Some(Commands::NextFires { count }) => next_fires(&config, *count),
    });

    match result {
        Ok(()) => {
            info!("Configuration validation completed successfully");
            process::exit(0);
        }
        Err(e) => {
            error!("Configuration validation failed: {}", e);
            println!("❌ {e}");
            process::exit(1);
        }
    }
}

fn load(cli: &Cli) -> Result<SitewatchConfig, Box<dyn std::error::Error>> {
    println!("🔧 Validating Sitewatch Configuration");
    println!("Environment: {}", cli.environment);
    if let Some(config_dir) = &cli.config_dir {
        println!("Config Directory: {}", config_dir.display());
    }
    println!();

    let manager = ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), &cli.environment)?;
    println!("✅ Configuration loaded and presence checks passed");
    Ok(manager.config().clone())
}

fn validate_all(config: &SitewatchConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("🌐 Roster: {} site(s)", config.sites.len());
    for site in &config.sites {
        println!("   • {site}");
    }

    println!("🔍 Probe timeout: {} ms", config.probe.timeout_ms);

    let spec = ScheduleSpec::parse(&config.schedule.cron, &config.schedule.timezone)?;
    println!(
        "⏰ Schedule: '{}' in {} (startup run: {})",
        spec.expression(),
        spec.timezone(),
        config.schedule.run_on_startup
    );

    println!(
        "📄 Reports: {}/{}_<date>.pdf",
        config.report.output_dir.display(),
        config.report.file_prefix
    );

    if config.mail.enabled {
        println!(
            "📧 Mail: {}:{} from {} to {} recipient(s)",
            config.mail.smtp_host,
            config.mail.smtp_port,
            config.mail.from,
            config.mail.recipients.len()
        );
    } else {
        println!("📭 Mail: disabled");
    }

    println!("🌍 Web: {}", config.web.bind_address);
    println!("\n🎉 All configuration validation checks passed!");
    Ok(())
}

fn show(config: &SitewatchConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&config.sanitized())?);
    Ok(())
}

fn next_fires(config: &SitewatchConfig, count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let spec = ScheduleSpec::parse(&config.schedule.cron, &config.schedule.timezone)?;
    println!("⏰ Next {count} fire(s) for '{}' in {}:", spec.expression(), spec.timezone());

    let mut cursor = chrono::Utc::now();
    for _ in 0..count {
        let Some(next) = spec.next_fire_after(cursor) else {
            println!("   (no further fire times)");
            break;
        };
        println!("   • {}", next.with_timezone(&spec.timezone()));
        cursor = next;
    }
    Ok(())
}
