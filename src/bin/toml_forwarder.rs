use clap::Parser;
use objection_etl::app::forwarder::{inspect_input, run_forwarder};
use objection_etl::core::ConfigProvider;
use objection_etl::utils::logger::{self, LogFormat};
use objection_etl::utils::validation::Validate;
use objection_etl::TomlConfig;

#[derive(Parser)]
#[command(name = "toml-forwarder")]
#[command(about = "Objection letter forwarder driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "forwarder.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    /// Validate configuration and input without calling the API
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_logger(args.log_format, args.verbose);

    tracing::info!("🚀 Starting TOML-based objection forwarder");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    tracing::info!("   Endpoint: {}", config.api_endpoint());
    tracing::info!("   Input: {}", config.input_path());

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no records will be sent");
        let stats = inspect_input(config.input_path())?;
        println!(
            "🔍 {} readable rows, {} unreadable rows in {}",
            stats.readable,
            stats.unreadable,
            config.input_path()
        );
        return Ok(());
    }

    match run_forwarder(&config).await {
        Ok(summary) => {
            println!(
                "✅ Forwarded {} objection letters: {} succeeded, {} failed",
                summary.total, summary.succeeded, summary.failed
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Forwarding run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
