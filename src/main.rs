use clap::Parser;
use objection_etl::utils::{logger, validation::Validate};
use objection_etl::{run_forwarder, CliConfig, EtlError};

fn report_failure(stage: &str, e: &EtlError) -> ! {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_logger(config.log_format, config.verbose);

    tracing::info!("Starting objection-etl");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        report_failure("Configuration validation", &e);
    }

    match run_forwarder(&config).await {
        Ok(summary) => {
            println!(
                "✅ Forwarded {} objection letters: {} succeeded, {} failed",
                summary.total, summary.succeeded, summary.failed
            );
            println!("📁 Success output: {}", config.success_output_path);
            println!("📁 Error output: {}", config.error_output_path);
        }
        Err(e) => report_failure("Forwarding run", &e),
    }
}
