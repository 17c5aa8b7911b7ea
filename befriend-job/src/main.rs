use befriend_core::BefriendConfig;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use befriend_job::job;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "befriend.toml")]
    config: String,

    /// Ping the configured store and exit.
    #[arg(long)]
    health: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (SUPABASE_URL / SUPABASE_KEY in dev)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = match BefriendConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over service.log_level
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level)),
        )
        .init();

    if args.health {
        match job::health(&config).await {
            Ok(v) => println!("✅ {}", v),
            Err(e) => {
                println!("❌ Store health check failed: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let report = job::run(&config).await?;

    println!("\nFriend suggestions for all users:");
    for line in job::sample_lines(&report.suggestions, config.suggestions.sample_size) {
        println!("{}", line);
    }
    println!("\nTotal users with suggestions: {}", report.suggestions.len());
    println!(
        "\nCreated {} new suggestion notifications",
        report.notifications_created
    );

    Ok(())
}
