use clap::Parser;
use cvai::ProviderKind;
use cvai::core::config;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "cvai", about = "AI-assisted CV builder")]
struct Args {
    /// LLM provider to use (overrides config and CVAI_PROVIDER)
    #[arg(short, long, value_enum)]
    provider: Option<ProviderKind>,

    /// Model name (overrides config and CVAI_MODEL)
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to cvai.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("cvai.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}; using defaults");
            log::warn!("{e}; using defaults");
            config::CvaiConfig::default()
        }
    };
    let resolved = config::resolve(&file_config, args.provider, args.model.as_deref());

    log::info!(
        "cvai starting up with provider: {:?}, model: {}",
        resolved.provider,
        resolved.model_name
    );

    cvai::shell::run(resolved).await
}
