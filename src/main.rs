use clap::Parser;
use promptbench::{cli, config, errors};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(!cli.no_color)
            .init();
    }

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: cli::Cli) -> Result<(), errors::BenchError> {
    if let cli::Commands::Validate(args) = &cli.command {
        return handle_validate(args).await;
    }

    let config = load_config(cli.config.as_deref()).await?;
    match cli.command {
        cli::Commands::Serve(args) => cli::serve::handle_serve(args, config).await,
        cli::Commands::Prompt(args) => cli::prompt::handle_prompt(args, config).await,
        cli::Commands::Records(args) => cli::records::handle_records(args, config).await,
        cli::Commands::Validate(_) => Ok(()),
    }
}

async fn load_config(path: Option<&str>) -> Result<config::BenchConfig, errors::BenchError> {
    match path {
        Some(path) => config::parse_config(std::path::Path::new(path)).await,
        None => Ok(config::BenchConfig::default()),
    }
}

fn exit_code(e: &errors::BenchError) -> i32 {
    match e {
        errors::BenchError::Config(_)
        | errors::BenchError::Yaml(_)
        | errors::BenchError::MissingCredential(_) => 2,
        errors::BenchError::LocalRuntime(_) => 3,
        errors::BenchError::Authentication(_) => 4,
        _ => 1,
    }
}

async fn handle_validate(args: &cli::commands::ValidateArgs) -> Result<(), errors::BenchError> {
    let path = std::path::PathBuf::from(&args.config);
    let config = config::parse_config(&path).await?;
    let classifier = promptbench::llm::catalog::ModelClassifier::from_config(&config);
    println!("Configuration is valid: {}", args.config);
    for rule in classifier.rules() {
        println!("  {:<12} -> {}", rule.prefix, rule.kind.info().name);
    }
    Ok(())
}
