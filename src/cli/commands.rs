use clap::{Parser, Subcommand, Args};

#[derive(Parser)]
#[command(name = "promptbench", version, about = "Dispatch prompts to hosted and local LLMs and record the responses")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// Dispatch a single prompt and record the response
    Prompt(PromptArgs),
    /// Print recorded responses
    Records(RecordsArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Listen port
    #[arg(long)]
    pub port: Option<u16>,

    /// Listen address
    #[arg(long)]
    pub host: Option<String>,

    /// SQLite database path
    #[arg(long)]
    pub db: Option<String>,
}

#[derive(Args, Clone)]
pub struct PromptArgs {
    /// Model identifier, e.g. gpt-4o-mini or llama3.2
    #[arg(short, long)]
    pub model: String,

    /// Optional system instruction sent as the first turn
    #[arg(short, long)]
    pub system: Option<String>,

    /// Prompt text
    pub text: String,

    /// SQLite database path
    #[arg(long)]
    pub db: Option<String>,
}

#[derive(Args, Clone)]
pub struct RecordsArgs {
    /// Maximum number of rows
    #[arg(long, default_value = "20")]
    pub limit: usize,

    /// Rows to skip
    #[arg(long, default_value = "0")]
    pub offset: usize,

    /// SQLite database path
    #[arg(long)]
    pub db: Option<String>,

    /// Print a compact table instead of JSON
    #[arg(long)]
    pub table: bool,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prompt_command() {
        let cli = Cli::try_parse_from([
            "promptbench", "-vv", "prompt", "--model", "claude-3-5-haiku", "--system", "be brief", "hello",
        ]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Prompt(args) => {
                assert_eq!(args.model, "claude-3-5-haiku");
                assert_eq!(args.system.as_deref(), Some("be brief"));
                assert_eq!(args.text, "hello");
            }
            _ => panic!("expected prompt command"),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["promptbench", "serve", "--port", "8081", "--config", "bench.yaml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("bench.yaml"));
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(8081));
                assert!(args.host.is_none());
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_prompt_requires_model() {
        assert!(Cli::try_parse_from(["promptbench", "prompt", "hello"]).is_err());
    }
}
