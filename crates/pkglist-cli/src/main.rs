use clap::{Parser, Subcommand};
use pip_package_list::{
    commands::{
        config::{self, ConfigAction},
        list::{self, ListCommand},
    },
    init_tracing, GlobalOpts,
};
use pkglist_config::Config;
use pkglist_logger as logger;
use std::path::Path;

#[derive(Parser)]
#[command(name = "pip-package-list")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Flatten pip requirements files",
    long_about = "pip-package-list flattens requirements files and setup.py manifests, following -r and -e references, into a single list of requirements."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every requirement of the given manifests
    List(ListCommand),
    /// Manage the configuration file
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn main() {
    let cli = Cli::parse();

    let config_path = Config::path().ok();
    if let Err(e) = logger::init_with_verbosity(
        cli.global.verbosity_level(),
        cli.global.quiet,
        config_path.as_deref().and_then(Path::parent),
    ) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing(cli.global.verbosity_level());

    let result = match cli.command {
        Commands::List(cmd) => Config::load()
            .map_err(|e| format!("Failed to load config: {}", e))
            .and_then(|config| list::handle_list(cmd, &config)),
        Commands::Config { action } => {
            config::handle_config(action.unwrap_or(ConfigAction::Show), &cli.global)
        }
    };

    if let Err(e) = result {
        logger::error(&e);
        logger::show_log_path();
        std::process::exit(1);
    }
}
