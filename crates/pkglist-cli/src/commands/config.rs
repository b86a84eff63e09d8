use crate::GlobalOpts;
use clap::Subcommand;
use colored::Colorize;
use pkglist_config::Config;
use pkglist_logger as logger;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the values that differ from the defaults
    Show,
    /// Print the path of the configuration file
    Path,
    /// Print a single value
    Get { key: String },
    /// Set a value, e.g. `set list.dedupe true` or `set evaluator python`
    Set { key: String, value: String },
}

fn load() -> Result<Config, String> {
    Config::load().map_err(|e| format!("Failed to load config: {}", e))
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key: {}. Supported keys: {}",
        key,
        Config::keys().join(", ")
    )
}

pub fn handle_config(action: ConfigAction, opts: &GlobalOpts) -> Result<(), String> {
    match action {
        ConfigAction::Show => {
            let config = load()?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if !opts.quiet {
                    println!("  {}", "(defaults)".yellow());
                }
            } else {
                for (key, value) in config.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
            Ok(())
        }
        ConfigAction::Path => {
            let path = Config::path().map_err(|e| e.to_string())?;
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Get { key } => {
            if !Config::keys().contains(&key) {
                return Err(unknown_key(&key));
            }
            let config = load()?;
            let value = match key.as_str() {
                "evaluator" => Some(config.evaluator().to_string()),
                _ => config.get(&key),
            };
            match value {
                Some(value) => println!("{}", value),
                None => logger::debug(&format!("{} is not set", key)),
            }
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let mut config = load()?;
            config.set(&key, &value).map_err(|e| match e {
                pkglist_config::ConfigError::UnknownKey(key) => unknown_key(&key),
                e => e.to_string(),
            })?;
            config
                .save()
                .map_err(|e| format!("Failed to save config: {}", e))?;
            logger::success(&format!("Set {} = {}", key, value));
            Ok(())
        }
    }
}
