use clap::{Args, Subcommand};

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!(
                            "flexible_slots: {}",
                            config.flexible_slots.value.join(", ")
                        );
                        println!("  source: {}", config.flexible_slots.source);
                        println!();

                        let layout = &config.layout.value;
                        println!("layout:");
                        println!("  include_macros: {}", layout.include_macros);
                        println!("  include_description: {}", layout.include_description);
                        println!("  include_guidelines: {}", layout.include_guidelines);
                        println!("  include_supplements: {}", layout.include_supplements);
                        println!("  source: {}", config.layout.source);
                        println!();

                        println!("extra_keywords:");
                        for (category, keywords) in &config.extra_keywords.value {
                            println!("  {}: {}", category, keywords.join(", "));
                        }
                        println!("  source: {}", config.extra_keywords.source);
                    }
                }
                Ok(())
            }
        }
    }
}
