use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use std::process::ExitCode;

use wxglyph_core::{
    Config, Outcome, WeatherDisplay, WeatherProvider, WeatherQuery, lookup, provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wxglyph", version, about = "Current weather with a condition glyph")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Without a subcommand, starts the interactive prompt.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, passed to OpenWeather as typed.
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,

        /// Print the outcome as JSON instead of display lines.
        #[arg(long)]
        json: bool,
    },

    /// Ask for city names until cancelled (Esc or Ctrl-C).
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Show { city, json }) => {
                let provider = load_provider()?;
                show(provider.as_ref(), &city.join(" "), json).await
            }
            Some(Command::Interactive) | None => {
                let provider = load_provider()?;
                interactive(provider.as_ref()).await
            }
        }
    }
}

fn load_provider() -> anyhow::Result<Box<dyn WeatherProvider>> {
    let path = Config::config_file_path()?;
    tracing::debug!(path = %path.display(), "loading configuration");

    let config = Config::load_from(&path)?;
    let provider = provider_from_config(&config)?;
    tracing::debug!(?provider, "weather provider ready");
    Ok(provider)
}

fn configure() -> anyhow::Result<ExitCode> {
    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let mut config = Config::load()?;
    config.set_api_key(api_key.trim().to_string());
    let path = config.save()?;

    tracing::debug!(path = %path.display(), "saved configuration");
    println!("Saved API key to {}", path.display());
    Ok(ExitCode::SUCCESS)
}

async fn show(provider: &dyn WeatherProvider, city: &str, json: bool) -> anyhow::Result<ExitCode> {
    let outcome = lookup(provider, &WeatherQuery::new(city)).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?
        );
    } else {
        let mut display = WeatherDisplay::default();
        display.apply(&outcome);
        println!("{}", render(&display));
    }

    Ok(exit_code(&outcome))
}

async fn interactive(provider: &dyn WeatherProvider) -> anyhow::Result<ExitCode> {
    let mut display = WeatherDisplay::default();

    loop {
        let city = match Text::new("Enter city name:").prompt() {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                tracing::debug!("interactive session cancelled");
                break;
            }
            Err(err) => return Err(err).context("Failed to read city name"),
        };

        let outcome = lookup(provider, &WeatherQuery::new(city)).await;
        tracing::debug!(error = outcome.is_error(), "display updated");
        display.apply(&outcome);
        println!("{}\n", render(&display));
    }

    Ok(ExitCode::SUCCESS)
}

fn render(display: &WeatherDisplay) -> String {
    display.lines().join("\n")
}

fn exit_code(outcome: &Outcome) -> ExitCode {
    if outcome.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
