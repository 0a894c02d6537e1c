use std::sync::Arc;

use anyhow::{Context, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand};
use explorer_core::{
    Config, Country, CountryDirectory, FilterSpec, GraphQlDirectory, OpenWeatherClient, SortKey,
    SortOrder, SortSpec, WeatherController, WeatherState, apply,
};
use tracing::{debug, warn};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "countries",
    version,
    about = "Search countries and check the weather in their capitals"
)]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the weather API key and endpoints.
    Configure,

    /// Search countries by name (case-sensitive) and list them.
    Search {
        /// Name or regular expression, e.g. "Fra" or "^S".
        name: String,

        /// Keep only this continent code, e.g. "EU".
        #[arg(long)]
        continent: Option<String>,

        /// Keep only countries speaking this language code, e.g. "fr".
        #[arg(long)]
        language: Option<String>,

        /// Column to sort by: name or continent.
        #[arg(long, default_value = "name", value_parser = parse_sort_key)]
        sort: SortKey,

        /// Sort in descending order.
        #[arg(long)]
        desc: bool,
    },

    /// Show details and current capital weather for one country.
    Show {
        /// Name to search for.
        name: String,

        /// Pick the result with this country code when the search is ambiguous.
        #[arg(long)]
        code: Option<String>,
    },

    /// List continent codes usable with `--continent`.
    Continents,

    /// List language codes usable with `--language`.
    Languages,
}

fn parse_sort_key(value: &str) -> Result<SortKey, String> {
    SortKey::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { name, continent, language, sort, desc } => {
                let order = if desc { SortOrder::Descending } else { SortOrder::Ascending };
                let filter = FilterSpec::new(continent, language);
                search(&name, &filter, SortSpec::new(sort, order)).await
            }
            Command::Show { name, code } => show(&name, code.as_deref()).await,
            Command::Continents => {
                let directory = directory(&Config::load()?);
                for c in directory.continents().await.context("Failed to load continents")? {
                    println!("{:<4} {}", c.code, c.name);
                }
                Ok(())
            }
            Command::Languages => {
                let directory = directory(&Config::load()?);
                for l in directory.languages().await.context("Failed to load languages")? {
                    println!("{:<4} {}", l.code, l.name);
                }
                Ok(())
            }
        }
    }
}

fn directory(config: &Config) -> GraphQlDirectory {
    debug!(url = config.directory_url(), "using country directory");
    GraphQlDirectory::new(config.directory_url())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }
    config.set_api_key(api_key.trim().to_string());

    let api_url = inquire::Text::new("Weather API URL:")
        .with_default(&config.weather.api_url)
        .prompt()
        .context("Failed to read weather API URL")?;
    let image_url = inquire::Text::new("Weather icon base URL:")
        .with_default(&config.weather.image_url)
        .prompt()
        .context("Failed to read weather icon URL")?;

    config.weather.api_url = api_url;
    config.weather.image_url = image_url;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn search(name: &str, filter: &FilterSpec, sort: SortSpec) -> anyhow::Result<()> {
    let countries = directory(&Config::load()?).search(name).await?;
    let rows = apply(&countries, filter, &sort);

    if rows.is_empty() {
        println!("No countries found.");
        return Ok(());
    }

    print_table(&rows, sort);
    Ok(())
}

async fn show(name: &str, code: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let countries = directory(&config).search(name).await?;

    let country = match code {
        Some(code) => countries.iter().find(|c| c.code.eq_ignore_ascii_case(code)),
        None => countries.iter().find(|c| c.name == name).or_else(|| countries.first()),
    }
    .ok_or_else(|| anyhow!("No country matches '{name}'"))?;

    print_details(country);

    let settings = match config.weather_settings() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("\n{err}");
            return Ok(());
        }
    };

    let controller = WeatherController::new(Arc::new(OpenWeatherClient::new(settings)));
    let pending = controller.select(Some(country));

    if controller.snapshot().is_loading() {
        println!("\nLoading weather information...");
    }
    if let Some(handle) = pending {
        handle.await.context("Weather task panicked")?;
    }

    print_weather(country, &controller.snapshot());
    Ok(())
}

fn flag(country: &Country) -> String {
    country.flag().unwrap_or_else(|err| {
        warn!(country = %country.code, error = %err, "could not decode flag");
        String::new()
    })
}

fn header(title: &str, key: Option<SortKey>, sort: SortSpec) -> String {
    match key {
        Some(key) if key == sort.key => format!("{title} {}", sort.order.arrow()),
        _ => title.to_string(),
    }
}

fn print_table(rows: &[Country], sort: SortSpec) {
    let name_width = rows.iter().map(|c| c.name.chars().count()).max().unwrap_or(0).max(10) + 3;
    let capital_width = rows.iter().map(|c| c.capital.chars().count()).max().unwrap_or(0).max(7);

    println!(
        "{:<name_width$}  {:<capital_width$}  {}",
        header("Country", Some(SortKey::Name), sort),
        header("Capital", None, sort),
        header("Continent", Some(SortKey::Continent), sort),
    );

    for country in rows {
        println!(
            "{:<name_width$}  {:<capital_width$}  {}",
            format!("{} {}", country.name, flag(country)),
            country.capital,
            country.continent.name,
        );
    }
}

fn print_details(country: &Country) {
    println!("{} {} ({})", country.name, flag(country), country.code);
    println!("Capital: {}", country.capital);
    println!("Continent: {}", country.continent.name);

    println!("\nLanguages");
    for language in &country.languages {
        println!("  {}", language.name);
    }

    println!("\nCurrencies");
    for currency in &country.currencies {
        println!("  {currency}");
    }
}

fn print_weather(country: &Country, state: &WeatherState) {
    match state {
        WeatherState::Idle | WeatherState::Loading => {}
        WeatherState::Failed(message) => eprintln!("{message}"),
        WeatherState::Success(weather) => {
            println!("\nWeather for {}", country.capital);
            println!("  Timezone: {}", weather.timezone_label());
            if let Some(local) = weather.local_time(Utc::now()) {
                println!("  Local time: {}", local.format("%H:%M"));
            }
            println!("  Temperature: {}", weather.temperature);
            for condition in &weather.conditions {
                println!("  {} ({})", condition.description, condition.icon);
            }
        }
    }
}
