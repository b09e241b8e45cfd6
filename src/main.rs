mod agent;
mod ai;
mod config;
mod logger;
mod services;

use agent::CareAssistant;
use ai::PlantContext;
use anyhow::Result;
use config::Config;
use services::{PlantIdentifier, StoreLocator, WeatherService};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();
    log::info!("🌱 Sprout started");

    let config = Config::default();
    log::info!("configuration loaded");

    let mut assistant = CareAssistant::new(&config);
    let identifier = PlantIdentifier::new(
        config.plantnet_api_key.clone(),
        config.plantnet_project.clone(),
    )
    .with_base_url(config.plantnet_base_url.clone());

    println!("🌱 {} - plant care assistant", config.assistant_name);
    println!(
        "Ask about plant care, or use /identify <image>, /weather <lat> <lon>, \
         /stores <lat> <lon>, /clear, /quit"
    );
    if !config.chat_configured {
        println!("(no API key configured - answering with offline care tips)");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.split_whitespace().next() {
            Some("/quit") | Some("/exit") => break,
            Some("/clear") => {
                assistant.clear_history();
                println!("History cleared.");
            }
            Some("/stats") => println!("{}", assistant.storage_stats()),
            Some("/history") => {
                for message in assistant.history() {
                    println!("[{}] {}", message.role, message.content);
                }
            }
            Some("/identify") => {
                identify_command(input, &identifier, &mut assistant).await;
            }
            Some("/weather") => weather_command(input, &config).await,
            Some("/stores") => stores_command(input, &config).await,
            _ => {
                let outcome = assistant.reply(input).await;
                println!("{}", render_markup(&outcome.message));
            }
        }
    }

    log::info!("🌱 Sprout stopped");
    Ok(())
}

async fn identify_command(
    input: &str,
    identifier: &PlantIdentifier,
    assistant: &mut CareAssistant,
) {
    let mut args = input.split_whitespace().skip(1);
    let path = match args.next() {
        Some(path) => path,
        None => {
            println!("Usage: /identify <image-path> [organ]");
            return;
        }
    };
    let organ = args.next().unwrap_or("leaf");

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("Could not read {}: {}", path, e);
            return;
        }
    };

    match identifier.identify(&bytes, path, &[organ]).await {
        Ok(identification) => {
            if identification.fallback {
                println!("(identification service unavailable - showing sample matches)");
            }
            for plant in &identification.matches {
                println!(
                    "• {} ({}) - {}% confidence",
                    plant.scientific_name,
                    if plant.common_names.is_empty() {
                        "No common names".to_string()
                    } else {
                        plant.common_names.join(", ")
                    },
                    plant.confidence
                );
            }
            if let Some(best) = identification.matches.first() {
                let context: PlantContext = best.into();
                println!(
                    "I can help you with specific care questions about {}!",
                    context.scientific_name
                );
                assistant.set_plant_context(Some(context));
            } else {
                println!("No plant matches found. Please try a clearer photo.");
            }
        }
        Err(e) => println!("Identification failed: {}", e),
    }
}

async fn weather_command(input: &str, config: &Config) {
    if !config.weather_configured {
        println!("Weather API key not configured.");
        return;
    }
    let (lat, lon) = match parse_coords(input) {
        Some(coords) => coords,
        None => {
            println!("Usage: /weather <lat> <lon>");
            return;
        }
    };

    let service = WeatherService::new(config.weather_api_key.clone().unwrap_or_default())
        .with_base_url(config.weather_base_url.clone());
    match service.current(lat, lon).await {
        Ok(report) => println!("{}", WeatherService::format_report(&report)),
        Err(e) => println!("Weather lookup failed: {}", e),
    }
}

async fn stores_command(input: &str, config: &Config) {
    if !config.places_configured {
        println!("Places API key not configured.");
        return;
    }
    let (lat, lon) = match parse_coords(input) {
        Some(coords) => coords,
        None => {
            println!("Usage: /stores <lat> <lon>");
            return;
        }
    };

    let locator = StoreLocator::new(config.places_api_key.clone().unwrap_or_default())
        .with_base_url(config.places_base_url.clone());
    match locator
        .find_plant_stores(lat, lon, services::stores::DEFAULT_RADIUS_M)
        .await
    {
        Ok(stores) if stores.is_empty() => println!("No plant stores found nearby."),
        Ok(stores) => {
            for store in &stores {
                println!("{}\n", StoreLocator::summary(store));
            }
        }
        Err(e) => println!("Store search failed: {}", e),
    }
}

fn parse_coords(input: &str) -> Option<(f64, f64)> {
    let mut args = input.split_whitespace().skip(1);
    let lat = args.next()?.parse().ok()?;
    let lon = args.next()?.parse().ok()?;
    Some((lat, lon))
}

/// Translates the model's asterisk emphasis into terminal styling.
fn render_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut bold = false;
    let mut italic = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '*' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'*') {
            chars.next();
            out.push_str(if bold { "\x1b[0m" } else { "\x1b[1m" });
            bold = !bold;
        } else {
            out.push_str(if italic { "\x1b[0m" } else { "\x1b[3m" });
            italic = !italic;
        }
    }
    if bold || italic {
        out.push_str("\x1b[0m");
    }
    out
}
