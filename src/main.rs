use std::sync::Arc;

use anyhow::Result;

use wxtrack_core::{AppError, Config, ConfigError};
use wxtrack_weather::{
    ConnectivityGate, DisplayState, FixedGate, ObservationStore, ScreenModel, Snapshot,
    SystemGate, WeatherProvider, WeatherRepository,
};

#[tokio::main]
async fn main() -> Result<()> {
    wxtrack_core::init()?;

    if let Err(e) = run().await {
        tracing::error!("wxtrack failed: {}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

/// Composition point: builds the gate, store and provider, wires them into
/// the repository and screen model, then runs one search session from argv.
async fn run() -> Result<(), AppError> {
    let (config, _validation) = Config::load_validated()?;
    tracing::info!("wxtrack started");

    let mut offline = false;
    let mut city: Option<String> = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--offline" => offline = true,
            _ => city = Some(arg),
        }
    }

    let api_key = config.weather.effective_api_key().ok_or_else(|| {
        ConfigError::MissingSetting("weather.api_key (or WEATHER_API_KEY)".to_string())
    })?;

    std::fs::create_dir_all(&config.config_dir)?;
    let store = Arc::new(
        ObservationStore::new(config.observations_db_path())
            .map_err(|e| AppError::Service(e.to_string()))?,
    );

    let provider = WeatherProvider::with_timeout(
        &api_key,
        &config.weather.base_url,
        std::time::Duration::from_secs(config.weather.timeout_secs),
    )
    .map_err(|e| AppError::Service(e.to_string()))?;

    let gate: Arc<dyn ConnectivityGate> = if offline {
        Arc::new(FixedGate::new(false))
    } else {
        Arc::new(SystemGate)
    };

    let repository = Arc::new(WeatherRepository::new(provider, store, gate));
    let screen = ScreenModel::new(repository);
    let mut notices = screen.notices();

    // Restore the last viewed city (refreshed if the network allows it).
    screen.initialize().await;

    if let Some(city) = city {
        screen.set_search_query(&city);
        screen.submit_search(&city).await;
    }

    render(&screen.current_state().display());

    while let Ok(notice) = notices.try_recv() {
        println!("* {}", notice.user_message());
    }

    screen.shutdown();
    Ok(())
}

fn render(display: &DisplayState) {
    match display {
        DisplayState::Empty => println!("No city selected. Run: wxtrack <city>"),
        DisplayState::Loading => println!("Loading..."),
        DisplayState::Error => println!("Something went wrong. Try again."),
        DisplayState::SearchResult(snapshot) => {
            println!("Search result:");
            print_snapshot(snapshot);
        }
        DisplayState::Detail(snapshot) => {
            println!("Current city:");
            print_snapshot(snapshot);
        }
    }
}

fn print_snapshot(snapshot: &Snapshot) {
    let loc = &snapshot.location;
    let cur = &snapshot.current;
    if loc.country.is_empty() {
        println!("  {}", loc.name);
    } else {
        println!("  {}, {}", loc.name, loc.country);
    }
    println!(
        "  {:.1}°C (feels like {:.1}°C), {}",
        cur.temp_c, cur.feels_like_c, cur.condition.text
    );
    println!(
        "  Humidity {}%, UV {:.1}",
        cur.humidity, cur.uv
    );
}
