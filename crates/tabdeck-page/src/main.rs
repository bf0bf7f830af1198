//! tabdeck: the new tab page on the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tabdeck_calendar::message;
use tabdeck_page::{options, page, search, PageServices, SaveForm};
use tabdeck_weather::{Coordinate, FixedPosition, SessionOverride};

#[derive(Parser)]
#[command(name = "tabdeck", about = "Greeting, agenda and weather for a new tab")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the page.
    Show {
        /// Show weather for this position for this run only; nothing is saved.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Label for --lat/--lon
        #[arg(long, requires = "lat")]
        label: Option<String>,
    },

    /// Save settings, as the options screen does.
    Save {
        #[arg(long, default_value = "")]
        name: String,
        /// IANA time zone; defaults to the local zone
        #[arg(long, default_value = "")]
        tz: String,
        /// City, ZIP, or any place name
        #[arg(long, default_value = "")]
        location: String,
        /// Calendar id to show; repeat for more
        #[arg(long = "calendar")]
        calendars: Vec<String>,
    },

    /// Save a position as the weather location.
    UsePosition {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Sign in and list calendars.
    Calendars,

    /// Send one JSON message to the calendar backend.
    Message { json: String },

    /// Print the web search URL for a query.
    Search {
        #[arg(trailing_var_arg = true)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tabdeck_core::init()?;
    let cli = Cli::parse();

    if let Command::Search { query } = &cli.command {
        if let Some(url) = search::search_url(&query.join(" ")) {
            println!("{}", url);
        }
        return Ok(());
    }

    let app = tabdeck_core::App::new()?;
    let services = PageServices::from_app(&app).context("Failed to set up services")?;

    match cli.command {
        Command::Show { lat, lon, label } => {
            let session = lat.zip(lon).map(|(lat, lon)| {
                let coordinate = Coordinate::new(lat, lon);
                SessionOverride {
                    coordinate,
                    label: label.unwrap_or_else(|| coordinate.display_label()),
                }
            });

            let state = page::boot(&services, session.as_ref())
                .await
                .map_err(|e| anyhow::anyhow!("{}: {}", e.user_message(), e))?;
            println!("{}", state);
        }
        Command::Save {
            name,
            tz,
            location,
            calendars,
        } => {
            let form = SaveForm {
                name,
                timezone: tz,
                location,
                calendar_ids: calendars,
            };
            let settings = options::save(&services, form)
                .await
                .map_err(|e| anyhow::anyhow!("{}: {}", e.user_message(), e))?;

            if settings.location_coords.is_none() && !settings.location_query.is_empty() {
                eprintln!(
                    "Could not find {:?}; it will be looked up again later",
                    settings.location_query
                );
            }
            println!("Saved");
        }
        Command::UsePosition { lat, lon } => {
            let fix = lat.zip(lon).map(|(lat, lon)| Coordinate::new(lat, lon));
            let services = services.with_position(FixedPosition(fix));
            let status = options::use_current_position(&services)
                .await
                .map_err(|e| anyhow::anyhow!("{}: {}", e.user_message(), e))?;
            println!("{}", status);
        }
        Command::Calendars => match options::sign_in(&services).await {
            Ok(calendars) => {
                for calendar in calendars {
                    let marker = if calendar.is_primary { "*" } else { " " };
                    println!("{} {}  {}", marker, calendar.id, calendar.summary);
                }
            }
            Err(e) => eprintln!("{}", e),
        },
        Command::Message { json } => {
            let request: serde_json::Value =
                serde_json::from_str(&json).context("Message is not valid JSON")?;
            let response = message::handle(&services.calendar, &request).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Search { .. } => {}
    }

    Ok(())
}
