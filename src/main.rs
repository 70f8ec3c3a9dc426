use afrocarib_locator::config::LocatorConfig;
use afrocarib_locator::location::{
    BigDataCloudClient, LocalityResult, LocationResolver, Outcome, ReportedPosition, StatusSink, Timed,
};
use clap::Parser;
use std::path::PathBuf;

/// Afrocarib locator — fills the address field from the device position,
/// falling back to the network origin (IP) when the position is missing,
/// refused, or too imprecise.
///
/// Examples:
///   afrocarib-locate
///   afrocarib-locate --lat 14.6161 --lon -61.0588 --accuracy 25
///   afrocarib-locate --geolocation denied --json
///   afrocarib-locate --serve --port 3030
#[derive(Parser)]
#[command(name = "afrocarib-locate", version, about, long_about = None)]
struct Cli {
    /// Device latitude.
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Device longitude.
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Accuracy radius of the device fix, in meters.
    #[arg(long)]
    accuracy: Option<f64>,

    /// Geolocation outcome: ok, unsupported, denied, timeout, unavailable.
    /// Defaults to "ok" with --lat/--lon, "unsupported" without.
    #[arg(long)]
    geolocation: Option<Outcome>,

    /// Reverse-geocoding endpoint override.
    #[arg(long)]
    endpoint: Option<String>,

    /// Locality language (BigDataCloud localityLanguage).
    #[arg(long)]
    language: Option<String>,

    /// Fixes less precise than this radius (meters) use the IP lookup.
    #[arg(long)]
    accuracy_threshold: Option<f64>,

    /// Config file. Defaults to ~/.afrocarib/locator.json.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the full resolution as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Log filter (error, warn, info, debug, trace). RUST_LOG wins if set.
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Run the HTTP API instead of a single lookup.
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 3030)]
    port: u16,
}

/// Mirrors the address field's spinner on stderr.
struct ConsoleStatus;

impl StatusSink for ConsoleStatus {
    fn start(&self) {
        eprintln!("  Localisation en cours…");
    }

    fn finish(&self, _locality: &LocalityResult) {}
}

fn load_config(cli: &Cli) -> LocatorConfig {
    let loaded = match &cli.config {
        Some(path) => LocatorConfig::load_from(path),
        None => LocatorConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if let Some(ref endpoint) = cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(ref language) = cli.language {
        config.language = language.clone();
    }
    if let Some(threshold) = cli.accuracy_threshold {
        config.accuracy_threshold_m = threshold;
    }
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    config
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level)).init();

    let config = load_config(&cli);

    if cli.serve {
        if let Err(e) = afrocarib_locator::server::start(&cli.host, cli.port, config).await {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let device = Timed::new(ReportedPosition::from_report(cli.geolocation, cli.lat, cli.lon, cli.accuracy));
    let geocoder = BigDataCloudClient::from_config(&config);

    let resolution = LocationResolver::new(&device, &geocoder)
        .with_config(&config)
        .resolve(&ConsoleStatus)
        .await;

    if cli.json {
        match serde_json::to_string_pretty(&resolution) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    if let Some(ref reason) = resolution.fallback {
        eprintln!("  IP fallback: {}", reason);
    }
    // An empty line means "unknown location", like an empty address field.
    println!("{}", resolution.locality);
}
