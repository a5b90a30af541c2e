use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use futures::FutureExt;
use locbridge_channel::{
    BridgeConfig, LocationBridge, LocationReading, MemoryPermissions, MemoryProviders,
    MethodCall, MethodResponse, Permission, PermissionStatus, codec,
};
use owo_colors::OwoColorize;
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "locbridge-sim")]
#[command(about = "Drive the location bridge against a simulated device", long_about = None)]
struct Cli {
    /// Bridge configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulated device: granted permissions and provider caches (JSON)
    #[arg(long)]
    fixture: Option<PathBuf>,
    /// How the user answers a permission prompt, if one is shown
    #[arg(long, value_enum)]
    grant: Option<Answer>,
    /// Channel method to call
    method: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Answer {
    Yes,
    No,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Fixture {
    granted: Vec<Permission>,
    providers: Vec<ProviderFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProviderFixture {
    name: String,
    #[serde(default = "enabled_by_default")]
    enabled: bool,
    #[serde(default)]
    reading: Option<ReadingFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReadingFixture {
    latitude: f64,
    longitude: f64,
    accuracy: f32,
    #[serde(default)]
    timestamp: u64,
}

const fn enabled_by_default() -> bool {
    true
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BridgeConfig::default(),
    };
    let fixture = match &cli.fixture {
        Some(path) => load_fixture(path)?,
        None => Fixture::default(),
    };

    let (permissions, providers) = build_device(&fixture);
    let bridge = LocationBridge::with_config(config, permissions, providers);
    println!(
        "{} {} on channel {}",
        "📡 Calling".green().bold(),
        cli.method.bold(),
        bridge.config().channel.cyan()
    );

    let call = MethodCall::new(cli.method);
    let mut reply = Box::pin(bridge.handle(&call));
    let response = match (&mut reply).now_or_never() {
        Some(response) => response,
        None => {
            let Some(answer) = cli.grant else {
                println!(
                    "{}",
                    "⏳ Permission prompt shown; pass --grant yes|no to answer it.".yellow()
                );
                return Ok(());
            };
            let status = match answer {
                Answer::Yes => PermissionStatus::Granted,
                Answer::No => PermissionStatus::Denied,
            };
            println!("{} {status:?}", "👆 User answers".yellow().bold());
            bridge
                .gateway()
                .backend()
                .set_status(Permission::FineLocation, status);
            bridge.on_request_permissions_result(bridge.config().request_code, &[status]);
            reply
                .now_or_never()
                .context("Permission answer did not resolve the call")?
        }
    };

    let encoded = codec::encode_response(&response).context("Failed to encode reply")?;
    println!("{}", String::from_utf8_lossy(&encoded));
    print_summary(&response);
    Ok(())
}

fn load_fixture(path: &Path) -> Result<Fixture> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid fixture {}", path.display()))
}

fn build_device(fixture: &Fixture) -> (MemoryPermissions, MemoryProviders) {
    let permissions = MemoryPermissions::new();
    for permission in &fixture.granted {
        permissions.set_status(*permission, PermissionStatus::Granted);
    }

    let providers = MemoryProviders::new();
    for provider in &fixture.providers {
        let reading = provider.reading.as_ref().map(|reading| {
            LocationReading::new(
                provider.name.as_str(),
                reading.latitude,
                reading.longitude,
                reading.accuracy,
            )
            .at(reading.timestamp)
        });
        providers.set_reading(&provider.name, reading);
        providers.set_enabled(&provider.name, provider.enabled);
    }

    (permissions, providers)
}

fn print_summary(response: &MethodResponse) {
    match response {
        MethodResponse::Success(value) => println!("{} {value}", "✅ Success:".green().bold()),
        MethodResponse::Error { code, message, .. } => {
            println!("{} {code} ({message})", "❌ Error:".red().bold());
        }
        MethodResponse::NotImplemented => {
            println!("{}", "⚠️ Not implemented".yellow().bold());
        }
    }
}
