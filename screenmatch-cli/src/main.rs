use clap::Parser;
use screenmatch::image::io::load_rgb_image;
use screenmatch::settings::seconds_to_duration;
use screenmatch::{
    Finder, Location, MatchMode, Pattern, Rectangle, ScreenSource, Settings, StaticScreen,
    VanishOutcome,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "screenmatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum WaitConfig {
    #[default]
    None,
    Appear,
    Vanish,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SettingsJson {
    min_similarity: f64,
    auto_wait_timeout: f64,
    wait_scan_rate: f64,
    locale: String,
    platform: String,
    image_root: PathBuf,
    debug_image: bool,
    debug_image_path: Option<PathBuf>,
}

impl Default for SettingsJson {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            min_similarity: settings.min_similarity(),
            auto_wait_timeout: settings.auto_wait_timeout,
            wait_scan_rate: settings.wait_scan_rate,
            locale: settings.locale,
            platform: settings.platform,
            image_root: settings.image_root,
            debug_image: settings.debug_image,
            debug_image_path: None,
        }
    }
}

impl From<SettingsJson> for Settings {
    fn from(value: SettingsJson) -> Self {
        let mut settings = Settings::default()
            .with_min_similarity(value.min_similarity)
            .with_auto_wait_timeout(value.auto_wait_timeout)
            .with_wait_scan_rate(value.wait_scan_rate)
            .with_locale(value.locale)
            .with_platform(value.platform)
            .with_image_root(value.image_root);
        settings.debug_image = value.debug_image;
        if let Some(path) = value.debug_image_path {
            settings.debug_image_path = path;
        }
        settings
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
struct RegionJson {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl From<RegionJson> for Rectangle {
    fn from(value: RegionJson) -> Self {
        Rectangle::new(value.x, value.y, value.width, value.height)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    pattern: String,
    pattern_path: Option<PathBuf>,
    haystack_path: Option<PathBuf>,
    mode: String,
    similarity: Option<f64>,
    region: Option<RegionJson>,
    wait: WaitConfig,
    timeout: Option<f64>,
    output_path: Option<PathBuf>,
    settings: SettingsJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            pattern_path: None,
            haystack_path: None,
            mode: MatchMode::Single.to_string(),
            similarity: None,
            region: None,
            wait: WaitConfig::None,
            timeout: None,
            output_path: None,
            settings: SettingsJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct LocationRecord {
    x: i32,
    y: i32,
}

impl From<Location> for LocationRecord {
    fn from(value: Location) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    pattern: String,
    mode: String,
    similarity: f64,
    matches: Vec<LocationRecord>,
    click: Option<LocationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vanish: Option<&'static str>,
}

fn screen_source(config: &Config) -> Result<Arc<dyn ScreenSource>, Box<dyn std::error::Error>> {
    if let Some(path) = &config.haystack_path {
        return Ok(Arc::new(StaticScreen::new(load_rgb_image(path)?)));
    }
    live_screen()
}

#[cfg(feature = "xcap")]
fn live_screen() -> Result<Arc<dyn ScreenSource>, Box<dyn std::error::Error>> {
    Ok(Arc::new(screenmatch::XcapScreen::new()))
}

#[cfg(not(feature = "xcap"))]
fn live_screen() -> Result<Arc<dyn ScreenSource>, Box<dyn std::error::Error>> {
    Err("haystack_path is required when built without the xcap feature".into())
}

fn vanish_name(outcome: VanishOutcome) -> &'static str {
    match outcome {
        VanishOutcome::Vanished => "vanished",
        VanishOutcome::StillPresent => "still_present",
        VanishOutcome::NotApplicable => "not_applicable",
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("screenmatch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.pattern.is_empty() && config.pattern_path.is_none() {
        return Err("pattern or pattern_path must be set in the config".into());
    }

    let source = screen_source(&config)?;
    let settings: Settings = config.settings.into();
    let finder = Finder::new(settings, source);

    let mut pattern = match &config.pattern_path {
        Some(path) => Pattern::from_path(path, finder.settings()),
        None => finder.pattern(config.pattern.as_str()),
    };
    if let Some(similarity) = config.similarity {
        pattern.similar(similarity);
    }
    let region = config.region.map(Rectangle::from);
    let timeout = config.timeout.map(seconds_to_duration);

    let mut vanish = None;
    let matches = match config.wait {
        WaitConfig::None => finder.match_template_named(&pattern, region, &config.mode)?,
        WaitConfig::Appear => finder
            .wait_for_appearance(&pattern, timeout, region)?
            .into_iter()
            .collect(),
        WaitConfig::Vanish => {
            vanish = Some(vanish_name(finder.wait_for_vanish(&pattern, timeout, region)?));
            Vec::new()
        }
    };

    let click = match matches.first() {
        Some(&top_left) => Some(pattern.target_location(top_left)?.into()),
        None => None,
    };
    let output = Output {
        pattern: pattern.requested_name().to_string(),
        mode: config.mode,
        similarity: pattern.similarity(),
        matches: matches.into_iter().map(LocationRecord::from).collect(),
        click,
        vanish,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
