use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use pestscan_core::{recommend, AnnotationFormat, DetectionPipeline, Overlay, TREATMENT_GUIDELINES};
use pestscan_field::{geometry_area, mock_indices, nearest_first, LatLon, MockWeatherSource, WeatherSource, RECOMMENDATIONS};
use pestscan_infer::{decode_data_url, decode_image, StubDetectionModel};
use pestscan_store::Seed;
use pestscan_types::{CropIndices, Geometry, NewCrop, NewFarm};
use tracing_subscriber::EnvFilter;

mod client;
mod session;

use client::ApiClient;
use session::SessionStore;

#[derive(Parser)]
#[command(name = "pestscan", version, about = "Plant pest detection and farm management")]
struct Cli {
    /// Base URL of the pestscan API.
    #[arg(long, env = "PESTSCAN_SERVER", default_value = "http://localhost:5000", global = true)]
    server: String,
    /// File holding the most recent scan results.
    #[arg(long, env = "PESTSCAN_SESSION_FILE", global = true)]
    session_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Home,
    /// Photograph analysis: detect pests in an image file or data URL.
    Scan {
        image: String,
        /// Write the image with detection boxes (.svg adds text labels).
        #[arg(long)]
        annotate: Option<PathBuf>,
    },
    /// Treatments for the last scan.
    Results,
    /// Agrovets, nearest first.
    Agrovets {
        /// Origin as LAT,LON.
        #[arg(long, value_parser = parse_lat_lon)]
        near: Option<LatLon>,
    },
    Farms {
        #[command(subcommand)]
        action: FarmCommand,
    },
    /// Vegetation index snapshot.
    Indices,
    Weather {
        #[arg(long, default_value_t = 5)]
        days: usize,
    },
}

#[derive(Subcommand)]
enum FarmCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        /// GeoJSON geometry (or Feature) with the farm outline.
        #[arg(long)]
        boundaries: PathBuf,
        /// Square metres; computed from the boundaries when omitted.
        #[arg(long)]
        area: Option<f64>,
        #[arg(long, default_value = "Kenya")]
        location: String,
    },
    Crops {
        farm_id: u64,
    },
    AddCrop {
        farm_id: u64,
        #[arg(long)]
        name: String,
        /// RFC 3339 timestamp, e.g. 2024-03-01T00:00:00Z.
        #[arg(long)]
        planted: DateTime<Utc>,
        /// JSON file with ndvi/msavi/reci/ndmi series.
        #[arg(long)]
        indices: Option<PathBuf>,
        /// JSON file with soil measurements.
        #[arg(long)]
        soil: Option<PathBuf>,
    },
}

fn parse_lat_lon(raw: &str) -> Result<LatLon, String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {raw}"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("longitude: {e}"))?;
    Ok(LatLon { lat, lon })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api = ApiClient::new(&cli.server);
    let session = SessionStore::new(cli.session_file);

    match cli.command {
        Command::Home => {
            println!("Plant Disease Detection");
            println!("Take a photo of your plant to identify pests and diseases.");
            println!();
            println!("  pestscan scan <image>   scan a plant");
            println!("  pestscan results        treatments for the last scan");
            println!("  pestscan agrovets       find agrovets");
            println!("  pestscan farms list     manage farms");
        }
        Command::Scan { image, annotate } => scan(&image, annotate.as_deref(), &session).await?,
        Command::Results => results(&api, &session).await?,
        Command::Agrovets { near } => {
            let origin = near.unwrap_or(LatLon::NAIROBI);
            let agrovets = api.agrovets().await?;
            for (a, km) in nearest_first(origin, &agrovets) {
                println!("{} ({km:.2} km)", a.name);
                println!("  {}", a.location);
                println!("  {}", a.contact);
                println!("  {:.4}, {:.4}", a.latitude, a.longitude);
            }
        }
        Command::Farms { action } => farms(&api, action).await?,
        Command::Indices => {
            let idx = mock_indices();
            println!("NDVI   {:.2}", idx.ndvi);
            println!("MSAVI  {:.2}", idx.msavi);
            println!("RECI   {:.2}", idx.reci);
            println!("NDMI   {:.2}", idx.ndmi);
        }
        Command::Weather { days } => {
            let today = Utc::now().date_naive();
            for day in MockWeatherSource.forecast(today, days) {
                println!(
                    "{}  {}°C - {}°C  humidity {}%  rain {}mm  wind {}km/h",
                    day.date,
                    day.temperature.min,
                    day.temperature.max,
                    day.humidity,
                    day.rainfall,
                    day.wind_speed
                );
            }
            println!();
            println!("Based on current conditions:");
            for r in RECOMMENDATIONS {
                println!("  - {r}");
            }
        }
    }

    Ok(())
}

async fn scan(source: &str, annotate: Option<&Path>, session: &SessionStore) -> anyhow::Result<()> {
    let img = if source.starts_with("data:") {
        decode_data_url(source)
    } else {
        let bytes = std::fs::read(source).with_context(|| format!("reading {source}"))?;
        decode_image(&bytes)
    };

    // The model ships with its own label set; no server round-trip for inference.
    let pipeline = DetectionPipeline::new(Arc::new(StubDetectionModel), Seed::default().pests);

    println!("Analyzing image...");
    let outcome = match img {
        Ok(img) => pipeline.scan(&img).await.map(|report| (img, report)),
        Err(cause) => Err(cause.into()),
    };
    let (img, report) = match outcome {
        Ok(ok) => ok,
        Err(e) => {
            tracing::error!(cause = %e.cause, "detection failed");
            return Err(anyhow!(e));
        }
    };

    if report.results.is_empty() {
        println!("No pests or diseases detected.");
    }
    for r in &report.results {
        println!("{}  severity: {}", r.label(), r.severity);
    }

    if let Some(path) = annotate {
        let overlay = Overlay::for_image(&img, &report.results);
        let format = AnnotationFormat::from_path(path);
        if !format.has_labels() {
            tracing::warn!(path = %path.display(), "raster annotation has boxes only");
            println!("Note: labels are only drawn in .svg output; {} gets boxes only.", path.display());
        }
        match format {
            AnnotationFormat::Svg => std::fs::write(path, overlay.to_svg(&img)?)?,
            AnnotationFormat::Raster => overlay.draw(&img).save(path)?,
        }
        println!("Annotated image written to {}", path.display());
    }

    session.save(&report)?;
    tracing::debug!(path = %session.path().display(), scan_id = %report.scan_id, "scan results stored");
    println!("Analysis complete. Run `pestscan results` for treatments.");
    Ok(())
}

async fn results(api: &ApiClient, session: &SessionStore) -> anyhow::Result<()> {
    let report = session.load()?;
    let Some(report) = report.filter(|r| !r.results.is_empty()) else {
        println!("No scan results available. Please scan a plant first.");
        return Ok(());
    };

    let pests = api.pests().await?;
    println!("Detection Results");
    for rec in recommend(&report.results, &pests) {
        let r = rec.result;
        println!();
        println!("{}  [{}% Match]  [{} Severity]", r.name, r.confidence, capitalize(r.severity.as_str()));
        println!("  {}", r.description);
        match rec.treatment() {
            Some(t) => {
                println!("  Recommended Treatments:");
                println!("    Organic:  {}", t.organic);
                println!("    Chemical: {}", t.chemical);
            }
            None => println!("  No treatment information for this detection."),
        }
        println!("  Treatment Guidelines:");
        for g in TREATMENT_GUIDELINES {
            println!("    - {g}");
        }
    }
    Ok(())
}

async fn farms(api: &ApiClient, action: FarmCommand) -> anyhow::Result<()> {
    match action {
        FarmCommand::List => {
            for f in api.farms().await? {
                println!("#{} {}  {:.0} m²  {}  (created {})", f.id, f.name, f.area, f.location, f.created_at);
            }
        }
        FarmCommand::Create {
            name,
            boundaries,
            area,
            location,
        } => {
            let boundaries = read_geometry(&boundaries)?;
            let area = match area {
                Some(area) => area,
                None => geometry_area(&Geometry::from_json(&boundaries)?),
            };
            let farm = api
                .create_farm(&NewFarm {
                    name,
                    boundaries,
                    area,
                    location,
                })
                .await?;
            println!("Farm saved: #{} {} ({:.0} m²)", farm.id, farm.name, farm.area);
        }
        FarmCommand::Crops { farm_id } => {
            for c in api.crops(farm_id).await? {
                let latest = c.indices.ndvi.last().map(|s| s.value);
                match latest {
                    Some(ndvi) => println!("#{} {} planted {}  NDVI {ndvi:.2}", c.id, c.name, c.planting_date),
                    None => println!("#{} {} planted {}", c.id, c.name, c.planting_date),
                }
            }
        }
        FarmCommand::AddCrop {
            farm_id,
            name,
            planted,
            indices,
            soil,
        } => {
            let indices: CropIndices = match indices {
                Some(path) => read_json(&path)?,
                None => CropIndices::default(),
            };
            let soil_data = soil.map(|p| read_json(&p)).transpose()?;
            let crop = api
                .create_crop(
                    farm_id,
                    &NewCrop {
                        name,
                        planting_date: planted,
                        indices,
                        soil_data,
                    },
                )
                .await?;
            println!("Crop saved: #{} {} on farm #{}", crop.id, crop.name, crop.farm_id);
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

/// Accepts a bare geometry or a GeoJSON Feature wrapping one. The geometry is
/// returned verbatim once it parses as a polygon.
fn read_geometry(path: &Path) -> anyhow::Result<serde_json::Value> {
    let mut value: serde_json::Value = read_json(path)?;
    if let Some(geometry) = value.get_mut("geometry") {
        value = geometry.take();
    }
    Geometry::from_json(&value)?;
    Ok(value)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lat_lon_argument() {
        let p = parse_lat_lon("-1.2980, 36.8148").unwrap();
        assert_eq!(p, LatLon { lat: -1.298, lon: 36.8148 });
        assert!(parse_lat_lon("36.8").is_err());
        assert!(parse_lat_lon("north,east").is_err());
    }

    #[test]
    fn severity_badge_is_capitalized() {
        assert_eq!(capitalize("medium"), "Medium");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn feature_wrapper_is_unwrapped() {
        let path = std::env::temp_dir().join(format!("pestscan_feature_{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}}"#,
        )
        .unwrap();
        let g = read_geometry(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(g["type"], "Polygon");
        assert_eq!(g["coordinates"][0][1][0], 1);
    }

    #[test]
    fn cli_parses_scan_with_annotation() {
        let cli = Cli::try_parse_from(["pestscan", "scan", "leaf.jpg", "--annotate", "out.svg"]).unwrap();
        match cli.command {
            Command::Scan { image, annotate } => {
                assert_eq!(image, "leaf.jpg");
                assert_eq!(annotate.unwrap(), PathBuf::from("out.svg"));
            }
            _ => panic!("expected scan"),
        }
    }
}
