//! navsim - synthetic walk generator for local testing
//!
//! Emits a JSONL sensor-event stream on stdout: a destination command
//! followed by interleaved orientation, pressure, and location samples for
//! a straight-line walk from the start point to the destination.
//!
//! Usage:
//!   cargo run --bin navsim -- --start "43.0731,-89.4012" \
//!       --dest "43.0898,-89.4154" --name "Picnic Point" \
//!       | cargo run --bin compass-core -- --replay -

use clap::Parser;
use compass_core::domain::geo::{self, parse_coordinate, GeoPoint};
use compass_core::domain::types::SensorEvent;

#[derive(Parser, Debug)]
#[command(name = "navsim", version, about = "Synthetic sensor-event walk generator")]
struct Args {
    /// Start coordinates as "lat,lon"
    #[arg(long, default_value = "43.0731,-89.4012", value_parser = parse_coordinate)]
    start: GeoPoint,

    /// Destination coordinates as "lat,lon"
    #[arg(long, default_value = "43.0898,-89.4154", value_parser = parse_coordinate)]
    dest: GeoPoint,

    /// Destination name carried on the destination command
    #[arg(long)]
    name: Option<String>,

    /// Number of location steps between start and destination
    #[arg(long, default_value_t = 50)]
    steps: u32,

    /// Baseline pressure at the start point (hPa)
    #[arg(long, default_value_t = 1001.0)]
    pressure_hpa: f64,
}

fn emit(event: &SensorEvent) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

/// Rotation-vector quaternion for a device held flat, yawed to `azimuth_deg`
fn yaw_rotation_vector(azimuth_deg: f64) -> SensorEvent {
    let half = (-azimuth_deg).to_radians() / 2.0;
    SensorEvent::RotationVector { x: 0.0, y: 0.0, z: half.sin(), w: half.cos() }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let start = args.start;
    let destination = args.dest;

    emit(&SensorEvent::SetDestination {
        lat: Some(destination.lat),
        lon: Some(destination.lon),
        name: args.name.clone(),
    })?;

    let steps = args.steps.max(1);
    for step in 0..=steps {
        let t = step as f64 / steps as f64;
        let position = GeoPoint::new(
            start.lat + (destination.lat - start.lat) * t,
            start.lon + (destination.lon - start.lon) * t,
        );

        // Walker faces the destination, with a small sinusoidal sway
        let bearing = geo::initial_bearing(position, destination);
        let sway = 4.0 * (step as f64 * 0.7).sin();
        emit(&yaw_rotation_vector(geo::normalize_degrees(bearing + sway)))?;

        // Gentle pressure drift to exercise the altimeter
        emit(&SensorEvent::Pressure { hpa: args.pressure_hpa - t * 0.4 })?;

        emit(&SensorEvent::Location { lat: position.lat, lon: position.lon })?;
    }

    Ok(())
}
