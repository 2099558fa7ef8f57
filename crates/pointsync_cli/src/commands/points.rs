//! Local point editing commands.

use super::open_client;
use pointsync_protocol::{encode_points, Point};
use std::path::Path;

/// Adds a point to the local set.
pub fn add(
    state_dir: &Path,
    name: String,
    lat: f64,
    lng: f64,
    id: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = open_client(state_dir)?;
    let point = match id {
        Some(id) => Point::with_id(id, name, lat, lng)?,
        None => Point::new(name, lat, lng)?,
    };
    client.add_point(point.clone())?;
    println!("Added {} ({})", point.name, point.id);
    Ok(())
}

/// Deletes a point from the local set.
pub fn delete(state_dir: &Path, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = open_client(state_dir)?;
    if client.delete_point(id)? {
        println!("Deleted {id}; the deletion is sent on the next sync");
        Ok(())
    } else {
        Err(format!("No point with id {id}").into())
    }
}

/// Lists the local points.
pub fn list(state_dir: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = open_client(state_dir)?;
    let points = client.points();

    match format {
        "json" => {
            let bytes = encode_points(&points)?;
            println!("{}", String::from_utf8(bytes)?);
        }
        _ => {
            if points.is_empty() {
                println!("No points");
            }
            for point in points.iter() {
                println!(
                    "{:<38} {:>10.5} {:>11.5}  {}",
                    point.id, point.lat, point.lng, point.name
                );
            }
        }
    }
    Ok(())
}
