//! JSON trajectory records.
//!
//! Input documents are arrays of objects like:
//!
//! ```json
//! [
//!   {"object_id": "17", "object_type": "car", "coordinates": "1.0,2.0 2.0,3.0"}
//! ]
//! ```
//!
//! `coordinates` is a whitespace-separated list of `x,y` pairs in path order.
//! `object_id` may also be a JSON number.

use log::{info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{Coordinate, Error, Result, Trajectory};

/// One trajectory as it appears in the input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub object_id: String,
    pub object_type: String,
    pub coordinates: String,
}

impl TrajectoryRecord {
    /// Parse the `coordinates` field. Components past the second in a pair
    /// are ignored.
    pub fn parse_coordinates(&self) -> Result<Vec<Coordinate>> {
        self.coordinates
            .split_whitespace()
            .enumerate()
            .map(|(pos, pair)| {
                let mut parts = pair.split(',');
                let x = parts.next().and_then(|v| v.trim().parse::<f64>().ok());
                let y = parts.next().and_then(|v| v.trim().parse::<f64>().ok());
                match (x, y) {
                    (Some(x), Some(y)) => Ok(Coordinate::new(x, y)),
                    _ => Err(Error::invalid(
                        "coordinates",
                        format!(
                            "trajectory '{}' pair {pos} ('{pair}') is not an x,y pair",
                            self.object_id
                        ),
                    )),
                }
            })
            .collect()
    }

    /// Convert into a validated [`Trajectory`].
    pub fn into_trajectory(self) -> Result<Trajectory> {
        let points = self.parse_coordinates()?;
        Trajectory::new(self.object_id, self.object_type, points)
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, found {other}"
        ))),
    }
}

/// Parse a JSON array of records into trajectories, keeping only the first
/// `sample_size` records when given.
///
/// Errors name the offending record index.
///
/// # Example
/// ```
/// use trajectory_cluster::load_trajectories;
///
/// let json = r#"[
///     {"object_id": "1", "object_type": "car", "coordinates": "1.0,2.0 2.0,3.0"},
///     {"object_id": 2, "object_type": "bus", "coordinates": "1.5,2.5 2.5,3.5"}
/// ]"#;
///
/// let trajectories = load_trajectories(json, None).unwrap();
/// assert_eq!(trajectories.len(), 2);
/// assert_eq!(trajectories[1].id(), "2");
/// ```
pub fn load_trajectories(json: &str, sample_size: Option<usize>) -> Result<Vec<Trajectory>> {
    let records: Vec<TrajectoryRecord> =
        serde_json::from_str(json).map_err(|err| Error::Document {
            message: err.to_string(),
        })?;
    let available = records.len();
    let limit = sample_size.unwrap_or(available).min(available);

    let trajectories = records
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, record)| {
            record.into_trajectory().map_err(|err| {
                warn!("[Records] Rejected record {}: {}", index, err);
                match err {
                    Error::DegenerateInput { id, .. } => Error::DegenerateInput {
                        index: Some(index),
                        id,
                    },
                    Error::InvalidArgument { name, message } => Error::InvalidArgument {
                        name,
                        message: format!("record {index}: {message}"),
                    },
                    other => other,
                }
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!("[Records] Loaded {} of {} trajectory records", trajectories.len(), available);
    Ok(trajectories)
}
