//! Point records and identifiers.

use crate::error::PointError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Largest absolute latitude accepted by [`Point::new`].
pub const MAX_LATITUDE: f64 = 90.0;

/// Largest absolute longitude accepted by [`Point::new`].
pub const MAX_LONGITUDE: f64 = 180.0;

/// Stable, opaque identifier of a point.
///
/// Assigned once by the creating client and never reused. Freshly generated
/// ids are UUID v4 strings, but any non-empty string received from a peer is
/// accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(String);

impl PointId {
    /// Generates a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for PointId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PointId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for PointId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A named geographic location.
///
/// Points are value records: an update is a full replacement of the record
/// stored under the same [`PointId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Stable identifier.
    pub id: PointId,
    /// Display name.
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Point {
    /// Creates a point with a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates are out of range.
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Result<Self, PointError> {
        Self::with_id(PointId::generate(), name, lat, lng)
    }

    /// Creates a point under a caller-chosen id.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or the coordinates are out of range.
    pub fn with_id(
        id: impl Into<PointId>,
        name: impl Into<String>,
        lat: f64,
        lng: f64,
    ) -> Result<Self, PointError> {
        let id = id.into();
        if id.as_str().is_empty() {
            return Err(PointError::EmptyId);
        }
        if !lat.is_finite() || lat.abs() > MAX_LATITUDE {
            return Err(PointError::InvalidLatitude(lat));
        }
        if !lng.is_finite() || lng.abs() > MAX_LONGITUDE {
            return Err(PointError::InvalidLongitude(lng));
        }
        Ok(Self {
            id,
            name: name.into(),
            lat,
            lng,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = PointId::generate();
        let b = PointId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn new_point_validates_coordinates() {
        assert!(Point::new("Harbor", 59.9, 10.7).is_ok());
        assert!(Point::new("Pole", 90.0, -180.0).is_ok());

        assert_eq!(
            Point::new("x", 90.5, 0.0),
            Err(PointError::InvalidLatitude(90.5))
        );
        assert_eq!(
            Point::new("x", 0.0, -180.01),
            Err(PointError::InvalidLongitude(-180.01))
        );
        assert!(matches!(
            Point::new("x", f64::NAN, 0.0),
            Err(PointError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn empty_id_rejected() {
        assert_eq!(
            Point::with_id("", "x", 0.0, 0.0),
            Err(PointError::EmptyId)
        );
    }

    #[test]
    fn json_shape() {
        let point = Point::with_id("_k3j9x2a1b", "Cafe", 1.0, 2.5).unwrap();
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "_k3j9x2a1b", "name": "Cafe", "lat": 1.0, "lng": 2.5})
        );

        // Integer coordinates on the wire are accepted.
        let parsed: Point =
            serde_json::from_str(r#"{"id":"A","name":"X","lat":1,"lng":2}"#).unwrap();
        assert_eq!(parsed.lat, 1.0);
        assert_eq!(parsed.id.as_str(), "A");
    }
}
