use std::hash::{Hash, Hasher};

use geo::{Distance, Euclidean, Point};

/// A named stop served by one or more bus lines.
///
/// Coordinates are WGS84 degrees. Stops compare and hash by `id` alone, so a
/// stop reloaded from storage matches the one it was persisted from even if
/// the two were built by different queries.
///
/// # Examples
/// ```
/// use transit_core::Stop;
///
/// let stop = Stop::new(1, "Whitehead Rd @ Rice Hall", 38.0316, -78.5108);
///
/// assert_eq!(stop.id, 1);
/// assert_eq!(stop.position().y(), 38.0316);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    /// Unique identifier assigned by the transit agency.
    pub id: u32,
    /// Human readable stop name.
    pub name: String,
    /// North/south coordinate in degrees.
    pub latitude: f64,
    /// East/west coordinate in degrees.
    pub longitude: f64,
}

impl Stop {
    /// Construct a `Stop`.
    pub fn new(id: u32, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Stop position as a point with `x = longitude` and `y = latitude`.
    pub fn position(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Planar distance in degrees to another stop.
    ///
    /// This is the straight-line distance in coordinate space, not a great
    /// circle distance.
    ///
    /// # Examples
    /// ```
    /// use transit_core::Stop;
    ///
    /// let a = Stop::new(1, "A", 0.0, 0.0);
    /// let b = Stop::new(2, "B", 3.0, 4.0);
    /// assert_eq!(a.distance_to(&b), 5.0);
    /// ```
    pub fn distance_to(&self, other: &Self) -> f64 {
        Euclidean.distance(self.position(), other.position())
    }

    /// Planar distance in degrees to an arbitrary coordinate.
    pub fn distance_to_coordinate(&self, latitude: f64, longitude: f64) -> f64 {
        Euclidean.distance(self.position(), Point::new(longitude, latitude))
    }
}

impl PartialEq for Stop {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Stop {}

impl Hash for Stop {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
