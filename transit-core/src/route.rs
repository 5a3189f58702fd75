//! Routes followed by bus lines.
//!
//! A route is the ordered sequence of stops a line visits. Order is
//! significant and is persisted explicitly alongside each stop.

use crate::Stop;

/// An ordered path through stops.
///
/// # Examples
/// ```
/// use transit_core::{Route, Stop};
///
/// let route = Route::new(vec![
///     Stop::new(1, "A", 0.0, 0.0),
///     Stop::new(2, "B", 0.0, 1.0),
/// ]);
///
/// assert_eq!(route.stops.len(), 2);
/// assert_eq!(route.total_distance(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Route {
    /// Stops visited in order.
    pub stops: Vec<Stop>,
}

impl Route {
    /// Construct a route from stops in visiting order.
    pub fn new(stops: Vec<Stop>) -> Self {
        Self { stops }
    }

    /// Construct an empty route.
    ///
    /// # Examples
    /// ```
    /// use transit_core::Route;
    ///
    /// let route = Route::empty();
    /// assert!(route.is_empty());
    /// assert_eq!(route.total_distance(), 0.0);
    /// ```
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the route visits no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Number of stops on the route.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether the route visits `stop`, compared by id.
    pub fn contains(&self, stop: &Stop) -> bool {
        self.stops.iter().any(|candidate| candidate.id == stop.id)
    }

    /// Sum of planar distances between consecutive stops.
    ///
    /// Routes with fewer than two stops have zero length.
    pub fn total_distance(&self) -> f64 {
        self.stops
            .windows(2)
            .map(|pair| match pair {
                [from, to] => from.distance_to(to),
                _ => 0.0,
            })
            .sum()
    }
}

impl From<Vec<Stop>> for Route {
    fn from(stops: Vec<Stop>) -> Self {
        Self::new(stops)
    }
}
