use crate::Route;

/// A named, possibly inactive, bus line and the route it follows.
///
/// Lines read back from storage carry only their scalar fields; the route
/// is loaded by a separate query and attached with [`BusLine::with_route`].
///
/// # Examples
/// ```
/// use transit_core::{BusLine, Route, Stop};
///
/// let line = BusLine::new(4013, true, "Northline", "NL")
///     .with_route(Route::new(vec![Stop::new(1, "A", 0.0, 0.0)]));
///
/// assert_eq!(line.short_name, "NL");
/// assert_eq!(line.route.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusLine {
    /// Unique identifier assigned by the transit agency.
    pub id: u32,
    /// Whether the line currently runs.
    pub is_active: bool,
    /// Full public name, e.g. "Northline".
    pub long_name: String,
    /// Abbreviated name shown on signage, e.g. "NL".
    pub short_name: String,
    /// Stops visited in order. Empty until loaded.
    #[cfg_attr(feature = "serde", serde(default))]
    pub route: Route,
}

impl BusLine {
    /// Construct a line with an empty route.
    pub fn new(
        id: u32,
        is_active: bool,
        long_name: impl Into<String>,
        short_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            is_active,
            long_name: long_name.into(),
            short_name: short_name.into(),
            route: Route::empty(),
        }
    }

    /// Replace the line's route.
    #[must_use]
    pub fn with_route(mut self, route: Route) -> Self {
        self.route = route;
        self
    }
}
