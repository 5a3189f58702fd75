use std::collections::HashMap;

use log::{debug, warn};
use transit_core::{BusLine, Route, Stop};

use crate::{LineRecord, LinesDocument, RouteRecord, StopsDocument};

/// A decoded network ready for a batch load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Network {
    /// Stops in feed order.
    pub stops: Vec<Stop>,
    /// Lines in feed order, each carrying its resolved route.
    pub bus_lines: Vec<BusLine>,
}

impl Network {
    /// Resolve both feed documents into domain values.
    ///
    /// Each line takes the route whose id matches its own. Route entries that
    /// name an unknown stop are dropped with a warning, and a line without a
    /// route gets an empty one. When several routes share an id the first is
    /// used.
    pub fn assemble(stops: StopsDocument, lines: LinesDocument) -> Self {
        let StopsDocument { stops, routes } = stops;
        let stops: Vec<Stop> = stops
            .into_iter()
            .map(|record| {
                let [latitude, longitude] = record.position;
                Stop::new(record.id, record.name, latitude, longitude)
            })
            .collect();

        let mut routes_by_line: HashMap<u32, RouteRecord> = HashMap::new();
        for route in routes {
            if routes_by_line.contains_key(&route.id) {
                warn!("ignoring duplicate route for bus line {}", route.id);
                continue;
            }
            routes_by_line.insert(route.id, route);
        }

        let bus_lines = lines
            .lines
            .into_iter()
            .map(|line| {
                let route = routes_by_line
                    .get(&line.id)
                    .map_or_else(Route::empty, |route| resolve_route(route, &stops));
                bus_line(line).with_route(route)
            })
            .collect::<Vec<_>>();

        debug!(
            "assembled {} stops and {} bus lines from feeds",
            stops.len(),
            bus_lines.len()
        );
        Self { stops, bus_lines }
    }
}

fn bus_line(record: LineRecord) -> BusLine {
    BusLine::new(
        record.id,
        record.is_active,
        record.long_name,
        record.short_name,
    )
}

fn resolve_route(route: &RouteRecord, stops: &[Stop]) -> Route {
    let resolved = route
        .stops
        .iter()
        .filter_map(|stop_id| {
            let stop = stops.iter().find(|stop| stop.id == *stop_id).cloned();
            if stop.is_none() {
                warn!(
                    "skipping unknown stop {stop_id} on the route of bus line {}",
                    route.id
                );
            }
            stop
        })
        .collect();
    Route::new(resolved)
}
