//! Small transit networks shared by unit and behaviour tests.

use crate::{BusLine, Route, Stop};

/// Build a stop with a generated name.
pub fn stop(id: u32, latitude: f64, longitude: f64) -> Stop {
    Stop::new(id, format!("Stop {id}"), latitude, longitude)
}

/// Build an active line whose route visits `stops` in order.
pub fn line(id: u32, short_name: &str, stops: &[Stop]) -> BusLine {
    BusLine::new(id, true, format!("{short_name} Line"), short_name)
        .with_route(Route::new(stops.to_vec()))
}

/// A handful of stops around the University of Virginia grounds.
pub fn campus_stops() -> Vec<Stop> {
    vec![
        Stop::new(4235106, "Alderman Rd @ Gilmer Hall", 38.0340, -78.5134),
        Stop::new(4235108, "Whitehead Rd @ Rice Hall", 38.0316, -78.5108),
        Stop::new(4235110, "McCormick Rd @ Old Dorms", 38.0348, -78.5090),
        Stop::new(4235112, "University Ave @ Rotunda", 38.0356, -78.5034),
        Stop::new(4235114, "Emmet St @ Barracks Rd", 38.0461, -78.5091),
    ]
}

/// Two lines over [`campus_stops`]; both visit Gilmer Hall and the Rotunda.
pub fn campus_lines(stops: &[Stop]) -> Vec<BusLine> {
    let pick = |ids: &[u32]| -> Vec<Stop> {
        ids.iter()
            .filter_map(|id| stops.iter().find(|stop| stop.id == *id).cloned())
            .collect()
    };
    vec![
        BusLine::new(4013, true, "Inner U-Loop", "IUL")
            .with_route(Route::new(pick(&[4235106, 4235108, 4235110, 4235112]))),
        BusLine::new(4015, false, "Northline", "NL")
            .with_route(Route::new(pick(&[4235114, 4235106, 4235112]))),
    ]
}
