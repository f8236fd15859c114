#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use geo::Point;
use itinera_core::loading::TransitDataBuilder;
use itinera_core::model::DateTimeUtils;
use itinera_core::street::CrowFlyStreetNetwork;
use itinera_core::{DateTime, PublicTransitData, SearchConfig, Time};

pub const STOP_SPACING: f64 = 0.05;

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

pub fn hms(h: u32, m: u32, s: u32) -> Time {
    h * 3600 + m * 60 + s
}

pub fn at(h: u32, m: u32) -> NaiveDateTime {
    start_date().and_hms_opt(h, m, 0).unwrap()
}

pub fn day_at(day: u32, h: u32, m: u32) -> DateTime {
    DateTimeUtils::set(day, hms(h, m, 0))
}

fn builder(days: u32, stops: &[&str]) -> TransitDataBuilder {
    let mut builder = TransitDataBuilder::new(start_date(), days);
    for (i, uri) in stops.iter().enumerate() {
        builder.add_stop(uri, uri, Point::new(i as f64 * STOP_SPACING, 0.0));
    }
    builder
}

/// A-B-C-D served by one trip, 08:00 at A to 08:30 at D
pub fn linear_network() -> PublicTransitData {
    let mut b = builder(1, &["A", "B", "C", "D"]);
    b.add_line("L1", "Line 1", "bus");
    b.add_trip("T1", "L1", &linear_times(8)).unwrap();
    b.build()
}

/// Linear network with one trip per given departure hour
pub fn linear_network_hourly(hours: &[u32]) -> PublicTransitData {
    let mut b = builder(1, &["A", "B", "C", "D"]);
    b.add_line("L1", "Line 1", "bus");
    for &h in hours {
        b.add_trip(&format!("T{h}"), "L1", &linear_times(h)).unwrap();
    }
    b.build()
}

pub fn linear_times(h: u32) -> [(&'static str, Time, Time); 4] {
    [
        ("A", hms(h, 0, 0), hms(h, 0, 0)),
        ("B", hms(h, 10, 0), hms(h, 10, 0)),
        ("C", hms(h, 20, 0), hms(h, 20, 0)),
        ("D", hms(h, 30, 0), hms(h, 30, 0)),
    ]
}

/// Line 1 runs A-B-C, line 2 runs B2-E-F, B and B2 are 5 minutes apart on
/// foot. The 08:12 trip of line 2 cannot be caught after the walk.
pub fn crossing_network() -> PublicTransitData {
    let mut b = builder(1, &["A", "B", "C", "B2", "E", "F"]);
    b.add_line("L1", "Line 1", "bus");
    b.add_line("L2", "Line 2", "tram");
    b.add_trip(
        "T1",
        "L1",
        &[
            ("A", hms(8, 0, 0), hms(8, 0, 0)),
            ("B", hms(8, 10, 0), hms(8, 10, 0)),
            ("C", hms(8, 20, 0), hms(8, 20, 0)),
        ],
    )
    .unwrap();
    for (uri, dep) in [("T2a", hms(8, 12, 0)), ("T2b", hms(8, 20, 0))] {
        b.add_trip(
            uri,
            "L2",
            &[
                ("B2", dep, dep),
                ("E", dep + 600, dep + 600),
                ("F", dep + 1200, dep + 1200),
            ],
        )
        .unwrap();
    }
    b.add_transfer("B", "B2", 300).unwrap();
    b.add_transfer("B2", "B", 300).unwrap();
    b.build()
}

/// Two trips of different lines run by the same vehicle, meeting at B
pub fn block_network() -> PublicTransitData {
    let mut b = builder(1, &["A", "B", "C"]);
    b.add_line("L1", "Line 1", "bus");
    b.add_line("L2", "Line 2", "bus");
    b.add_trip(
        "T1",
        "L1",
        &[("A", hms(8, 0, 0), hms(8, 0, 0)), ("B", hms(8, 10, 0), hms(8, 10, 0))],
    )
    .unwrap()
    .block("vehicle-1");
    b.add_trip(
        "T2",
        "L2",
        &[("B", hms(8, 10, 0), hms(8, 12, 0)), ("C", hms(8, 20, 0), hms(8, 20, 0))],
    )
    .unwrap()
    .block("vehicle-1");
    b.build()
}

/// Night trip A-B-C of day 0 arriving after midnight, two days of data
pub fn night_network() -> PublicTransitData {
    let mut b = builder(2, &["A", "B", "C"]);
    b.add_line("N1", "Night", "bus");
    b.add_trip(
        "N",
        "N1",
        &[
            ("A", hms(23, 50, 0), hms(23, 50, 0)),
            ("B", hms(24, 20, 0), hms(24, 20, 0)),
            ("C", hms(24, 40, 0), hms(24, 40, 0)),
        ],
    )
    .unwrap()
    .active_days(&[0]);
    b.build()
}

/// A and B linked by a data footpath of `walk` seconds and by a trip
/// leaving A at 08:00 and reaching B at 08:20, too far apart for a street
/// journey
pub fn long_walk_network(walk: Time) -> PublicTransitData {
    let mut b = builder(1, &["A", "B"]);
    b.add_line("L1", "Line 1", "bus");
    b.add_trip(
        "T",
        "L1",
        &[("A", hms(8, 0, 0), hms(8, 0, 0)), ("B", hms(8, 20, 0), hms(8, 20, 0))],
    )
    .unwrap();
    b.add_transfer("A", "B", walk).unwrap();
    b.build()
}

/// Trip A2 08:05 to B 08:15 then trip B 08:20 to C 08:30. Footpaths:
/// A to A2 takes no time, A2 to X and C to X take 2 minutes, Y to A2 takes
/// 3 minutes.
pub fn footpath_network() -> PublicTransitData {
    let mut b = builder(1, &["A", "A2", "B", "C", "X", "Y"]);
    b.add_line("L1", "Line 1", "bus");
    b.add_line("L2", "Line 2", "bus");
    b.add_trip(
        "T1",
        "L1",
        &[("A2", hms(8, 5, 0), hms(8, 5, 0)), ("B", hms(8, 15, 0), hms(8, 15, 0))],
    )
    .unwrap();
    b.add_trip(
        "T2",
        "L2",
        &[("B", hms(8, 20, 0), hms(8, 20, 0)), ("C", hms(8, 30, 0), hms(8, 30, 0))],
    )
    .unwrap();
    b.add_transfer("A", "A2", 0).unwrap();
    b.add_transfer("A2", "X", 120).unwrap();
    b.add_transfer("C", "X", 120).unwrap();
    b.add_transfer("Y", "A2", 180).unwrap();
    b.build()
}

pub fn street_network(data: &PublicTransitData) -> CrowFlyStreetNetwork {
    CrowFlyStreetNetwork::new(data, &SearchConfig::default())
}
