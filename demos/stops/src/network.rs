//! Synthetic five-stop network and its hand-made field counts.
//!
//! Stop positions are loosely modelled on downtown Mobile, Alabama.

use cal_core::{EntitySpec, GeoPoint, StopId};

/// `(stop, name, lat, lon, base attractiveness)`
const STOPS: [(u32, &str, f64, f64, f64); 5] = [
    (101, "Government St",  30.6905, -88.0430, 1.0),
    (102, "Bienville Sq",   30.6920, -88.0440, 1.0),
    (103, "Midtown",        30.6820, -88.0780, 1.0),
    (104, "Commerce Park",  30.7000, -88.0300, 1.0),
    (105, "Spring Hill",    30.6950, -88.1250, 1.0),
];

pub fn calibrated_stops() -> Vec<EntitySpec> {
    STOPS
        .iter()
        .map(|&(id, name, lat, lon, _)| EntitySpec::new(StopId(id), name, GeoPoint::new(lat, lon)))
        .collect()
}

/// Uncalibrated attractiveness, before any offset.
pub fn base_weights() -> Vec<(StopId, f64)> {
    STOPS.iter().map(|&(id, .., w)| (StopId(id), w)).collect()
}

// Field counts are full-scale; the synthetic population is a 10 % sample.
// Morning peak (hours 7-9) is strongly skewed toward downtown.
pub const OCCUPANCY_CSV: &str = "\
stop_id,hour,count\n\
101,7,300\n101,8,420\n101,9,260\n\
102,7,240\n102,8,330\n102,9,200\n\
103,7,120\n103,8,150\n103,9,110\n\
104,7,90\n104,8,120\n104,9,80\n\
105,7,30\n105,8,40\n105,9,30\n\
";

pub const BOARD_CSV: &str = "\
stop_id,hour,count\n\
101,8,400\n102,8,310\n103,8,160\n104,8,110\n105,8,50\n\
";

pub const ALIGHT_CSV: &str = "\
stop_id,hour,count\n\
101,8,380\n102,8,300\n103,8,150\n104,8,120\n105,8,60\n\
";
