//! Geomagnetic coordinates from a centred-dipole approximation

use crate::types::{GeomagneticState, Location, SolarSnapshot, StormLevel};

/// North geomagnetic (dipole) pole, geographic latitude (degrees).
pub const DIPOLE_POLE_LATITUDE: f64 = 86.5;

/// North geomagnetic (dipole) pole, geographic longitude (degrees east).
pub const DIPOLE_POLE_LONGITUDE: f64 = -164.0;

/// Rotate geographic coordinates into the dipole frame.
///
/// Returns `(geomagnetic_latitude, geomagnetic_longitude)` in degrees,
/// longitude normalized to 0-360.
///
/// - sin φm = sin φ sin φp + cos φ cos φp cos(λ - λp)
/// - λm = atan2(cos φ sin(λ - λp), cos φ sin φp cos(λ - λp) - sin φ cos φp)
pub fn geomagnetic_coordinates(location: &Location) -> (f64, f64) {
    let lat = location.latitude.to_radians();
    let pole_lat = DIPOLE_POLE_LATITUDE.to_radians();
    let d_lon = (location.longitude - DIPOLE_POLE_LONGITUDE).to_radians();

    let sin_mlat = lat.sin() * pole_lat.sin() + lat.cos() * pole_lat.cos() * d_lon.cos();
    let mlat = sin_mlat.clamp(-1.0, 1.0).asin().to_degrees();

    let y = lat.cos() * d_lon.sin();
    let x = lat.cos() * pole_lat.sin() * d_lon.cos() - lat.sin() * pole_lat.cos();
    let mlon = y.atan2(x).to_degrees().rem_euclid(360.0);

    (mlat, mlon)
}

/// Geomagnetic conditions at the observer for one snapshot.
pub fn geomagnetic_state(snapshot: &SolarSnapshot, location: &Location, severe_k: f64) -> GeomagneticState {
    let (geomagnetic_latitude, geomagnetic_longitude) = geomagnetic_coordinates(location);
    GeomagneticState {
        k_index: snapshot.k_index,
        a_index: snapshot.a_index,
        storm_level: StormLevel::from_k_index(snapshot.k_index, severe_k),
        geomagnetic_latitude,
        geomagnetic_longitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dipole_pole_maps_to_ninety() {
        let (mlat, _) = geomagnetic_coordinates(&Location::new(DIPOLE_POLE_LATITUDE, DIPOLE_POLE_LONGITUDE));
        assert!((mlat - 90.0).abs() < 1e-6);
    }

    #[test]
    fn geographic_pole_sits_at_pole_latitude() {
        let (mlat, _) = geomagnetic_coordinates(&Location::new(90.0, 0.0));
        assert!((mlat - DIPOLE_POLE_LATITUDE).abs() < 1e-6);
    }

    #[test]
    fn longitude_matters_unlike_fixed_offset() {
        // Same geographic latitude, different longitudes -> different magnetic latitudes
        // Pole meridian vs anti-meridian differ by twice the pole offset
        let (pacific, _) = geomagnetic_coordinates(&Location::new(45.0, -164.0));
        let (europe, _) = geomagnetic_coordinates(&Location::new(45.0, 16.0));
        assert!((pacific - 48.5).abs() < 0.01, "got {pacific}");
        assert!((europe - 41.5).abs() < 0.01, "got {europe}");
    }

    #[test]
    fn mid_latitude_us_station() {
        let (mlat, mlon) = geomagnetic_coordinates(&Location::new(40.0, -100.0));
        assert!((40.0..44.0).contains(&mlat), "got {mlat}");
        assert!((0.0..360.0).contains(&mlon));
    }
}
