/*!
 * Geographic calculations.
 *
 * Only the simple (approximate) spherical calculations needed for deciding whether two fire
 * detections are close to each other live here.
 */

use std::fmt::{self, Display};

/// Mean radius of the Earth used for all distance calculations.
pub const EARTH_RADIUS_KM: f64 = 6371.0090;

/// Approximate length of one degree of latitude in kilometers.
pub(crate) const KM_PER_DEGREE_LAT: f64 = 111.32;

/**
 * the simple great circle distance calculation.
 *
 * #Arguments
 * * lat1 - the latitude of the first point in degrees.
 * * lon1 - the longitude of the first point in degrees.
 * * lat2 - the latitude of the second point in degrees.
 * * lon2 - the longitude of the second point in degrees.
 *
 * #Returns
 * The distance between the points in kilometers.
 */
pub fn great_circle_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_r = lat1.to_radians();
    let lon1_r = lon1.to_radians();
    let lat2_r = lat2.to_radians();
    let lon2_r = lon2.to_radians();

    let sin_dlat2 = f64::sin((lat2_r - lat1_r) / 2.0);
    let sin_dlon2 = f64::sin((lon2_r - lon1_r) / 2.0);

    let sin2_dlat = sin_dlat2 * sin_dlat2;
    let sin2_dlon = sin_dlon2 * sin_dlon2;

    // Group the cosines so swapping the points gives bit-for-bit the same answer.
    let cos_product = f64::cos(lat1_r) * f64::cos(lat2_r);

    let arc = 2.0 * f64::asin(f64::sqrt((sin2_dlat + sin2_dlon * cos_product).min(1.0)));

    arc * EARTH_RADIUS_KM
}

/// A point on the Earth's surface in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    /// Distance to another coordinate in kilometers.
    pub fn distance_km(&self, other: &Coord) -> f64 {
        great_circle_distance(self.lat, self.lon, other.lat, other.lon)
    }

    /// Corners of a square of `side_km` centered on this coordinate.
    ///
    /// Returned in the order upper left, lower left, lower right, upper right.
    pub(crate) fn square_around(&self, side_km: f64) -> [Coord; 4] {
        let dlat = side_km / 2.0 / KM_PER_DEGREE_LAT;
        let dlon = dlat / self.lat.to_radians().cos().abs().max(1.0e-6);

        let (lat, lon) = (self.lat, self.lon);
        [
            Coord { lat: lat + dlat, lon: lon - dlon },
            Coord { lat: lat - dlat, lon: lon - dlon },
            Coord { lat: lat - dlat, lon: lon + dlon },
            Coord { lat: lat + dlat, lon: lon + dlon },
        ]
    }
}

/// Formats the coordinate as degrees, minutes, seconds, e.g. `8 30' 0'' S 45 0' 0'' W`.
///
/// This is the form Google Maps accepts in its search box.
impl Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let ns = if self.lat < 0.0 { 'S' } else { 'N' };
        let ew = if self.lon < 0.0 { 'W' } else { 'E' };

        write_dms(f, self.lat.abs())?;
        write!(f, " {} ", ns)?;
        write_dms(f, self.lon.abs())?;
        write!(f, " {}", ew)
    }
}

fn write_dms(f: &mut fmt::Formatter, degrees: f64) -> Result<(), fmt::Error> {
    // Work in hundredths of an arc second so rounding never produces 60 seconds.
    let centi_arcsec = (degrees * 360_000.0).round() as u64;
    let deg = centi_arcsec / 360_000;
    let minutes = (centi_arcsec % 360_000) / 6_000;
    let centi = centi_arcsec % 6_000;

    let seconds = format!("{}.{:02}", centi / 100, centi % 100);
    let seconds = seconds.trim_end_matches('0').trim_end_matches('.');

    write!(f, "{} {}' {}''", deg, minutes, seconds)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_great_circle_distance() {
        // One degree of longitude along the equator.
        let d = great_circle_distance(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111.195).abs() < 0.01);

        // Same point.
        assert_eq!(great_circle_distance(-10.5, -47.25, -10.5, -47.25), 0.0);

        // Brasilia to Sao Paulo is roughly 870 km.
        let d = great_circle_distance(-15.7939, -47.8828, -23.5505, -46.6333);
        assert!(d > 860.0 && d < 880.0, "{}", d);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (Coord { lat: -8.5, lon: -45.0 }, Coord { lat: -8.51, lon: -45.02 }),
            (Coord { lat: 12.0, lon: 179.9 }, Coord { lat: 12.3, lon: -179.9 }),
            (Coord { lat: -89.0, lon: 10.0 }, Coord { lat: 89.0, lon: -170.0 }),
        ];

        for (a, b) in pairs {
            assert_eq!(a.distance_km(&b), b.distance_km(&a));
        }
    }

    #[test]
    fn test_coord_display() {
        let c = Coord { lat: -8.5, lon: -45.0 };
        assert_eq!(c.to_string(), "8 30' 0'' S 45 0' 0'' W");

        let c = Coord { lat: 41.4034, lon: 2.1741 };
        assert_eq!(c.to_string(), "41 24' 12.24'' N 2 10' 26.76'' E");
    }

    #[test]
    fn test_square_around() {
        let c = Coord { lat: 0.0, lon: 0.0 };
        let [ul, ll, lr, ur] = c.square_around(2.0 * KM_PER_DEGREE_LAT);

        assert!((ul.lat - 1.0).abs() < 1.0e-12 && (ul.lon + 1.0).abs() < 1.0e-12);
        assert!((ll.lat + 1.0).abs() < 1.0e-12 && (ll.lon + 1.0).abs() < 1.0e-12);
        assert!((lr.lat + 1.0).abs() < 1.0e-12 && (lr.lon - 1.0).abs() < 1.0e-12);
        assert!((ur.lat - 1.0).abs() < 1.0e-12 && (ur.lon - 1.0).abs() < 1.0e-12);
    }
}
