use rand::Rng;
use serde::{Deserialize, Serialize};

/// Equatorial Earth radius in meters, the same constant the browser map uses.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Meters per degree of latitude (near enough for box sizing).
const METERS_PER_DEG_LAT: f64 = 111_320.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Great-circle distance in meters (haversine).
pub fn distance_meters(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Axis-aligned geographic box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub const fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Bounds { south, west, north, east }
    }

    /// Square box with sides of `size_m` meters centered on `center`.
    pub fn around(center: LatLng, size_m: f64) -> Self {
        let half = size_m / 2.0;
        let dlat = half / METERS_PER_DEG_LAT;
        let dlng = half / (METERS_PER_DEG_LAT * center.lat.to_radians().cos());
        Bounds {
            south: center.lat - dlat,
            west: center.lng - dlng,
            north: center.lat + dlat,
            east: center.lng + dlng,
        }
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lng >= self.west && p.lng <= self.east
    }

    pub fn center(&self) -> LatLng {
        LatLng {
            lat: (self.south + self.north) / 2.0,
            lng: (self.west + self.east) / 2.0,
        }
    }

    /// Pull `p` inside the box.
    pub fn clamp(&self, p: LatLng) -> LatLng {
        LatLng {
            lat: p.lat.clamp(self.south, self.north),
            lng: p.lng.clamp(self.west, self.east),
        }
    }
}

/// Where random rounds are drawn from: central Helsinki.
pub const PLAY_AREA: Bounds = Bounds::new(60.19, 24.825, 60.29, 25.20);

/// Initial center of the guess (selection) map.
pub const SELECTION_CENTER: LatLng = LatLng::new(60.18, 24.95);

/// Uniform random point inside `bounds`.
pub fn random_point<R: Rng + ?Sized>(bounds: &Bounds, rng: &mut R) -> LatLng {
    LatLng {
        lat: rng.gen_range(bounds.south..bounds.north),
        lng: rng.gen_range(bounds.west..bounds.east),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_distance_same_point_is_zero() {
        let p = LatLng::new(60.170, 24.938);
        assert!(distance_meters(p, p).abs() < 1e-9);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let a = LatLng::new(60.0, 25.0);
        let b = LatLng::new(61.0, 25.0);
        // One degree of arc on the equatorial radius
        let expected = EARTH_RADIUS_M * 1.0_f64.to_radians();
        assert!((distance_meters(a, b) - expected).abs() < 1.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = LatLng::new(60.17, 24.94);
        let b = LatLng::new(60.25, 25.10);
        assert!((distance_meters(a, b) - distance_meters(b, a)).abs() < 1e-6);
    }

    #[test]
    fn test_distance_helsinki_cross_town() {
        // Railway station to Itäkeskus is about 9 km in a straight line
        let station = LatLng::new(60.1719, 24.9414);
        let itis = LatLng::new(60.2104, 25.0811);
        let d = distance_meters(station, itis);
        assert!(d > 8_500.0 && d < 9_500.0, "got {d}");
    }

    #[test]
    fn test_bounds_around_has_requested_size() {
        let c = LatLng::new(60.2, 24.9);
        let b = Bounds::around(c, 4000.0);
        let ns = distance_meters(LatLng::new(b.south, c.lng), LatLng::new(b.north, c.lng));
        let we = distance_meters(LatLng::new(c.lat, b.west), LatLng::new(c.lat, b.east));
        assert!((ns - 4000.0).abs() < 40.0, "north-south {ns}");
        assert!((we - 4000.0).abs() < 40.0, "west-east {we}");
        assert!(b.contains(c));
    }

    #[test]
    fn test_bounds_clamp() {
        let p = PLAY_AREA.clamp(LatLng::new(59.0, 26.0));
        assert_eq!(p, LatLng::new(PLAY_AREA.south, PLAY_AREA.east));
        let inside = PLAY_AREA.center();
        assert_eq!(PLAY_AREA.clamp(inside), inside);
    }

    #[test]
    fn test_random_point_stays_in_play_area() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let p = random_point(&PLAY_AREA, &mut rng);
            assert!(PLAY_AREA.contains(p), "{p} outside play area");
        }
    }
}
