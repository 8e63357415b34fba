use pestscan_types::{Agrovet, Geometry, Position};

/// WGS84 equatorial radius, metres. Used for polygon area.
const EQUATORIAL_RADIUS_M: f64 = 6_378_137.0;
/// Mean earth radius, kilometres. Used for point distances.
const MEAN_RADIUS_KM: f64 = 6_371.0088;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    /// Default map centre (Nairobi).
    pub const NAIROBI: LatLon = LatLon {
        lat: -1.2921,
        lon: 36.8219,
    };
}

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(a: LatLon, b: LatLon) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * MEAN_RADIUS_KM * h.sqrt().asin()
}

/// Agrovets ordered by distance from `origin`, paired with that distance in km.
pub fn nearest_first(origin: LatLon, agrovets: &[Agrovet]) -> Vec<(Agrovet, f64)> {
    let mut ranked: Vec<(Agrovet, f64)> = agrovets
        .iter()
        .map(|a| {
            let d = haversine_km(
                origin,
                LatLon {
                    lat: a.latitude,
                    lon: a.longitude,
                },
            );
            (a.clone(), d)
        })
        .collect();
    ranked.sort_by(|x, y| x.1.total_cmp(&y.1));
    ranked
}

/// Area of a boundary geometry in square metres, holes subtracted.
pub fn geometry_area(geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::Polygon { coordinates } => polygon_area(coordinates),
        Geometry::MultiPolygon { coordinates } => coordinates.iter().map(|p| polygon_area(p)).sum(),
    }
}

fn polygon_area(rings: &[Vec<Position>]) -> f64 {
    let mut rings = rings.iter();
    let Some(outer) = rings.next() else { return 0.0; };
    let holes: f64 = rings.map(|r| ring_area(r).abs()).sum();
    (ring_area(outer).abs() - holes).max(0.0)
}

/// Signed spherical area of a closed ring of `[lon, lat]` positions.
fn ring_area(ring: &[Position]) -> f64 {
    let points: Vec<(f64, f64)> = ring
        .iter()
        .filter_map(|p| match p.as_slice() {
            [lon, lat, ..] => Some((lon.to_radians(), lat.to_radians())),
            _ => None,
        })
        .collect();
    let n = points.len();
    if n <= 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..n {
        let (lower, middle, upper) = if i == n - 2 {
            (n - 2, n - 1, 0)
        } else if i == n - 1 {
            (n - 1, 0, 1)
        } else {
            (i, i + 1, i + 2)
        };
        total += (points[upper].0 - points[lower].0) * points[middle].1.sin();
    }
    total * EQUATORIAL_RADIUS_M * EQUATORIAL_RADIUS_M / 2.0
}
