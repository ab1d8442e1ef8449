//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and the local planar frame the path geometry works in. The planar frame
//! is a Universal Transverse Mercator projection on the WGS-84 ellipsoid
//! for a fixed zone: `x` is northing and `y` is easting, both in meters.
//!
//! Southern-hemisphere positions map to negative northings rather than a
//! false-northing offset, so forward and inverse conversions round-trip
//! without hemisphere bookkeeping.

mod types;

pub use types::{CoordError, MAX_LAT, MAX_LON, MAX_ZONE, MIN_LAT, MIN_LON, MIN_ZONE};

/// WGS-84 semi-major axis in meters.
const WGS84_A: f64 = 6_378_137.0;

/// WGS-84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// UTM central-meridian scale factor.
const K0: f64 = 0.9996;

/// UTM false easting in meters.
const FALSE_EASTING: f64 = 500_000.0;

/// Central meridian of a UTM zone, in radians.
#[inline]
fn central_meridian(zone: u8) -> f64 {
    (f64::from(zone) * 6.0 - 183.0).to_radians()
}

fn validate_zone(zone: u8) -> Result<(), CoordError> {
    if !(MIN_ZONE..=MAX_ZONE).contains(&zone) {
        return Err(CoordError::InvalidZone(zone));
    }
    Ok(())
}

/// Meridian arc length from the equator to latitude `phi`, in meters.
fn meridian_arc(phi: f64) -> f64 {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}

/// Converts geographic coordinates to the local planar frame.
///
/// # Arguments
///
/// * `latitude` - Latitude in degrees (-80.0 to 84.0)
/// * `longitude` - Longitude in degrees (-180.0 to 180.0)
/// * `zone` - UTM zone number (1 to 60)
///
/// # Returns
///
/// `(northing, easting)` in meters, or an error if inputs are invalid.
pub fn geo_to_local(latitude: f64, longitude: f64, zone: u8) -> Result<(f64, f64), CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&latitude) {
        return Err(CoordError::InvalidLatitude(latitude));
    }
    if !(MIN_LON..=MAX_LON).contains(&longitude) {
        return Err(CoordError::InvalidLongitude(longitude));
    }
    validate_zone(zone)?;

    let e2 = WGS84_F * (2.0 - WGS84_F);
    let ep2 = e2 / (1.0 - e2);

    let phi = latitude.to_radians();
    let dlam = longitude.to_radians() - central_meridian(zone);

    let sin_phi = phi.sin();
    let cos_phi = phi.cos();
    let tan_phi = phi.tan();

    // Radius of curvature in the prime vertical
    let n = WGS84_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = tan_phi * tan_phi;
    let c = ep2 * cos_phi * cos_phi;
    let a = cos_phi * dlam;

    let a2 = a * a;
    let a3 = a2 * a;
    let a4 = a3 * a;
    let a5 = a4 * a;
    let a6 = a5 * a;

    let easting = K0
        * n
        * (a + (1.0 - t + c) * a3 / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a5 / 120.0)
        + FALSE_EASTING;

    let northing = K0
        * (meridian_arc(phi)
            + n * tan_phi
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0));

    Ok((northing, easting))
}

/// Converts a position in the local planar frame back to geographic
/// coordinates.
///
/// # Arguments
///
/// * `northing` - Distance north of the equator in meters (negative south)
/// * `easting` - Easting in meters, including the 500 km false easting
/// * `zone` - UTM zone number (1 to 60)
///
/// # Returns
///
/// `(latitude, longitude)` in degrees, or an error for an invalid zone.
pub fn local_to_geo(northing: f64, easting: f64, zone: u8) -> Result<(f64, f64), CoordError> {
    validate_zone(zone)?;

    let e2 = WGS84_F * (2.0 - WGS84_F);
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let x = easting - FALSE_EASTING;
    let m = northing / K0;

    // Footpoint latitude from the rectifying latitude
    let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
    let sqrt_1me2 = (1.0 - e2).sqrt();
    let e1 = (1.0 - sqrt_1me2) / (1.0 + sqrt_1me2);
    let e1_2 = e1 * e1;
    let e1_3 = e1_2 * e1;
    let e1_4 = e1_3 * e1;

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let c1 = ep2 * cos_phi1 * cos_phi1;
    let t1 = tan_phi1 * tan_phi1;
    let n1 = WGS84_A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
    let r1 = WGS84_A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
    let d = x / (n1 * K0);

    let d2 = d * d;
    let d3 = d2 * d;
    let d4 = d3 * d;
    let d5 = d4 * d;
    let d6 = d5 * d;

    let lat_rad = phi1
        - (n1 * tan_phi1 / r1)
            * (d2 / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d6
                    / 720.0);

    let lon_rad = central_meridian(zone)
        + (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d5
                / 120.0)
            / cos_phi1;

    Ok((lat_rad.to_degrees(), lon_rad.to_degrees()))
}
