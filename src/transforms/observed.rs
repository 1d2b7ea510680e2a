//! Intermediate (CIRS) places to observed places and back
//!
//! Observed places include diurnal aberration and atmospheric refraction and
//! are what a telescope on the ground actually points at. All of these
//! transforms need a context built with site parameters.

use std::f64::consts::FRAC_PI_2;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::catalog::{cirs_to_icrs, icrs_to_cirs};
use crate::astrometry::{AstrometryContext, SiteParameters};
use crate::coordinates::{normalize_angle, Equatorial};
use crate::relativity::Deflectors;
use crate::starlib::CatalogStar;
use crate::Result;

/// Floor on the cosine of the altitude in the forward refraction model
const COS_ALTITUDE_MIN: f64 = 1e-6;

/// Floor on the sine of the altitude in the forward refraction model
const SIN_ALTITUDE_MIN: f64 = 0.05;

/// Floor on the sine of the altitude when removing refraction (0.05 degrees)
const SIN_ALTITUDE_MIN_INVERSE: f64 = 0.05 * std::f64::consts::PI / 180.0;

/// An observed place in every form the transforms produce
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedPlace {
    /// Azimuth, north zero, east 90 degrees (radians, [0, 2π))
    pub azimuth: f64,
    /// Zenith distance (radians)
    pub zenith_distance: f64,
    /// Hour angle (radians)
    pub hour_angle: f64,
    /// Declination (radians)
    pub declination: f64,
    /// Right ascension, CIO based (radians, [0, 2π))
    pub right_ascension: f64,
}

impl ObservedPlace {
    pub fn altitude(&self) -> f64 {
        FRAC_PI_2 - self.zenith_distance
    }
}

/// An observed direction given in one of three coordinate systems
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObservedCoordinates {
    AzimuthZenith {
        azimuth: f64,
        zenith_distance: f64,
    },
    HourAngleDeclination {
        hour_angle: f64,
        declination: f64,
    },
    /// CIO based right ascension and declination
    RightAscensionDeclination {
        right_ascension: f64,
        declination: f64,
    },
}

fn from_spherical(longitude: f64, latitude: f64) -> Vector3<f64> {
    let (sl, cl) = longitude.sin_cos();
    let (sb, cb) = latitude.sin_cos();
    Vector3::new(cl * cb, sl * cb, sb)
}

/// Longitude in (-π, π] and latitude of a vector
fn to_spherical(v: &Vector3<f64>) -> (f64, f64) {
    let d2 = v.x * v.x + v.y * v.y;
    let longitude = if d2 == 0.0 { 0.0 } else { v.y.atan2(v.x) };
    let latitude = if v.z == 0.0 { 0.0 } else { v.z.atan2(d2.sqrt()) };
    (longitude, latitude)
}

/// Transform a CIRS place to an observed place
///
/// The refraction uses the A tan z + B tan^3 z model with one Newton-Raphson
/// step, floored near the horizon, so results below about 5 degrees altitude
/// are only indicative.
pub fn cirs_to_observed(place: &Equatorial, context: &AstrometryContext) -> Result<ObservedPlace> {
    let site = context.require_site()?;
    let eral = context.rotation_angle();

    // CIRS RA,Dec to Cartesian -HA,Dec
    let v = from_spherical(place.ra - eral, place.dec);

    // Polar motion
    let (sx, cx) = site.polar_x.sin_cos();
    let (sy, cy) = site.polar_y.sin_cos();
    let xhd = cx * v.x + sx * v.z;
    let yhd = sx * sy * v.x + cy * v.y - cx * sy * v.z;
    let zhd = -sx * cy * v.x + sy * v.y + cx * cy * v.z;

    // Diurnal aberration
    let f = 1.0 - site.diurnal_aberration * yhd;
    let xhdt = f * xhd;
    let yhdt = f * (yhd + site.diurnal_aberration);
    let zhdt = f * zhd;

    // Cartesian -HA,Dec to Cartesian Az,El (S=0, E=90)
    let xaet = site.sin_latitude * xhdt - site.cos_latitude * zhdt;
    let yaet = yhdt;
    let zaet = site.cos_latitude * xhdt + site.sin_latitude * zhdt;

    // Azimuth (N=0, E=90)
    let azimuth = if xaet != 0.0 || yaet != 0.0 {
        yaet.atan2(-xaet)
    } else {
        0.0
    };

    // Cosine and sine of altitude, floored
    let r = xaet.hypot(yaet).max(COS_ALTITUDE_MIN);
    let z = zaet.max(SIN_ALTITUDE_MIN);

    // Refraction with a Newton-Raphson correction
    let refraction = &site.refraction;
    let tz = r / z;
    let w = refraction.b * tz * tz;
    let del = (refraction.a + w) * tz / (1.0 + (refraction.a + 3.0 * w) / (z * z));

    // Apply the change, giving the observed vector
    let cosdel = 1.0 - del * del / 2.0;
    let f = cosdel - del * z / r;
    let xaeo = xaet * f;
    let yaeo = yaet * f;
    let zaeo = cosdel * zaet + del * r;

    let zenith_distance = xaeo.hypot(yaeo).atan2(zaeo);

    // Az/El vector back to -HA,Dec
    let (hmobs, declination) = to_spherical(&Vector3::new(
        site.sin_latitude * xaeo + site.cos_latitude * zaeo,
        yaeo,
        -site.cos_latitude * xaeo + site.sin_latitude * zaeo,
    ));

    Ok(ObservedPlace {
        azimuth: normalize_angle(azimuth),
        zenith_distance,
        hour_angle: -hmobs,
        declination,
        right_ascension: normalize_angle(eral + hmobs),
    })
}

/// Observed direction as a unit vector in the local Az,ZD frame (S=0, E=90)
fn topocentric_vector(
    coordinates: &ObservedCoordinates,
    site: &SiteParameters,
    eral: f64,
) -> Vector3<f64> {
    match *coordinates {
        ObservedCoordinates::AzimuthZenith {
            azimuth,
            zenith_distance,
        } => {
            let ce = zenith_distance.sin();
            Vector3::new(
                -azimuth.cos() * ce,
                azimuth.sin() * ce,
                zenith_distance.cos(),
            )
        }
        ObservedCoordinates::HourAngleDeclination {
            hour_angle,
            declination,
        } => hour_angle_to_topocentric(hour_angle, declination, site),
        ObservedCoordinates::RightAscensionDeclination {
            right_ascension,
            declination,
        } => hour_angle_to_topocentric(eral - right_ascension, declination, site),
    }
}

fn hour_angle_to_topocentric(
    hour_angle: f64,
    declination: f64,
    site: &SiteParameters,
) -> Vector3<f64> {
    let v = from_spherical(-hour_angle, declination);
    Vector3::new(
        site.sin_latitude * v.x - site.cos_latitude * v.z,
        v.y,
        site.cos_latitude * v.x + site.sin_latitude * v.z,
    )
}

/// Transform an observed place to a CIRS place
///
/// Inverse of [`cirs_to_observed`], accepting the observed direction in any
/// of the forms of [`ObservedCoordinates`].
pub fn observed_to_cirs(
    coordinates: &ObservedCoordinates,
    context: &AstrometryContext,
) -> Result<Equatorial> {
    let site = context.require_site()?;
    let eral = context.rotation_angle();

    let aeo = topocentric_vector(coordinates, site, eral);

    // Azimuth (S=0, E=90)
    let az = if aeo.x != 0.0 || aeo.y != 0.0 {
        aeo.y.atan2(aeo.x)
    } else {
        0.0
    };

    // Observed zenith distance and the refraction to remove
    let sz = aeo.x.hypot(aeo.y);
    let zdo = sz.atan2(aeo.z);
    let tz = sz / aeo.z.max(SIN_ALTITUDE_MIN_INVERSE);
    let dref = (site.refraction.a + site.refraction.b * tz * tz) * tz;
    let zdt = zdo + dref;

    // To Cartesian Az,ZD
    let ce = zdt.sin();
    let xaet = az.cos() * ce;
    let yaet = az.sin() * ce;
    let zaet = zdt.cos();

    // Cartesian Az,ZD to Cartesian -HA,Dec
    let xmhda = site.sin_latitude * xaet + site.cos_latitude * zaet;
    let ymhda = yaet;
    let zmhda = -site.cos_latitude * xaet + site.sin_latitude * zaet;

    // Diurnal aberration
    let f = 1.0 + site.diurnal_aberration * ymhda;
    let xhd = f * xmhda;
    let yhd = f * (ymhda - site.diurnal_aberration);
    let zhd = f * zmhda;

    // Polar motion
    let (sx, cx) = site.polar_x.sin_cos();
    let (sy, cy) = site.polar_y.sin_cos();
    let v = Vector3::new(
        cx * xhd + sx * sy * yhd - sx * cy * zhd,
        cy * yhd + sy * zhd,
        sx * xhd - cx * sy * yhd + cx * cy * zhd,
    );

    let (hma, declination) = to_spherical(&v);
    Ok(Equatorial::new(eral + hma, declination))
}

/// Transform a catalog star all the way to an observed place
pub fn icrs_to_observed(
    star: &CatalogStar,
    context: &AstrometryContext,
    deflectors: &Deflectors<'_>,
) -> Result<ObservedPlace> {
    context.require_site()?;
    let cirs = icrs_to_cirs(star, context, deflectors);
    cirs_to_observed(&cirs, context)
}

/// Transform an observed place to an ICRS astrometric place
pub fn observed_to_icrs(
    coordinates: &ObservedCoordinates,
    context: &AstrometryContext,
    deflectors: &Deflectors<'_>,
) -> Result<Equatorial> {
    let cirs = observed_to_cirs(coordinates, context)?;
    Ok(cirs_to_icrs(&cirs, context, deflectors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astrometry::{
        EarthState, EphemerisSource, EpochParameters, ObserverSite, PolarMotion,
        RefractionConstants,
    };
    use crate::coordinates::normalize_angle_signed;
    use crate::time::JulianDate;
    use crate::AstrometryError;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const ERA: f64 = 3.14540971;

    fn epoch() -> EpochParameters {
        EpochParameters::geocentric(
            JulianDate::new(2456384.5, 0.970031644),
            EphemerisSource::Supplied(EarthState::new(
                Vector3::new(-0.973458265, -0.209215307, -0.0906996477),
                Vector3::new(-0.974170438, -0.211520082, -0.0917583024),
                Vector3::new(0.00364365824, -0.0154287319, -0.00668922024),
            )),
        )
        .unwrap()
    }

    fn site() -> ObserverSite {
        ObserverSite::new(-0.527800806, -1.2345856, 2738.0)
    }

    fn context_with(refraction: RefractionConstants) -> AstrometryContext {
        let params = SiteParameters::new(
            ERA,
            &site(),
            &PolarMotion::new(2.47230737e-7, 1.82640464e-6, -3.01974337e-11),
            &refraction,
        )
        .unwrap();
        AstrometryContext::with_site(epoch(), params, ERA)
    }

    fn context() -> AstrometryContext {
        context_with(RefractionConstants::new(2.014187790e-4, -2.36140831e-7))
    }

    fn separation(a: &Equatorial, b: &Equatorial) -> f64 {
        a.angular_distance(b)
    }

    #[test]
    fn test_roundtrip_above_ten_degrees() {
        let context = context();
        let mut rng = StdRng::seed_from_u64(8_675_309);
        let mut checked = 0;

        while checked < 300 {
            let cirs = Equatorial::new(rng.gen_range(0.0..6.283), rng.gen_range(-1.55..1.55));
            let observed = cirs_to_observed(&cirs, &context).unwrap();
            if observed.altitude() < 10f64.to_radians() {
                continue;
            }
            checked += 1;

            let forms = [
                ObservedCoordinates::AzimuthZenith {
                    azimuth: observed.azimuth,
                    zenith_distance: observed.zenith_distance,
                },
                ObservedCoordinates::HourAngleDeclination {
                    hour_angle: observed.hour_angle,
                    declination: observed.declination,
                },
                ObservedCoordinates::RightAscensionDeclination {
                    right_ascension: observed.right_ascension,
                    declination: observed.declination,
                },
            ];
            for form in forms {
                let back = observed_to_cirs(&form, &context).unwrap();
                assert!(
                    separation(&back, &cirs) < 1e-6,
                    "{:?} came back {} rad away",
                    form,
                    separation(&back, &cirs)
                );
                assert!(back.ra >= 0.0 && back.ra < std::f64::consts::TAU);
            }
        }
    }

    #[test]
    fn test_star_on_the_meridian_at_the_latitude_is_at_the_zenith() {
        let context = context();
        let zenith = Equatorial::new(context.rotation_angle(), site().latitude);
        let observed = cirs_to_observed(&zenith, &context).unwrap();

        assert!(observed.zenith_distance < 1e-5);
        assert!(normalize_angle_signed(observed.hour_angle).abs() < 1e-4);
    }

    #[test]
    fn test_meridian_star_toward_the_pole_is_due_north() {
        let context = context();
        let star = Equatorial::new(context.rotation_angle(), site().latitude + 0.3);
        let observed = cirs_to_observed(&star, &context).unwrap();

        assert!(normalize_angle_signed(observed.azimuth).abs() < 1e-5);
        assert_relative_eq!(observed.zenith_distance, 0.3, epsilon = 1e-4);
    }

    #[test]
    fn test_refraction_raises_the_star() {
        let refraction = RefractionConstants::new(2.014187790e-4, -2.36140831e-7);
        let with = context_with(refraction);
        let without = context_with(RefractionConstants::default());

        let star = Equatorial::new(ERA - 0.5, -0.6);
        let refracted = cirs_to_observed(&star, &with).unwrap();
        let topocentric = cirs_to_observed(&star, &without).unwrap();

        let tz = topocentric.zenith_distance.tan();
        let expected = refraction.a * tz + refraction.b * tz.powi(3);
        let lift = topocentric.zenith_distance - refracted.zenith_distance;

        assert!(lift > 0.0);
        assert_relative_eq!(lift, expected, epsilon = 1e-6);
        assert_relative_eq!(refracted.azimuth, topocentric.azimuth, epsilon = 1e-12);
    }

    #[test]
    fn test_observed_right_ascension_matches_hour_angle() {
        let context = context();
        let observed = cirs_to_observed(&Equatorial::new(1.0, -0.9), &context).unwrap();
        let residual = observed.right_ascension + observed.hour_angle - context.rotation_angle();
        assert!(normalize_angle_signed(residual).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_update_shifts_hour_angle() {
        let site = SiteParameters {
            longitude: 0.4,
            polar_x: 0.0,
            polar_y: 0.0,
            sin_latitude: 0.6,
            cos_latitude: 0.8,
            diurnal_aberration: 0.0,
            refraction: RefractionConstants::default(),
        };
        let mut context = AstrometryContext::with_site(epoch(), site, 1.0);
        let star = Equatorial::new(2.0, 0.3);
        let before = cirs_to_observed(&star, &context).unwrap();

        let delta = 0.05;
        context.update_rotation_angle(1.0 + delta).unwrap();
        let after = cirs_to_observed(&star, &context).unwrap();

        assert_relative_eq!(
            normalize_angle_signed(after.hour_angle - before.hour_angle),
            delta,
            epsilon = 1e-12
        );
        assert_relative_eq!(after.declination, before.declination, epsilon = 1e-12);
        assert_relative_eq!(after.right_ascension, before.right_ascension, epsilon = 1e-12);
    }

    #[test]
    fn test_site_is_required() {
        let context = AstrometryContext::new(epoch());
        let place = Equatorial::new(1.0, 0.2);

        assert!(matches!(
            cirs_to_observed(&place, &context),
            Err(AstrometryError::InvalidParameter(_))
        ));
        assert!(matches!(
            observed_to_cirs(
                &ObservedCoordinates::HourAngleDeclination {
                    hour_angle: 0.1,
                    declination: 0.2
                },
                &context
            ),
            Err(AstrometryError::InvalidParameter(_))
        ));
        assert!(matches!(
            icrs_to_observed(&CatalogStar::fixed(1.0, 0.2), &context, &Deflectors::Sun),
            Err(AstrometryError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_observed_icrs_roundtrip() {
        let context = context();
        let star = CatalogStar::fixed(context.rotation_angle() - 0.3, -1.0);

        let observed = icrs_to_observed(&star, &context, &Deflectors::Sun).unwrap();
        assert!(observed.altitude() > 0.5);

        let icrs = observed_to_icrs(
            &ObservedCoordinates::AzimuthZenith {
                azimuth: observed.azimuth,
                zenith_distance: observed.zenith_distance,
            },
            &context,
            &Deflectors::Sun,
        )
        .unwrap();

        let expected = Equatorial::new(star.ra, star.dec);
        // Parallax-free star: only the sub-microradian refraction residual remains
        assert!(icrs.angular_distance(&expected) < 1e-6);
    }
}
