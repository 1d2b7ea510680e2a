//! Per-observer, per-epoch astrometry context
//!
//! Everything that depends only on the epoch and the observer is computed
//! once here and reused for every star. The context is split into an
//! immutable, reference-counted part and the local Earth rotation angle,
//! which is the one quantity that changes from one observation to the next
//! within a night.

use std::sync::Arc;

use log::debug;
use nalgebra::{Matrix3, Vector3};

use super::ephemeris::EphemerisSource;
use super::site::{
    terrestrial_observer_pv, CipCoordinates, ObserverSite, PolarMotion, RefractionConstants,
};
use crate::constants::{AUDAY_TO_MS, AU_LIGHT_TIME_DAYS, AU_M, C};
use crate::coordinates::normalize_angle;
use crate::time::JulianDate;
use crate::{AstrometryError, Result};

/// Observer- and epoch-dependent parameters for ICRS <-> GCRS/CIRS
#[derive(Debug, Clone, PartialEq)]
pub struct EpochParameters {
    /// Julian years since J2000.0, for applying proper motion
    pub pm_interval: f64,
    /// Barycentric position of the observer (AU)
    pub barycentric_position: Vector3<f64>,
    /// Heliocentric direction of the observer (unit vector)
    pub sun_direction: Vector3<f64>,
    /// Distance from the Sun to the observer (AU)
    pub sun_distance: f64,
    /// Barycentric observer velocity (units of c)
    pub velocity: Vector3<f64>,
    /// sqrt(1 - |v|^2), the reciprocal of the Lorentz factor
    pub lorentz_reciprocal: f64,
    /// Bias-precession-nutation matrix (identity for GCRS)
    pub bpn: Matrix3<f64>,
}

impl EpochParameters {
    /// Parameters for an observer anywhere in the solar system
    ///
    /// # Arguments
    /// * `date` - TDB date
    /// * `position` - Observer geocentric position in GCRS (meters)
    /// * `velocity` - Observer geocentric velocity in GCRS (m/s)
    /// * `ephemeris` - Source of the Earth's state at `date`
    ///
    /// The bpn matrix is the identity, so directions come out in GCRS.
    pub fn for_observer(
        date: JulianDate,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
        ephemeris: EphemerisSource<'_>,
    ) -> Result<Self> {
        let earth = ephemeris.resolve(date)?;

        // Observer offsets from the geocenter, in AU and AU/day
        let dp = position / AU_M;
        let dv = velocity / AUDAY_TO_MS;

        let barycentric_position = earth.barycentric_position + dp;
        let heliocentric = earth.heliocentric_position + dp;

        let velocity = (earth.barycentric_velocity + dv) * AU_LIGHT_TIME_DAYS;
        let v2 = velocity.norm_squared();
        if v2 >= 1.0 {
            return Err(AstrometryError::SuperluminalState(v2));
        }

        let sun_distance = heliocentric.norm();
        if sun_distance == 0.0 {
            return Err(AstrometryError::InvalidParameter(
                "observer is at the center of the Sun".to_string(),
            ));
        }

        debug!(
            "epoch parameters for {}: {:.6} AU from the Sun, |v| = {:.3e} c",
            date, sun_distance, v2.sqrt()
        );

        Ok(Self {
            pm_interval: date.julian_years_since_j2000(),
            barycentric_position,
            sun_direction: heliocentric / sun_distance,
            sun_distance,
            velocity,
            lorentz_reciprocal: (1.0 - v2).sqrt(),
            bpn: Matrix3::identity(),
        })
    }

    /// Parameters for a geocentric observer, directions in GCRS
    pub fn geocentric(date: JulianDate, ephemeris: EphemerisSource<'_>) -> Result<Self> {
        Self::for_observer(date, &Vector3::zeros(), &Vector3::zeros(), ephemeris)
    }

    /// Parameters for a geocentric observer, directions in CIRS
    pub fn cirs(
        date: JulianDate,
        ephemeris: EphemerisSource<'_>,
        cip: &CipCoordinates,
    ) -> Result<Self> {
        let mut params = Self::geocentric(date, ephemeris)?;
        params.bpn = cip.matrix();
        Ok(params)
    }
}

/// Site-dependent parameters for CIRS <-> observed
#[derive(Debug, Clone, PartialEq)]
pub struct SiteParameters {
    /// Longitude plus the TIO locator s' (radians)
    pub longitude: f64,
    /// Polar motion x rotated onto the local meridian (radians)
    pub polar_x: f64,
    /// Polar motion y rotated onto the local meridian (radians)
    pub polar_y: f64,
    pub sin_latitude: f64,
    pub cos_latitude: f64,
    /// Magnitude of the diurnal aberration vector (units of c)
    pub diurnal_aberration: f64,
    pub refraction: RefractionConstants,
}

impl SiteParameters {
    /// Site parameters including diurnal aberration from the site's rotation
    ///
    /// `era` is the Earth rotation angle (radians); the diurnal aberration
    /// only depends on it through rounding.
    pub fn new(
        era: f64,
        site: &ObserverSite,
        polar: &PolarMotion,
        refraction: &RefractionConstants,
    ) -> Result<Self> {
        let (_, velocity) = terrestrial_observer_pv(site, polar, era)?;
        let diurnal = velocity.x.hypot(velocity.y) / C;
        Ok(Self::oriented(site, polar, refraction, diurnal))
    }

    fn oriented(
        site: &ObserverSite,
        polar: &PolarMotion,
        refraction: &RefractionConstants,
        diurnal_aberration: f64,
    ) -> Self {
        let longitude = site.longitude + polar.sp;
        let (sl, cl) = longitude.sin_cos();
        let (sin_latitude, cos_latitude) = site.latitude.sin_cos();
        Self {
            longitude,
            polar_x: polar.xp * cl - polar.yp * sl,
            polar_y: polar.xp * sl + polar.yp * cl,
            sin_latitude,
            cos_latitude,
            diurnal_aberration,
            refraction: *refraction,
        }
    }

    /// Local Earth rotation angle for Earth rotation angle `era`
    pub fn local_rotation_angle(&self, era: f64) -> f64 {
        normalize_angle(era + self.longitude)
    }
}

#[derive(Debug, PartialEq)]
struct SharedParameters {
    epoch: EpochParameters,
    site: Option<SiteParameters>,
}

/// Star-independent astrometry parameters for one observer at one epoch
///
/// Cloning is cheap: clones share the epoch and site parameters.
#[derive(Debug, Clone)]
pub struct AstrometryContext {
    shared: Arc<SharedParameters>,
    /// Local Earth rotation angle (radians)
    rotation_angle: f64,
}

impl AstrometryContext {
    /// Context without a terrestrial site, good for ICRS <-> GCRS/CIRS only
    pub fn new(epoch: EpochParameters) -> Self {
        Self {
            shared: Arc::new(SharedParameters { epoch, site: None }),
            rotation_angle: 0.0,
        }
    }

    /// Context combining epoch and site parameters
    pub fn with_site(epoch: EpochParameters, site: SiteParameters, era: f64) -> Self {
        let rotation_angle = site.local_rotation_angle(era);
        Self {
            shared: Arc::new(SharedParameters {
                epoch,
                site: Some(site),
            }),
            rotation_angle,
        }
    }

    /// Full context for a terrestrial observer, ICRS <-> observed
    ///
    /// # Arguments
    /// * `date` - TDB date
    /// * `ephemeris` - Source of the Earth's state at `date`
    /// * `cip` - CIP X, Y and CIO locator s at `date`
    /// * `era` - Earth rotation angle (radians)
    /// * `site` - Observer location
    /// * `polar` - Polar motion and TIO locator
    /// * `refraction` - Refraction constants
    ///
    /// The site's rotational velocity is folded into the observer velocity,
    /// so the separate diurnal aberration term is zero.
    pub fn terrestrial(
        date: JulianDate,
        ephemeris: EphemerisSource<'_>,
        cip: &CipCoordinates,
        era: f64,
        site: &ObserverSite,
        polar: &PolarMotion,
        refraction: &RefractionConstants,
    ) -> Result<Self> {
        let site_params = SiteParameters::oriented(site, polar, refraction, 0.0);

        let bpn = cip.matrix();

        // Observer position and velocity in CIRS, rotated into GCRS
        let (position, velocity) = terrestrial_observer_pv(site, polar, era)?;
        let to_gcrs = bpn.transpose();

        let mut epoch =
            EpochParameters::for_observer(date, &(to_gcrs * position), &(to_gcrs * velocity), ephemeris)?;
        epoch.bpn = bpn;

        Ok(Self::with_site(epoch, site_params, era))
    }

    pub fn epoch(&self) -> &EpochParameters {
        &self.shared.epoch
    }

    pub fn site(&self) -> Option<&SiteParameters> {
        self.shared.site.as_ref()
    }

    /// Site parameters, or an error if the context has none
    pub fn require_site(&self) -> Result<&SiteParameters> {
        self.site().ok_or_else(|| {
            AstrometryError::InvalidParameter(
                "context has no observer site; build it with site parameters".to_string(),
            )
        })
    }

    /// Local Earth rotation angle (radians, [0, 2π))
    pub fn rotation_angle(&self) -> f64 {
        self.rotation_angle
    }

    /// Move the context to a new Earth rotation angle
    ///
    /// Only the local rotation angle changes; every other parameter stays as
    /// built.
    pub fn update_rotation_angle(&mut self, era: f64) -> Result<()> {
        let angle = self.require_site()?.local_rotation_angle(era);
        debug!(
            "local rotation angle {:.9} -> {:.9} rad",
            self.rotation_angle, angle
        );
        self.rotation_angle = angle;
        Ok(())
    }

    /// A copy of this context at a new Earth rotation angle
    pub fn with_rotation_angle(&self, era: f64) -> Result<Self> {
        let mut context = self.clone();
        context.update_rotation_angle(era)?;
        Ok(context)
    }

    /// True if both contexts share the same epoch and site parameters
    pub fn shares_parameters_with(&self, other: &AstrometryContext) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astrometry::EarthState;
    use approx::assert_relative_eq;

    fn earth() -> EarthState {
        EarthState::new(
            Vector3::new(-0.973458265, -0.209215307, -0.0906996477),
            Vector3::new(-0.974170438, -0.211520082, -0.0917583024),
            Vector3::new(0.00364365824, -0.0154287319, -0.00668922024),
        )
    }

    fn date() -> JulianDate {
        JulianDate::new(2456384.5, 0.970031644)
    }

    #[test]
    fn test_observer_reference_values() {
        let params = EpochParameters::for_observer(
            date(),
            &Vector3::new(-1836024.09, 1056607.72, -5998795.26),
            &Vector3::new(-77.0361767, -133.310856, 0.0971855934),
            EphemerisSource::Supplied(earth()),
        )
        .unwrap();

        assert_relative_eq!(params.pm_interval, 13.25248468622587269, epsilon = 1e-11);
        assert_relative_eq!(params.barycentric_position.x, -0.9741827110629881886, epsilon = 1e-12);
        assert_relative_eq!(params.barycentric_position.y, -0.2115130190136415986, epsilon = 1e-12);
        assert_relative_eq!(params.barycentric_position.z, -0.09179840186954412099, epsilon = 1e-12);
        assert_relative_eq!(params.sun_direction.x, -0.9736425571689454706, epsilon = 1e-12);
        assert_relative_eq!(params.sun_direction.y, -0.2092452125850435930, epsilon = 1e-12);
        assert_relative_eq!(params.sun_direction.z, -0.09075578152248299218, epsilon = 1e-12);
        assert_relative_eq!(params.sun_distance, 0.9998233241709796859, epsilon = 1e-12);
        assert_relative_eq!(params.velocity.x, 0.2078704993282685510e-4, epsilon = 1e-16);
        assert_relative_eq!(params.velocity.y, -0.8955360106989405683e-4, epsilon = 1e-16);
        assert_relative_eq!(params.velocity.z, -0.3863338994289409097e-4, epsilon = 1e-16);
        assert_relative_eq!(params.lorentz_reciprocal, 0.9999999950277561237, epsilon = 1e-12);
        assert_eq!(params.bpn, Matrix3::identity());
    }

    #[test]
    fn test_geocentric_uses_earth_state() {
        let params = EpochParameters::geocentric(date(), EphemerisSource::Supplied(earth())).unwrap();

        assert_eq!(params.barycentric_position, earth().barycentric_position);
        assert_relative_eq!(params.sun_distance, earth().heliocentric_position.norm());
        assert_relative_eq!(params.sun_direction.norm(), 1.0, epsilon = 1e-15);
        assert!(params.lorentz_reciprocal > 0.0 && params.lorentz_reciprocal <= 1.0);
    }

    #[test]
    fn test_cirs_stores_bpn() {
        let cip = CipCoordinates::new(
            0.5791308486706011000e-3,
            0.4020579816732961219e-4,
            -0.1220040848472271978e-7,
        );
        let params = EpochParameters::cirs(date(), EphemerisSource::Supplied(earth()), &cip).unwrap();
        assert_eq!(params.bpn, cip.matrix());
    }

    #[test]
    fn test_superluminal_observer_is_rejected() {
        let mut fast = earth();
        fast.barycentric_velocity = Vector3::new(200.0, 0.0, 0.0);
        let result = EpochParameters::geocentric(date(), EphemerisSource::Supplied(fast));
        assert!(matches!(result, Err(AstrometryError::SuperluminalState(_))));
    }

    #[test]
    fn test_site_parameters() {
        let site = ObserverSite::new(-0.527800806, -1.2345856, 2738.0);
        let polar = PolarMotion::new(2.47230737e-7, 1.82640464e-6, -3.01974337e-11);
        let refraction = RefractionConstants::new(0.000201418779, -2.36140831e-7);
        let params = SiteParameters::new(3.14540971, &site, &polar, &refraction).unwrap();

        assert_relative_eq!(params.longitude, -0.5278008060301974, epsilon = 1e-14);
        assert_relative_eq!(params.polar_x, 1.1334274181749394e-6, epsilon = 1e-18);
        assert_relative_eq!(params.polar_y, 1.4533475957458988e-6, epsilon = 1e-18);
        assert_relative_eq!(params.sin_latitude, -0.9440115679003211329, epsilon = 1e-12);
        assert_relative_eq!(params.cos_latitude, 0.3299123514971474711, epsilon = 1e-12);
        assert_relative_eq!(params.diurnal_aberration, 0.5135843661699913529e-6, epsilon = 1e-12);
        assert_eq!(params.refraction, refraction);

        let context = AstrometryContext::with_site(
            EpochParameters::geocentric(date(), EphemerisSource::Supplied(earth())).unwrap(),
            params,
            3.14540971,
        );
        assert_relative_eq!(context.rotation_angle(), 2.6176089039698027, epsilon = 1e-12);
    }

    fn terrestrial() -> AstrometryContext {
        AstrometryContext::terrestrial(
            date(),
            EphemerisSource::Supplied(earth()),
            &CipCoordinates::new(0.0013122272, -2.92808623e-5, 3.05749468e-8),
            3.14540971,
            &ObserverSite::new(-0.527800806, -1.2345856, 2738.0),
            &PolarMotion::new(2.47230737e-7, 1.82640464e-6, -3.01974337e-11),
            &RefractionConstants::new(0.000201418779, -2.36140831e-7),
        )
        .unwrap()
    }

    #[test]
    fn test_terrestrial_context() {
        let context = terrestrial();
        let site = context.require_site().unwrap();

        // Diurnal aberration already lives in the observer velocity
        assert_eq!(site.diurnal_aberration, 0.0);
        assert_relative_eq!(context.rotation_angle(), 2.6176089039698027, epsilon = 1e-12);

        let epoch = context.epoch();
        assert_relative_eq!(epoch.bpn * epoch.bpn.transpose(), Matrix3::identity(), epsilon = 1e-15);

        // The observer sits about one Earth radius from the geocenter
        let offset = (epoch.barycentric_position - earth().barycentric_position).norm() * AU_M;
        assert!(offset > 6.35e6 && offset < 6.38e6);
    }

    #[test]
    fn test_update_rotation_angle_touches_nothing_else() {
        let mut context = terrestrial();
        let before = context.clone();

        context.update_rotation_angle(3.14540971 + 0.1).unwrap();

        assert!(context.shares_parameters_with(&before));
        assert_eq!(context.epoch(), before.epoch());
        assert_eq!(context.site(), before.site());
        assert_relative_eq!(
            context.rotation_angle(),
            before.rotation_angle() + 0.1,
            epsilon = 1e-12
        );

        let later = context.with_rotation_angle(3.14540971 + 10.0).unwrap();
        assert!(later.shares_parameters_with(&before));
        assert!(later.rotation_angle() >= 0.0 && later.rotation_angle() < std::f64::consts::TAU);
    }

    #[test]
    fn test_rotation_update_requires_site() {
        let mut context = AstrometryContext::new(
            EpochParameters::geocentric(date(), EphemerisSource::Supplied(earth())).unwrap(),
        );
        assert!(context.site().is_none());
        assert!(matches!(
            context.update_rotation_angle(1.0),
            Err(AstrometryError::InvalidParameter(_))
        ));
    }
}
