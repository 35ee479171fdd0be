//! Workout records and the metrics derived from them.
//!
//! A [`Workout`] is only ever built through [`Workout::running`] or
//! [`Workout::cycling`] (or the `create_*` shorthands), so the cached pace,
//! speed and description always agree with the measured fields. Reloading from
//! storage goes through the same constructors.

use crate::error::{Field, InvalidFields, Result};
use crate::types::{Coords, WorkoutId, WorkoutKind};
use chrono::{DateTime, Datelike, Local, SubsecRound, TimeZone, Utc};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const MINUTES_PER_HOUR: f64 = 60.0;

/// Identity of a workout: when it was created and the id derived from that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutMeta {
    pub id: WorkoutId,
    pub created_at: DateTime<Utc>,
}

impl WorkoutMeta {
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Truncates to milliseconds, which is all the stored timestamp keeps.
    pub fn at(created_at: DateTime<Utc>) -> Self {
        let created_at = created_at.trunc_subsecs(3);
        Self {
            id: WorkoutId::from_millis(created_at.timestamp_millis()),
            created_at,
        }
    }
}

/// Variant payload with its cached metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activity {
    Running {
        cadence_spm: u32,
        pace_min_per_km: f64,
    },
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

impl Activity {
    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    description: String,
    activity: Activity,
}

/// Builds a running workout stamped with the current time.
pub fn create_running(
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    cadence_spm: f64,
) -> Result<Workout> {
    Workout::running(WorkoutMeta::now(), coords, distance_km, duration_min, cadence_spm)
}

/// Builds a cycling workout stamped with the current time.
pub fn create_cycling(
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    elevation_gain_m: f64,
) -> Result<Workout> {
    Workout::cycling(
        WorkoutMeta::now(),
        coords,
        distance_km,
        duration_min,
        elevation_gain_m,
    )
}

impl Workout {
    /// Fails with `InvalidInput` listing every field that is not a finite
    /// positive number. Cadence must also be a whole number of steps.
    pub fn running(
        meta: WorkoutMeta,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Result<Self> {
        let mut bad = common_checks(distance_km, duration_min);
        if !is_whole_cadence(cadence_spm) {
            bad.push(Field::Cadence);
        }
        reject(bad)?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let cadence_spm = cadence_spm as u32;

        Ok(Self::assemble(
            meta,
            coords,
            distance_km,
            duration_min,
            Activity::Running {
                cadence_spm,
                pace_min_per_km: pace(distance_km, duration_min),
            },
        ))
    }

    /// Elevation gain may be zero or negative; only a non-finite value is
    /// refused, since it could not be stored.
    pub fn cycling(
        meta: WorkoutMeta,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Result<Self> {
        let mut bad = common_checks(distance_km, duration_min);
        if !elevation_gain_m.is_finite() {
            bad.push(Field::Elevation);
        }
        reject(bad)?;

        Ok(Self::assemble(
            meta,
            coords,
            distance_km,
            duration_min,
            Activity::Cycling {
                elevation_gain_m,
                speed_km_per_h: speed(distance_km, duration_min),
            },
        ))
    }

    fn assemble(
        meta: WorkoutMeta,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        activity: Activity,
    ) -> Self {
        let description = describe(activity.kind(), &meta.created_at);
        Self {
            id: meta.id,
            created_at: meta.created_at,
            coords,
            distance_km,
            duration_min,
            description,
            activity,
        }
    }

    pub const fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn coords(&self) -> Coords {
        self.coords
    }

    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub const fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn activity(&self) -> &Activity {
        &self.activity
    }

    pub const fn kind(&self) -> WorkoutKind {
        self.activity.kind()
    }

    /// Pace for running (min/km), speed for cycling (km/h).
    pub const fn metric(&self) -> f64 {
        match self.activity {
            Activity::Running {
                pace_min_per_km, ..
            } => pace_min_per_km,
            Activity::Cycling { speed_km_per_h, .. } => speed_km_per_h,
        }
    }

    /// Marker popup text, e.g. `🏃‍♂️ Running on April 14`.
    pub fn popup_label(&self) -> String {
        format!("{} {}", self.kind().emoji(), self.description)
    }

    /// Styling hook for the marker popup.
    pub fn css_class(&self) -> String {
        format!("{}-popup", self.kind())
    }
}

pub fn pace(distance_km: f64, duration_min: f64) -> f64 {
    duration_min / distance_km
}

pub fn speed(distance_km: f64, duration_min: f64) -> f64 {
    distance_km / (duration_min / MINUTES_PER_HOUR)
}

/// `"{Kind} on {Month} {day}"` in local time.
pub fn describe(kind: WorkoutKind, created_at: &DateTime<Utc>) -> String {
    describe_in(kind, created_at, &Local)
}

pub fn describe_in<Tz: TimeZone>(kind: WorkoutKind, created_at: &DateTime<Utc>, tz: &Tz) -> String {
    let local = created_at.with_timezone(tz);
    let month = MONTHS[local.month0() as usize];
    format!("{} on {} {}", kind.label(), month, local.day())
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn is_whole_cadence(v: f64) -> bool {
    is_positive(v) && v.fract() == 0.0 && v <= f64::from(u32::MAX)
}

fn common_checks(distance_km: f64, duration_min: f64) -> Vec<Field> {
    let mut bad = Vec::new();
    if !is_positive(distance_km) {
        bad.push(Field::Distance);
    }
    if !is_positive(duration_min) {
        bad.push(Field::Duration);
    }
    bad
}

fn reject(bad: Vec<Field>) -> Result<()> {
    if bad.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::InvalidInput(InvalidFields(bad)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use chrono::FixedOffset;

    const EPS: f64 = 1e-9;

    fn here() -> Coords {
        Coords::new(39.0, -12.0)
    }

    fn meta() -> WorkoutMeta {
        WorkoutMeta::at(Utc.with_ymd_and_hms(2024, 4, 14, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_running_pace() {
        let w = create_running(here(), 5.2, 24.0, 178.0).unwrap();
        assert_eq!(w.kind(), WorkoutKind::Running);
        assert!((w.metric() - 24.0 / 5.2).abs() < EPS);
        assert!((w.metric() - 4.615).abs() < 1e-3);
        assert_eq!(
            *w.activity(),
            Activity::Running {
                cadence_spm: 178,
                pace_min_per_km: 24.0 / 5.2
            }
        );
    }

    #[test]
    fn test_cycling_speed() {
        let w = create_cycling(here(), 27.0, 95.0, 523.0).unwrap();
        assert_eq!(w.kind(), WorkoutKind::Cycling);
        assert!((w.metric() - 27.0 / (95.0 / 60.0)).abs() < EPS);
        assert!((w.metric() - 17.05).abs() < 1e-2);
    }

    #[test]
    fn test_pace_and_speed_over_a_grid() {
        for d in [0.1, 1.0, 5.2, 42.195, 160.0] {
            for t in [0.5, 24.0, 95.0, 600.0] {
                let r = Workout::running(meta(), here(), d, t, 170.0).unwrap();
                assert!((r.metric() - t / d).abs() < EPS);

                let c = Workout::cycling(meta(), here(), d, t, 0.0).unwrap();
                assert!((c.metric() - d / (t / 60.0)).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_running_rejects_each_bad_field() {
        let err = Workout::running(meta(), here(), -1.0, 24.0, 178.0).unwrap_err();
        let fields = err.invalid_fields().unwrap();
        assert_eq!(fields.0, vec![Field::Distance]);

        let err = Workout::running(meta(), here(), f64::NAN, 0.0, 0.0).unwrap_err();
        assert_eq!(
            err.invalid_fields().unwrap().0,
            vec![Field::Distance, Field::Duration, Field::Cadence]
        );

        let err = Workout::running(meta(), here(), 5.0, f64::INFINITY, 170.5).unwrap_err();
        assert_eq!(
            err.invalid_fields().unwrap().0,
            vec![Field::Duration, Field::Cadence]
        );
    }

    #[test]
    fn test_cycling_allows_zero_and_negative_elevation() {
        assert!(Workout::cycling(meta(), here(), 10.0, 30.0, 0.0).is_ok());
        assert!(Workout::cycling(meta(), here(), 10.0, 30.0, -120.0).is_ok());

        let err = Workout::cycling(meta(), here(), 0.0, 30.0, -5.0).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref f) if f.0 == vec![Field::Distance]));

        let err = Workout::cycling(meta(), here(), 1.0, 30.0, f64::NAN).unwrap_err();
        assert!(err.invalid_fields().unwrap().contains(Field::Elevation));
    }

    #[test]
    fn test_description_format() {
        let t = Utc.with_ymd_and_hms(2024, 4, 14, 12, 0, 0).unwrap();
        assert_eq!(
            describe_in(WorkoutKind::Running, &t, &Utc),
            "Running on April 14"
        );
        assert_eq!(
            describe_in(WorkoutKind::Cycling, &t, &Utc),
            "Cycling on April 14"
        );

        // Late evening UTC is already the next day further east.
        let t = Utc.with_ymd_and_hms(2023, 12, 31, 23, 30, 0).unwrap();
        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            describe_in(WorkoutKind::Running, &t, &east),
            "Running on January 1"
        );
    }

    #[test]
    fn test_meta_truncates_to_millis() {
        let t = Utc.timestamp_opt(1_713_096_000, 123_456_789).unwrap();
        let m = WorkoutMeta::at(t);
        assert_eq!(m.created_at.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(m.id.as_str(), "3096000123");
    }

    #[test]
    fn test_popup_label_and_class() {
        let w = Workout::cycling(meta(), here(), 27.0, 95.0, 523.0).unwrap();
        assert_eq!(w.css_class(), "cycling-popup");
        assert!(w.popup_label().starts_with("🚴‍♀️ Cycling on "));
    }
}
