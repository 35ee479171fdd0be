use crate::dlog;
use crate::error::{Error, Field, InvalidFields, Result};
use crate::types::{Coords, WorkoutId, WorkoutKind};
use crate::workout::{Activity, Workout, WorkoutMeta};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A workout exactly as stored: flat fields, derived values included, no
/// behaviour. Turn it back into a [`Workout`] with [`rehydrate`].
///
/// Reading also accepts the older key names (`date`, `type`, `distance`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainRecord {
    pub id: WorkoutId,
    #[serde(alias = "date")]
    pub created_at: DateTime<Utc>,
    pub coords: Coords,
    #[serde(alias = "distance")]
    pub distance_km: f64,
    #[serde(alias = "duration")]
    pub duration_min: f64,
    #[serde(alias = "type")]
    pub variant_kind: WorkoutKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, alias = "cadence", skip_serializing_if = "Option::is_none")]
    pub cadence_spm: Option<u32>,
    #[serde(default, alias = "pace", skip_serializing_if = "Option::is_none")]
    pub pace_min_per_km: Option<f64>,

    #[serde(default, alias = "elevationGain", skip_serializing_if = "Option::is_none")]
    pub elevation_gain_m: Option<f64>,
    #[serde(default, alias = "speed", skip_serializing_if = "Option::is_none")]
    pub speed_km_per_h: Option<f64>,
}

impl From<&Workout> for PlainRecord {
    fn from(w: &Workout) -> Self {
        let mut rec = Self {
            id: w.id().clone(),
            created_at: w.created_at(),
            coords: w.coords(),
            distance_km: w.distance_km(),
            duration_min: w.duration_min(),
            variant_kind: w.kind(),
            description: Some(w.description().to_string()),
            cadence_spm: None,
            pace_min_per_km: None,
            elevation_gain_m: None,
            speed_km_per_h: None,
        };

        match *w.activity() {
            Activity::Running {
                cadence_spm,
                pace_min_per_km,
            } => {
                rec.cadence_spm = Some(cadence_spm);
                rec.pace_min_per_km = Some(pace_min_per_km);
            }
            Activity::Cycling {
                elevation_gain_m,
                speed_km_per_h,
            } => {
                rec.elevation_gain_m = Some(elevation_gain_m);
                rec.speed_km_per_h = Some(speed_km_per_h);
            }
        }

        rec
    }
}

/// Encodes the whole list, in order, as a JSON array.
pub fn serialize(workouts: &[Workout]) -> Result<String> {
    let records: Vec<PlainRecord> = workouts.iter().map(PlainRecord::from).collect();
    serde_json::to_string(&records).map_err(Error::Encode)
}

/// Parses a stored snapshot into plain records.
///
/// Only a snapshot that is not a JSON array is `MalformedStore`. Individual
/// entries that don't have the record shape are dropped with a warning so one
/// bad entry doesn't cost the rest of the list.
pub fn deserialize(raw: &str) -> Result<Vec<PlainRecord>> {
    let entries: Vec<JsonValue> = serde_json::from_str(raw).map_err(Error::MalformedStore)?;

    let mut out = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<PlainRecord>(entry) {
            Ok(rec) => out.push(rec),
            Err(e) => tracing::warn!(idx, err = %e, "skipping stored entry that is not a workout"),
        }
    }

    Ok(out)
}

/// Rebuilds a full [`Workout`] from a stored record, recomputing the pace or
/// speed and the description instead of trusting the cached copies.
pub fn rehydrate(rec: PlainRecord) -> Result<Workout> {
    let meta = WorkoutMeta {
        id: rec.id,
        created_at: rec.created_at,
    };

    let workout = match rec.variant_kind {
        WorkoutKind::Running => {
            let cadence = rec
                .cadence_spm
                .ok_or_else(|| Error::InvalidInput(InvalidFields(vec![Field::Cadence])))?;
            Workout::running(
                meta,
                rec.coords,
                rec.distance_km,
                rec.duration_min,
                f64::from(cadence),
            )?
        }
        WorkoutKind::Cycling => {
            let elevation = rec
                .elevation_gain_m
                .ok_or_else(|| Error::InvalidInput(InvalidFields(vec![Field::Elevation])))?;
            Workout::cycling(
                meta,
                rec.coords,
                rec.distance_km,
                rec.duration_min,
                elevation,
            )?
        }
    };

    let stored_metric = rec.pace_min_per_km.or(rec.speed_km_per_h);
    if stored_metric.is_some_and(|m| m != workout.metric()) {
        dlog!(
            "stored metric differs id={} stored={:?} recomputed={}",
            workout.id(),
            stored_metric,
            workout.metric()
        );
    }
    if rec
        .description
        .as_deref()
        .is_some_and(|d| d != workout.description())
    {
        dlog!(
            "stored description differs id={} stored={:?} recomputed={:?}",
            workout.id(),
            rec.description,
            workout.description()
        );
    }

    Ok(workout)
}
