use crate::codec;
use crate::collaborators::{PositionProvider, Renderer};
use crate::dlog;
use crate::error::{Error, Result};
use crate::form::FormInput;
use crate::storage::{KeyValueStore, WORKOUTS_KEY};
use crate::types::{Coords, WorkoutId, WorkoutKind};
use crate::workout::{Workout, WorkoutMeta};
use chrono::Duration;

/// Zoom used when the map loads and when jumping to a workout.
pub const MAP_ZOOM_LEVEL: u8 = 13;

const INVALID_INPUT_ALERT: &str = "Inputs have to be positive numbers!";

/// One run of the application: the workout list plus the map and form state.
///
/// Every handler runs to completion before the next event is accepted, and
/// the stored snapshot is rewritten in full after each addition.
pub struct Session<S: KeyValueStore, R: Renderer> {
    store: S,
    renderer: R,
    workouts: Vec<Workout>,
    map_center: Option<Coords>,
    pending_click: Option<Coords>,
}

impl<S: KeyValueStore, R: Renderer> Session<S, R> {
    /// Empty session without map; nothing is read yet.
    pub fn new(store: S, renderer: R) -> Self {
        Self {
            store,
            renderer,
            workouts: Vec::new(),
            map_center: None,
            pending_click: None,
        }
    }

    /// Loads stored workouts, renders the list, then asks for the position
    /// and loads the map if there is one.
    pub fn start(store: S, renderer: R, locator: &mut dyn PositionProvider) -> Result<Self> {
        let mut session = Self::new(store, renderer);
        session.load_from_store()?;
        session.renderer.render_list(&session.workouts);

        match locator.locate() {
            Ok(coords) => session.on_position(coords),
            Err(e) => session.on_position_failed(&e),
        }

        Ok(session)
    }

    /// Replaces the in-memory list with what the store holds. A snapshot that
    /// cannot be read or parsed counts as no snapshot.
    pub fn load_from_store(&mut self) -> Result<&[Workout]> {
        let stored = match self.store.get(WORKOUTS_KEY) {
            Ok(stored) => stored,
            Err(e @ Error::UnreadableValue { .. }) => {
                tracing::warn!(err = %e, "ignoring unreadable stored workouts");
                None
            }
            Err(e) => return Err(e),
        };

        let records = match stored {
            None => Vec::new(),
            Some(raw) => match codec::deserialize(&raw) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(err = %e, "ignoring unreadable stored workouts");
                    Vec::new()
                }
            },
        };

        let mut workouts: Vec<Workout> = Vec::with_capacity(records.len());
        for rec in records {
            let id = rec.id.clone();
            match codec::rehydrate(rec) {
                Ok(w) if workouts.iter().any(|k| k.id() == w.id()) => {
                    tracing::warn!(id = %id, "skipping stored workout with duplicate id");
                }
                Ok(w) => workouts.push(w),
                Err(e) => tracing::warn!(id = %id, err = %e, "skipping invalid stored workout"),
            }
        }

        tracing::info!(workouts = workouts.len(), "loaded workouts");
        self.workouts = workouts;
        Ok(&self.workouts)
    }

    /// Geolocation succeeded: show the map and a marker per known workout.
    pub fn on_position(&mut self, coords: Coords) {
        tracing::info!(lat = coords.lat, lng = coords.lng, "position acquired");
        self.map_center = Some(coords);
        self.renderer.load_map(coords, MAP_ZOOM_LEVEL);
        for w in &self.workouts {
            self.renderer.render_marker(w);
        }
    }

    /// Geolocation failed: keep going without a map.
    pub fn on_position_failed(&mut self, err: &Error) {
        tracing::warn!(err = %err, "continuing without map");
        self.renderer.alert("Could not get your current position");
    }

    pub const fn map_loaded(&self) -> bool {
        self.map_center.is_some()
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Remembers where the map was clicked and opens the form.
    pub fn on_map_clicked(&mut self, coords: Coords) -> Result<()> {
        if !self.map_loaded() {
            return Err(Error::MapNotLoaded);
        }
        dlog!("map clicked at {coords}");
        self.pending_click = Some(coords);
        self.renderer.show_form();
        Ok(())
    }

    /// Validates, appends and persists a workout. The list is untouched when
    /// validation or the store write fails.
    ///
    /// `extra` is the cadence for running and the elevation gain for cycling.
    pub fn add_workout(
        &mut self,
        kind: WorkoutKind,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        extra: f64,
    ) -> Result<&Workout> {
        let idx = self.append(kind, coords, distance_km, duration_min, extra)?;
        Ok(&self.workouts[idx])
    }

    /// Form submit: uses the last map click as location. Invalid numbers are
    /// reported through the renderer and leave the form open and filled in;
    /// on success the numeric fields are cleared.
    pub fn submit_form(&mut self, form: &mut FormInput) -> Result<&Workout> {
        let coords = self.pending_click.ok_or(Error::NoPendingLocation)?;

        let parsed = match form.parse() {
            Ok(p) => p,
            Err(e) => {
                self.renderer.alert(&e.to_string());
                return Err(e);
            }
        };

        let idx = match self.append(
            parsed.kind,
            coords,
            parsed.distance_km,
            parsed.duration_min,
            parsed.extra,
        ) {
            Ok(idx) => idx,
            Err(e) => {
                if matches!(e, Error::InvalidInput(_)) {
                    self.renderer.alert(INVALID_INPUT_ALERT);
                }
                return Err(e);
            }
        };

        form.clear();
        self.pending_click = None;
        self.renderer.hide_form();
        Ok(&self.workouts[idx])
    }

    pub fn find_by_id(&self, id: &WorkoutId) -> Result<&Workout> {
        self.workouts
            .iter()
            .find(|w| w.id() == id)
            .ok_or_else(|| Error::NotFound(id.clone()))
    }

    /// List entry clicked: centre the map on that workout. Nothing is drawn
    /// unless the map is loaded and the id is known.
    pub fn on_list_item_clicked(&mut self, id: &WorkoutId) -> Result<&Workout> {
        if !self.map_loaded() {
            return Err(Error::MapNotLoaded);
        }
        let idx = self
            .workouts
            .iter()
            .position(|w| w.id() == id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;

        self.renderer.move_to(self.workouts[idx].coords(), MAP_ZOOM_LEVEL);
        Ok(&self.workouts[idx])
    }

    /// Deletes the stored snapshot and ends the session. The store and
    /// renderer are handed back so the caller can start a fresh session.
    pub fn reset_all(mut self) -> Result<(S, R)> {
        self.store.remove(WORKOUTS_KEY)?;
        tracing::info!(dropped = self.workouts.len(), "session reset");
        Ok((self.store, self.renderer))
    }

    fn append(
        &mut self,
        kind: WorkoutKind,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        extra: f64,
    ) -> Result<usize> {
        let meta = self.next_meta();
        let workout = match kind {
            WorkoutKind::Running => {
                Workout::running(meta, coords, distance_km, duration_min, extra)?
            }
            WorkoutKind::Cycling => {
                Workout::cycling(meta, coords, distance_km, duration_min, extra)?
            }
        };

        self.workouts.push(workout);
        if let Err(e) = self.persist() {
            self.workouts.pop();
            tracing::error!(err = %e, "could not store workouts; addition rolled back");
            return Err(e);
        }

        let idx = self.workouts.len() - 1;
        let w = &self.workouts[idx];
        tracing::info!(id = %w.id(), kind = %w.kind(), metric = w.metric(), "workout added");

        if self.map_loaded() {
            self.renderer.render_marker(w);
        }
        self.renderer.render_list(&self.workouts);

        Ok(idx)
    }

    fn persist(&mut self) -> Result<()> {
        let raw = codec::serialize(&self.workouts)?;
        self.store.set(WORKOUTS_KEY, &raw)
    }

    /// Current time, pushed forward a millisecond at a time until its id is
    /// not already taken in this list.
    fn next_meta(&self) -> WorkoutMeta {
        let mut meta = WorkoutMeta::now();
        while self.workouts.iter().any(|w| *w.id() == meta.id) {
            meta = WorkoutMeta::at(meta.created_at + Duration::milliseconds(1));
        }
        meta
    }
}
