//! The outside world as the session sees it: something that knows where the
//! user is, and something that draws the map, the list and the form.

use crate::dlog;
use crate::error::{Error, Result};
use crate::types::Coords;
use crate::workout::{Activity, Workout};
use std::io::Write;

/// Geolocation source, asked once when a session starts.
pub trait PositionProvider {
    fn locate(&mut self) -> Result<Coords>;
}

/// Map and list UI.
pub trait Renderer {
    fn load_map(&mut self, center: Coords, zoom: u8);
    fn render_marker(&mut self, workout: &Workout);
    fn render_list(&mut self, workouts: &[Workout]);
    fn move_to(&mut self, coords: Coords, zoom: u8);
    fn show_form(&mut self);
    fn hide_form(&mut self);
    fn alert(&mut self, message: &str);
}

/// Position given up front (command line or environment), if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition(pub Option<Coords>);

impl PositionProvider for FixedPosition {
    fn locate(&mut self) -> Result<Coords> {
        self.0.ok_or_else(|| {
            Error::GeolocationUnavailable(
                "no position configured (use --position or MAPTY_POSITION)".to_string(),
            )
        })
    }
}

/// One line per workout, as shown in the sidebar list.
pub fn summary_line(w: &Workout) -> String {
    let head = format!(
        "{} {}  [{}]  {} km  {} min",
        w.kind().emoji(),
        w.description(),
        w.id(),
        w.distance_km(),
        w.duration_min()
    );

    match *w.activity() {
        Activity::Running {
            cadence_spm,
            pace_min_per_km,
        } => format!("{head}  ⚡️ {pace_min_per_km:.1} min/km  🦶🏼 {cadence_spm} spm"),
        Activity::Cycling {
            elevation_gain_m,
            speed_km_per_h,
        } => format!("{head}  ⚡️ {speed_km_per_h:.1} km/h  ⛰ {elevation_gain_m} m"),
    }
}

/// Plain-text stand-in for the map and sidebar.
///
/// Map and list output can be muted (e.g. while replaying a stored list at
/// start-up); alerts are always written.
pub struct TerminalRenderer<W: Write> {
    out: W,
    muted: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, muted: false }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            tracing::warn!(err = %e, "could not write to terminal");
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn load_map(&mut self, center: Coords, zoom: u8) {
        dlog!("map loaded center={center} zoom={zoom}");
        if !self.muted {
            self.line(&format!(
                "map centred on https://www.google.com/maps/@{},{},{zoom}z",
                center.lat, center.lng
            ));
        }
    }

    fn render_marker(&mut self, workout: &Workout) {
        dlog!("marker id={} class={}", workout.id(), workout.css_class());
        if !self.muted {
            self.line(&format!(
                "📍 {} at {}",
                workout.popup_label(),
                workout.coords()
            ));
        }
    }

    fn render_list(&mut self, workouts: &[Workout]) {
        if self.muted {
            return;
        }
        if workouts.is_empty() {
            self.line("No workouts yet.");
            return;
        }
        for w in workouts {
            self.line(&summary_line(w));
        }
    }

    fn move_to(&mut self, coords: Coords, zoom: u8) {
        if !self.muted {
            self.line(&format!(
                "map moved to https://www.google.com/maps/@{},{},{zoom}z",
                coords.lat, coords.lng
            ));
        }
    }

    fn show_form(&mut self) {
        dlog!("form shown");
    }

    fn hide_form(&mut self) {
        dlog!("form hidden");
    }

    fn alert(&mut self, message: &str) {
        self.line(&format!("⚠ {message}"));
    }
}
