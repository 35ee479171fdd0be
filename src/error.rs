use crate::types::WorkoutId;
use std::fmt;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Form field that failed the "finite and positive" check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Distance,
    Duration,
    Cadence,
    Elevation,
}

impl Field {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Duration => "duration",
            Self::Cadence => "cadence",
            Self::Elevation => "elevation",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Non-empty list of rejected fields, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFields(pub Vec<Field>);

impl InvalidFields {
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains(&field)
    }
}

impl fmt::Display for InvalidFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|field| field.name()).collect();
        f.write_str(&names.join(", "))
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Inputs have to be positive numbers ({0})")]
    InvalidInput(InvalidFields),

    #[error("Stored workouts are not valid JSON: {0}")]
    MalformedStore(#[source] serde_json::Error),

    #[error("Stored value for {key:?} is not text ({found})")]
    UnreadableValue { key: String, found: &'static str },

    #[error("No workout with id {0}")]
    NotFound(WorkoutId),

    #[error("Could not get your current position: {0}")]
    GeolocationUnavailable(String),

    #[error("The map is not loaded yet")]
    MapNotLoaded,

    #[error("Click on the map to pick a location first")]
    NoPendingLocation,

    #[error("Unknown workout type {0:?} (expected running or cycling)")]
    UnknownKind(String),

    #[error("Invalid coordinates {0:?} (expected LAT,LNG)")]
    InvalidCoords(String),

    #[error("Encoding workouts failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Key-value store error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl Error {
    /// Rejected fields when this is an `InvalidInput`.
    pub const fn invalid_fields(&self) -> Option<&InvalidFields> {
        match self {
            Self::InvalidInput(fields) => Some(fields),
            _ => None,
        }
    }
}
