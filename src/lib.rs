pub mod cli;
pub mod codec;
pub mod collaborators;
pub mod error;
pub mod form;
pub mod session;
pub mod storage;
pub mod types;
pub mod utils;
pub mod workout;

pub use error::{Error, Result};
pub use session::Session;
pub use types::{Coords, WorkoutId, WorkoutKind};
pub use workout::{Activity, Workout, WorkoutMeta};
