use crate::error::Result;
use crate::types::WorkoutKind;

/// Raw values as typed into the workout form.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub kind: String,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

/// Form values after numeric coercion, not yet validated.
///
/// `extra` is the cadence for running and the elevation gain for cycling; the
/// other field of the form is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedForm {
    pub kind: WorkoutKind,
    pub distance_km: f64,
    pub duration_min: f64,
    pub extra: f64,
}

impl FormInput {
    pub fn parse(&self) -> Result<ParsedForm> {
        let kind: WorkoutKind = self.kind.parse()?;
        let extra = match kind {
            WorkoutKind::Running => coerce(&self.cadence),
            WorkoutKind::Cycling => coerce(&self.elevation),
        };

        Ok(ParsedForm {
            kind,
            distance_km: coerce(&self.distance),
            duration_min: coerce(&self.duration),
            extra,
        })
    }

    /// Blanks the numeric fields after a successful submit.
    pub fn clear(&mut self) {
        self.distance.clear();
        self.duration.clear();
        self.cadence.clear();
        self.elevation.clear();
    }
}

/// Number coercion of a form field: blank means 0, garbage means NaN.
pub fn coerce(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    s.parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_coerce() {
        assert_eq!(coerce("5.2"), 5.2);
        assert_eq!(coerce("  24 "), 24.0);
        assert_eq!(coerce("-1"), -1.0);
        assert_eq!(coerce("1e3"), 1000.0);
        assert_eq!(coerce(""), 0.0);
        assert_eq!(coerce("   "), 0.0);
        assert!(coerce("abc").is_nan());
        assert!(coerce("5km").is_nan());
    }

    #[test]
    fn test_parse_picks_variant_field() {
        let input = FormInput {
            kind: "running".into(),
            distance: "5.2".into(),
            duration: "24".into(),
            cadence: "178".into(),
            elevation: "999".into(),
        };
        let parsed = input.parse().unwrap();
        assert_eq!(parsed.kind, WorkoutKind::Running);
        assert_eq!(parsed.extra, 178.0);

        let input = FormInput {
            kind: "cycling".into(),
            ..input
        };
        assert_eq!(input.parse().unwrap().extra, 999.0);
    }

    #[test]
    fn test_parse_unknown_kind() {
        let input = FormInput {
            kind: "rowing".into(),
            ..FormInput::default()
        };
        assert!(matches!(input.parse(), Err(Error::UnknownKind(_))));
    }

    #[test]
    fn test_clear_keeps_kind() {
        let mut input = FormInput {
            kind: "cycling".into(),
            distance: "27".into(),
            duration: "95".into(),
            cadence: String::new(),
            elevation: "523".into(),
        };
        input.clear();
        assert_eq!(input.kind, "cycling");
        assert!(input.distance.is_empty() && input.elevation.is_empty());
    }
}
