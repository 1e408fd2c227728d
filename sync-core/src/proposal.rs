//! Pending update proposals.
//!
//! A proposal is one user-confirmable difference between a remote package
//! and local storage: either a whole new event for an unscheduled month, or
//! a change to a single field of a scheduled month. Proposals live only in
//! memory until they are accepted or discarded.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use monthsync_types::{EventRecord, ProposalId};

use crate::ApplyError;

/// Display value used as the "before" side of a new event.
pub const NO_EVENT: &str = "No event";

/// Which field a [`ProposedChange`] touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Event title.
    Title,
    /// Event location.
    Location,
    /// Day of month.
    Day,
}

impl Field {
    /// Wire/display name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Location => "location",
            Field::Day => "day",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ApplyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Field::Title),
            "location" => Ok(Field::Location),
            "day" => Ok(Field::Day),
            other => Err(ApplyError::UnknownField(other.to_string())),
        }
    }
}

/// Coarse classification used by UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalKind {
    /// Local month unscheduled, remote supplies content.
    NewEvent,
    /// Local month scheduled, one field differs.
    FieldChange,
}

/// The typed change a proposal carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposedChange {
    /// Write the whole remote event into an unscheduled month.
    NewEvent,
    /// Replace the title.
    Title {
        /// Current local value.
        old: String,
        /// Remote value.
        new: String,
    },
    /// Replace the location.
    Location {
        /// Current local value.
        old: String,
        /// Remote value.
        new: String,
    },
    /// Replace the day.
    Day {
        /// Current local value.
        old: i32,
        /// Remote value.
        new: i32,
    },
}

impl ProposedChange {
    /// Build a field change from its display form.
    ///
    /// This is the only place string values are parsed; a day that is not
    /// an integer is an [`ApplyError::InvalidDay`].
    pub fn from_display(field: &str, old: &str, new: &str) -> Result<Self, ApplyError> {
        match field.parse::<Field>()? {
            Field::Title => Ok(Self::Title {
                old: old.to_string(),
                new: new.to_string(),
            }),
            Field::Location => Ok(Self::Location {
                old: old.to_string(),
                new: new.to_string(),
            }),
            Field::Day => Ok(Self::Day {
                old: parse_day(old)?,
                new: parse_day(new)?,
            }),
        }
    }

    /// The field touched, `None` for a new event.
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::NewEvent => None,
            Self::Title { .. } => Some(Field::Title),
            Self::Location { .. } => Some(Field::Location),
            Self::Day { .. } => Some(Field::Day),
        }
    }
}

fn parse_day(value: &str) -> Result<i32, ApplyError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApplyError::InvalidDay(value.to_string()))
}

/// One detected difference awaiting user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    /// Identity for UI correlation.
    pub id: ProposalId,
    /// Name of the device the change came from.
    pub source_device_name: String,
    /// Affected month.
    pub month: i32,
    /// Display name of the month.
    pub month_name: String,
    /// What would change.
    pub change: ProposedChange,
    /// The full remote record, so accepting a new event has complete data.
    pub remote_event: EventRecord,
    /// When the diff was computed.
    pub detected_at: DateTime<Utc>,
}

impl PendingUpdate {
    /// Create a proposal with a fresh id.
    pub fn new(
        source_device_name: impl Into<String>,
        change: ProposedChange,
        remote_event: EventRecord,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProposalId::new(),
            source_device_name: source_device_name.into(),
            month: remote_event.month,
            month_name: remote_event.month_name.clone(),
            change,
            remote_event,
            detected_at,
        }
    }

    /// New event or field change.
    pub fn kind(&self) -> ProposalKind {
        match self.change {
            ProposedChange::NewEvent => ProposalKind::NewEvent,
            _ => ProposalKind::FieldChange,
        }
    }

    /// Field touched by a field change.
    pub fn field(&self) -> Option<Field> {
        self.change.field()
    }

    /// Display form of the current local value.
    pub fn old_value(&self) -> String {
        match &self.change {
            ProposedChange::NewEvent => NO_EVENT.to_string(),
            ProposedChange::Title { old, .. } | ProposedChange::Location { old, .. } => old.clone(),
            ProposedChange::Day { old, .. } => old.to_string(),
        }
    }

    /// Display form of the proposed value.
    pub fn new_value(&self) -> String {
        match &self.change {
            ProposedChange::NewEvent => self.remote_event.title.clone(),
            ProposedChange::Title { new, .. } | ProposedChange::Location { new, .. } => new.clone(),
            ProposedChange::Day { new, .. } => new.to_string(),
        }
    }

    /// Replace the proposed value with a user-edited display string.
    ///
    /// Keeps the id. New events cannot be amended field-wise. The edited
    /// value must still make a valid event in `year`: a day within the
    /// month, a non-empty title.
    pub fn with_new_value(&self, value: &str, year: i32) -> Result<Self, ApplyError> {
        let field = self
            .field()
            .ok_or_else(|| ApplyError::UnknownField("event".to_string()))?;
        let change = ProposedChange::from_display(field.as_str(), &self.old_value(), value)?;

        // The remote record already passed validation; only the edited field can break it
        let mut candidate = self.remote_event.clone();
        match &change {
            ProposedChange::NewEvent => {}
            ProposedChange::Title { new, .. } => candidate.title = new.clone(),
            ProposedChange::Location { new, .. } => candidate.location = new.clone(),
            ProposedChange::Day { new, .. } => candidate.day = *new,
        }
        candidate.validate(year)?;

        Ok(Self {
            change,
            ..self.clone()
        })
    }

    /// One-line description, e.g. `April title: "Earth Day" -> "Earth Day Festival"`.
    pub fn summary(&self) -> String {
        match self.field() {
            None => format!(
                "{} new event from {}: \"{}\" on day {}",
                self.month_name, self.source_device_name, self.remote_event.title, self.remote_event.day
            ),
            Some(field) => format!(
                "{} {} from {}: \"{}\" -> \"{}\"",
                self.month_name,
                field,
                self.source_device_name,
                self.old_value(),
                self.new_value()
            ),
        }
    }
}

/// Order proposals by month, new events first, then title, location, day.
///
/// Purely presentational; correctness never depends on proposal order.
pub fn sort_for_display(proposals: &mut [PendingUpdate]) {
    proposals.sort_by_key(|p| (p.month, p.field()));
}
