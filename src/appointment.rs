//! Appointment records produced by a confirmed session

use crate::state_machine::SessionContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// When during the day the appointment takes place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    WholeDay,
    At { time: String },
}

/// Collected slots of a confirmed session, before it is recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub meeting_with: String,
    pub date: String,
    pub schedule: Schedule,
}

impl AppointmentDraft {
    /// Build from the session slots. `None` if a required slot is missing,
    /// or the session said "not the whole day" without giving a time.
    pub fn from_session(session: &SessionContext) -> Option<Self> {
        let schedule = if session.whole_day? {
            Schedule::WholeDay
        } else {
            Schedule::At {
                time: session.time.clone()?,
            }
        };
        Some(Self {
            meeting_with: session.meeting_with.clone()?,
            date: session.date.clone()?,
            schedule,
        })
    }

    pub fn summary(&self) -> String {
        match &self.schedule {
            Schedule::WholeDay => format!(
                "{} on {} for the whole day",
                self.meeting_with, self.date
            ),
            Schedule::At { time } => format!("{} on {} at {}", self.meeting_with, self.date, time),
        }
    }
}

/// A recorded appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: AppointmentDraft,
}

impl Appointment {
    pub fn new(details: AppointmentDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            details,
        }
    }
}
