// --- File: crates/slotwise_planner/src/calendar.rs ---
use crate::error::PlannerError;
use crate::interval::TimeInterval;
use crate::models::Appointment;
use slotwise_common::BoxFuture;
use std::sync::RwLock;

/// Source of existing bookings.
///
/// Implementations return appointments already resolved to timestamps and
/// coordinates. Errors abort the planning run.
pub trait CalendarSource: Send + Sync {
    /// Appointments overlapping `range`, sorted by start time.
    fn list_appointments(&self, range: TimeInterval) -> BoxFuture<'_, Vec<Appointment>, PlannerError>;
}

/// Calendar held in memory, for embedders that already have the bookings.
#[derive(Debug, Default)]
pub struct InMemoryCalendar {
    appointments: RwLock<Vec<Appointment>>,
}

impl InMemoryCalendar {
    pub fn new(appointments: Vec<Appointment>) -> Self {
        Self {
            appointments: RwLock::new(appointments),
        }
    }

    pub fn add(&self, appointment: Appointment) -> Result<(), PlannerError> {
        self.appointments
            .write()
            .map_err(|_| PlannerError::Calendar("calendar lock poisoned".to_string()))?
            .push(appointment);
        Ok(())
    }

    fn overlapping(&self, range: &TimeInterval) -> Result<Vec<Appointment>, PlannerError> {
        let appointments = self
            .appointments
            .read()
            .map_err(|_| PlannerError::Calendar("calendar lock poisoned".to_string()))?;
        let mut found: Vec<Appointment> = appointments
            .iter()
            .filter(|a| a.interval.overlaps(range))
            .cloned()
            .collect();
        found.sort_by_key(|a| a.interval.start());
        Ok(found)
    }
}

impl CalendarSource for InMemoryCalendar {
    fn list_appointments(&self, range: TimeInterval) -> BoxFuture<'_, Vec<Appointment>, PlannerError> {
        let result = self.overlapping(&range);
        Box::pin(async move { result })
    }
}
