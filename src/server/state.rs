use crate::config::LocatorConfig;
use crate::location::{LocalityResult, ResolutionState, ReverseGeocoder, StatusSink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

pub struct AppState {
    pub geocoder: Box<dyn ReverseGeocoder>,
    pub config: LocatorConfig,
    pub field: AddressField,
}

/// The address field's busy/idle state. Only one resolution may be in
/// flight; further triggers are refused until it finishes.
#[derive(Default)]
pub struct AddressField {
    state: Mutex<ResolutionState>,
}

impl AddressField {
    /// Claim the field for a new resolution. None while one is in flight.
    pub fn try_begin(&self) -> Option<Busy<'_>> {
        let mut state = self.lock();
        if state.is_busy() {
            return None;
        }
        *state = ResolutionState::Resolving;
        Some(Busy { field: self, finished: AtomicBool::new(false) })
    }

    pub fn state(&self) -> ResolutionState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ResolutionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Claim on an [`AddressField`], used as the resolver's status sink.
/// Dropped before `finish` (e.g. the request future was cancelled), it
/// returns the field to `Idle`.
pub struct Busy<'a> {
    field: &'a AddressField,
    finished: AtomicBool,
}

impl StatusSink for Busy<'_> {
    fn start(&self) {
        *self.field.lock() = ResolutionState::Resolving;
    }

    fn finish(&self, locality: &LocalityResult) {
        *self.field.lock() = ResolutionState::Resolved(locality.clone());
        self.finished.store(true, Ordering::Release);
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        if !self.finished.load(Ordering::Acquire) {
            log::warn!("Location lookup abandoned before finishing; address field reset");
            *self.field.lock() = ResolutionState::Idle;
        }
    }
}
