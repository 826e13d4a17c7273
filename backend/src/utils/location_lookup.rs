use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::geo_models::{GeocodeResult, MapView, TileLayer};
use crate::models::profile_models::Location;
use crate::utils::geocoding::{GeocodeError, LocationResolver};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupState {
    Idle,
    Loading { query: String },
    Resolved { result: GeocodeResult, map: MapView },
    NotFound { query: String },
    Error { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTicket(u64);

/// Map-page lookup state for one member.
///
/// Every distinct input gets a new ticket; a result is applied only if its
/// ticket is still the newest one, so slow responses cannot overwrite newer ones.
#[derive(Debug)]
pub struct LocationLookup {
    state: LookupState,
    generation: u64,
    input: Option<Location>,
    tile_layer: TileLayer,
}

impl LocationLookup {
    pub fn new(tile_layer: TileLayer) -> Self {
        Self {
            state: LookupState::Idle,
            generation: 0,
            input: None,
            tile_layer,
        }
    }

    pub fn state(&self) -> &LookupState {
        &self.state
    }

    pub fn input(&self) -> Option<&Location> {
        self.input.as_ref()
    }

    /// Enters `Loading` for a new input. Repeating the current input is a no-op.
    pub fn begin(&mut self, location: Location) -> Option<LookupTicket> {
        if self.input.as_ref() == Some(&location) {
            return None;
        }
        self.generation += 1;
        self.state = LookupState::Loading {
            query: location.label(),
        };
        self.input = Some(location);
        Some(LookupTicket(self.generation))
    }

    pub fn is_current(&self, ticket: LookupTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Returns false if the ticket was superseded and the outcome dropped.
    pub fn finish(
        &mut self,
        ticket: LookupTicket,
        outcome: Result<GeocodeResult, GeocodeError>,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        let Some(input) = self.input.as_ref() else {
            return false;
        };
        self.state = match outcome {
            Ok(result) => {
                let map = MapView::new(&result, input, self.tile_layer.clone());
                LookupState::Resolved { result, map }
            }
            Err(GeocodeError::LocationNotFound) => LookupState::NotFound {
                query: input.label(),
            },
            Err(e) => LookupState::Error {
                message: e.to_string(),
            },
        };
        true
    }
}

/// Waits out the debounce window, then resolves unless a newer input arrived meanwhile.
pub async fn run_lookup(
    lookup: Arc<Mutex<LocationLookup>>,
    resolver: Arc<LocationResolver>,
    ticket: LookupTicket,
    location: Location,
    debounce: Duration,
) {
    if !debounce.is_zero() {
        tokio::time::sleep(debounce).await;
    }
    if !lookup.lock().await.is_current(ticket) {
        debug!("Skipping superseded location lookup");
        return;
    }

    let outcome = resolver.resolve(&location).await;
    let applied = lookup.lock().await.finish(ticket, outcome);
    if applied {
        info!(location = %location.label(), "Location lookup finished");
    } else {
        debug!(location = %location.label(), "Discarded stale location lookup result");
    }
}
