//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureJourneyCommand, FixtureJourneyQuery, JourneyCommand, JourneyQuery,
};

/// Parameter object bundling the driving ports used by HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub journeys_query: Arc<dyn JourneyQuery>,
    pub journeys_command: Arc<dyn JourneyCommand>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            journeys_query: Arc::new(FixtureJourneyQuery),
            journeys_command: Arc::new(FixtureJourneyCommand),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub journeys_query: Arc<dyn JourneyQuery>,
    pub journeys_command: Arc<dyn JourneyCommand>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::{FixtureJourneyCommand, FixtureJourneyQuery};
    /// use backend::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts {
    ///     journeys_query: Arc::new(FixtureJourneyQuery),
    ///     journeys_command: Arc::new(FixtureJourneyCommand),
    /// });
    /// let _query = state.journeys_query.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            journeys_query,
            journeys_command,
        } = ports;
        Self {
            journeys_query,
            journeys_command,
        }
    }
}
