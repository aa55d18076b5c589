//! Request context carrying the caller identity and the request instant.

use chrono::{DateTime, NaiveDateTime, Utc};

use hotel_auth::Requester;
use hotel_core::config::BookingConfig;
use hotel_core::result::AppResult;
use hotel_core::types::UserId;

/// Context for the current request.
///
/// Built by the API layer and passed into every service method so that
/// each operation knows *who* is acting and *when*.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    /// The caller, possibly anonymous.
    pub requester: Requester,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context stamped with the current time.
    pub fn new(requester: Requester) -> Self {
        Self::at(requester, Utc::now())
    }

    /// Creates a context for a fixed instant.
    pub fn at(requester: Requester, request_time: DateTime<Utc>) -> Self {
        Self {
            requester,
            request_time,
        }
    }

    /// Context for an authenticated guest.
    pub fn authenticated(user_id: UserId) -> Self {
        Self::new(Requester::Authenticated(user_id))
    }

    /// The caller's ID; mutating operations fail for anonymous callers.
    pub fn requester_id(&self) -> AppResult<UserId> {
        self.requester.require()
    }

    /// Request instant in hotel-local time.
    pub fn local_now(&self, config: &BookingConfig) -> NaiveDateTime {
        config.local_time(self.request_time)
    }
}
