//! Caller identity forwarded by the authenticating gateway.
//!
//! The gateway verifies the user's token and forwards the claims as plain
//! headers. Handlers that mutate data read them through [`CallerContext`] so
//! they never touch raw headers.

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::warn;

use crate::domain::Caller;

/// Header carrying the verified email address of the caller.
pub const AUTHENTICATED_EMAIL_HEADER: &str = "x-authenticated-email";
/// Header carrying the caller's comma-separated group memberships.
pub const AUTHENTICATED_GROUPS_HEADER: &str = "x-authenticated-groups";
/// Group granting global administrator rights.
pub const ADMIN_GROUP: &str = "Admin";

/// Optional authenticated caller for the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext(Option<Caller>);

impl CallerContext {
    /// Borrow the caller, if the gateway forwarded one.
    pub fn caller(&self) -> Option<&Caller> {
        self.0.as_ref()
    }

    /// Consume the context, yielding the caller.
    pub fn into_inner(self) -> Option<Caller> {
        self.0
    }

    fn from_http_request(req: &HttpRequest) -> Self {
        let Some(email) = header_str(req, AUTHENTICATED_EMAIL_HEADER) else {
            return Self(None);
        };
        let email = email.trim();
        if email.is_empty() {
            return Self(None);
        }
        let is_admin = header_str(req, AUTHENTICATED_GROUPS_HEADER)
            .is_some_and(|groups| groups.split(',').any(|group| group.trim() == ADMIN_GROUP));
        Self(Some(Caller::new(email, is_admin)))
    }
}

fn header_str<'a>(req: &'a HttpRequest, name: &'static str) -> Option<&'a str> {
    let value = req.headers().get(name)?;
    match value.to_str() {
        Ok(text) => Some(text),
        Err(error) => {
            warn!(header = name, %error, "ignoring non-ASCII identity header");
            None
        }
    }
}

impl FromRequest for CallerContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::from_http_request(req)))
    }
}
