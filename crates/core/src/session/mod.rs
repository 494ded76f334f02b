//! Owner session gate and the route guard in front of owner-only screens.

mod gate;
mod guard;
mod models;

pub use gate::{
    OwnerCredentials, SessionContext, SessionError, SessionGate, AUTH_FLAG_KEY, AUTH_FLAG_TRUE,
    USER_PROFILE_KEY,
};
pub use guard::{Access, RouteGuard};
pub use models::{Profile, Role};
