mod domain;

/// Actor id recorded on transitions triggered by the service itself rather
/// than an authenticated user.
pub const SYSTEM_ACTOR: &str = "system";

// expose domain module

pub use domain::*;
