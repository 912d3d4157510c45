//! Session seen by mapper dispatch

use std::sync::Arc;

use crate::configuration::Configuration;

/// Unit of work a bound mapper executes against.
///
/// Sessions are supplied by the caller. Bound mappers keep a session alive
/// but never close it.
pub trait Session: Send + Sync {
    /// Configuration shared by this session
    fn configuration(&self) -> &Arc<Configuration>;
}
