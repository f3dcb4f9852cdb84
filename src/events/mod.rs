//! Event bus and the notifications it carries
//!
//! Turn cycle, registry and spawn scheduler never call each other directly
//! for notifications; they publish here and subscribe to what they need.

pub mod bus;
pub mod kinds;

pub use bus::{handler, DispatchReport, EventBus, GameEvent, Handler, HandlerError, HandlerResult};
pub use kinds::*;
