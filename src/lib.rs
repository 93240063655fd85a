//! Chat bubble overlay core.
//!
//! Host events come in, escaped bubbles go onto a display surface, and each
//! bubble is evicted after a delay unless the host deletes it first.

pub mod bubble;
pub mod color;
pub mod config;
pub mod console;
pub mod event;
pub mod markup;
pub mod surface;

pub use bubble::{BubbleManager, Message, MessageText, StyleConfig};
pub use config::WidgetConfig;
pub use event::{EventError, HostInput, Route};
pub use surface::Surface;
