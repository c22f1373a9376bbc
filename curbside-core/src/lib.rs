//! Core types and service wiring for the curbside collection reminder.

/// Immutable collection configuration: holidays, zones, and shift rules.
pub mod config;
/// Recurring public holidays and their observed dates.
pub mod holiday;
/// Domain models and identifiers shared by all providers.
pub mod model;
/// Tomorrow-is-collection-day decisions for subscribers.
pub mod notify;
/// Registry and helpers for plugging municipality providers into the service.
pub mod plugin;
/// Traits describing the boundary services.
pub mod ports;
/// Nightly reminder batch over all subscribers.
pub mod reminder;
/// Holiday-aware collection day resolution.
pub mod resolver;
/// High-level service facade used by clients.
pub mod service;
/// Zone shift rules applied in holiday weeks.
pub mod shift;
/// Time-of-day window in which reminders go out.
pub mod window;

pub use config::*;
pub use holiday::*;
pub use model::*;
pub use notify::*;
pub use plugin::*;
pub use ports::*;
pub use reminder::*;
pub use resolver::*;
pub use service::*;
pub use shift::*;
pub use window::*;
