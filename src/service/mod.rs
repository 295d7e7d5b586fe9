//! Service layer containing business logic orchestration.

pub mod adapter;
pub mod plugin;
mod resolve_service;

pub use adapter::{Lockfile, Manifest, PoolAdapter};
pub use plugin::{HostEvent, MonolithPlugin, PrePoolCreateEvent};
pub use resolve_service::ResolveService;
