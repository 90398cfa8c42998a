//! Worm Render - keeps annotation markers attached to their hosts
//!
//! Components:
//! - [`plan`]: resolve every annotation and decide where its marker lives
//! - [`Renderer`]: applies a plan in one frame, writing only what changed
//! - [`ObserverCoordinator`]: resize, scroll and mutation observation with
//!   the guard that ignores the layer's own writes
//! - [`WormLayer`]: one `pump(now)` driven component over the above
//! - [`WormSession`]: storage key, load, create, update, remove, navigation

mod config;
mod error;
mod frame;
mod layer;
mod observer;
mod planner;
mod renderer;
mod session;
mod store;
mod throttle;

pub use config::{RenderConfig, WormConfig};
pub use error::{ConfigError, SessionError, StoreError};
pub use frame::{FrameHandle, FrameScheduler};
pub use layer::WormLayer;
pub use observer::{CoordinatorSignals, MutationOrigin, ObserverCoordinator, ReplanReason, classify};
pub use planner::{CANNOT_CONTAIN_TAGS, PlanItem, RenderPlan, cannot_contain_children, plan};
pub use renderer::{RenderState, Renderer};
pub use session::WormSession;
pub use store::{Annotation, AnnotationStore, MarkerUi, MemoryStore, NoopUi};
pub use throttle::Throttle;

/// Attribute carrying the annotation id on every element the layer creates
pub const ID_ATTR: &str = "data-worm-id";
