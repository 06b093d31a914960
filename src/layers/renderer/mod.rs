//! Vector renderer core
//!
//! - `viewport_state`: padded clip box and its geographic top-left
//! - `transform`: container transform strategies
//! - `registry`: drawable registry and notification fan-out
//! - `layer`: the renderer layer tying the three together

pub mod layer;
pub mod registry;
pub mod transform;
pub mod viewport_state;

pub use layer::{RendererLifecycle, VectorRenderer};
pub use registry::{ChildRegistry, DrawableId, Notification, RenderFrame};
pub use transform::{SurfaceContainer, SurfaceTransform, TransformStrategy};
pub use viewport_state::ViewportState;
