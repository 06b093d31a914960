pub mod manager;
pub mod renderer;

pub use crate::traits::LayerOperations as LayerTrait;
