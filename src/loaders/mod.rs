pub mod gltf;
pub mod texture;

pub use gltf::{load_model, LoadedModel, ModelLoader, MODEL_TARGET_SIZE};
pub use texture::{load_texture, TextureSetLoader};
