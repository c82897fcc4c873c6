use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while mounting a scene.
#[derive(Debug, Error)]
pub enum MountError {
    /// The named container surface did not resolve. Recoverable: the caller
    /// logs it and no scene is constructed.
    #[error("container `{0}` not found")]
    NoContainer(String),

    /// The renderer rejected the scene's geometry upload.
    #[error("renderer rejected scene: {0}")]
    Renderer(#[from] RenderError),
}

/// Errors raised while loading texture assets.
#[derive(Debug, Error)]
pub enum AssetError {
    /// One texture channel failed to read or decode. The material keeps its
    /// default for that channel; the other channels are unaffected.
    #[error("texture `{path}` unavailable: {reason}")]
    TextureUnavailable { path: PathBuf, reason: String },
}

/// Errors raised while loading an external model.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The model file could not be fetched or parsed. The scene stays valid
    /// without the model.
    #[error("model asset `{path}` unavailable: {reason}")]
    AssetUnavailable { path: PathBuf, reason: String },
}

/// Errors surfaced by the renderer during upload or a frame.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The output surface was lost or is outdated; recoverable by
    /// reconfiguring at the current size.
    #[error("render surface lost")]
    SurfaceLost,

    /// The device is out of memory. Not recoverable within a frame.
    #[error("render device out of memory")]
    OutOfMemory,

    #[error("render error: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_error_names_the_container() {
        let err = MountError::NoContainer("viewport".to_string());
        assert_eq!(err.to_string(), "container `viewport` not found");
    }

    #[test]
    fn texture_error_carries_path_and_reason() {
        let err = AssetError::TextureUnavailable {
            path: PathBuf::from("assets/texture/normal.png"),
            reason: "file not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("normal.png"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn render_error_wraps_into_mount_error() {
        let err: MountError = RenderError::OutOfMemory.into();
        assert!(matches!(err, MountError::Renderer(RenderError::OutOfMemory)));
    }
}
