use std::path::Path;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

use log::debug;

use crate::config::TexturePaths;
use crate::error::AssetError;
use crate::material::{TextureChannel, TextureImage};

/// Decode one texture image to RGBA8.
pub fn load_texture(path: &Path) -> Result<TextureImage, AssetError> {
    let image = image::open(path).map_err(|e| AssetError::TextureUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    debug!("decoded texture {:?} ({}x{})", path, width, height);

    Ok(TextureImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// Fire-and-forget loader for a material's texture set.
///
/// Each channel decodes on its own worker thread and is delivered through a
/// channel polled at frame boundaries, so the mesh is visible immediately
/// and maps pop in as they finish. One failed channel does not affect the
/// others. Dropping the loader (scene unmounted) makes late completions
/// vanish into a closed channel.
pub struct TextureSetLoader {
    rx: Receiver<(TextureChannel, Result<TextureImage, AssetError>)>,
    remaining: usize,
    generation: u64,
}

impl TextureSetLoader {
    pub fn spawn(paths: &TexturePaths, generation: u64) -> Self {
        let (tx, rx) = channel();

        let jobs = [
            (TextureChannel::Color, paths.color.clone()),
            (TextureChannel::Roughness, paths.roughness.clone()),
            (TextureChannel::Normal, paths.normal.clone()),
        ];
        let remaining = jobs.len();

        for (channel, path) in jobs {
            let tx = tx.clone();
            thread::spawn(move || {
                let _ = tx.send((channel, load_texture(&path)));
            });
        }

        Self {
            rx,
            remaining,
            generation,
        }
    }

    /// Drain completions that have arrived since the last poll. Never
    /// blocks.
    pub fn poll(&mut self) -> Vec<(TextureChannel, Result<TextureImage, AssetError>)> {
        let mut out = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            self.remaining = self.remaining.saturating_sub(1);
            out.push(message);
        }
        out
    }

    pub fn finished(&self) -> bool {
        self.remaining == 0
    }

    /// Mount generation this loader was spawned under.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn drain(loader: &mut TextureSetLoader) -> Vec<(TextureChannel, Result<TextureImage, AssetError>)> {
        let mut all = Vec::new();
        for _ in 0..200 {
            all.extend(loader.poll());
            if loader.finished() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        all
    }

    #[test]
    fn missing_files_report_per_channel_errors() {
        let paths = TexturePaths {
            color: PathBuf::from("no/such/color.jpg"),
            roughness: PathBuf::from("no/such/roughness.jpg"),
            normal: PathBuf::from("no/such/normal.png"),
        };
        let mut loader = TextureSetLoader::spawn(&paths, 1);
        let results = drain(&mut loader);

        assert_eq!(results.len(), 3);
        assert!(loader.finished());
        for (_, result) in results {
            assert!(matches!(
                result,
                Err(AssetError::TextureUnavailable { .. })
            ));
        }
    }

    #[test]
    fn one_bad_channel_does_not_abort_the_others() {
        let dir = std::env::temp_dir().join("scene_viewer_texture_test");
        std::fs::create_dir_all(&dir).unwrap();
        let good = dir.join("flat.png");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]))
            .save(&good)
            .unwrap();

        let paths = TexturePaths {
            color: good.clone(),
            roughness: good,
            normal: PathBuf::from("no/such/normal.png"),
        };
        let mut loader = TextureSetLoader::spawn(&paths, 1);
        let results = drain(&mut loader);

        let ok = results.iter().filter(|(_, r)| r.is_ok()).count();
        let failed: Vec<_> = results
            .iter()
            .filter(|(_, r)| r.is_err())
            .map(|(c, _)| *c)
            .collect();
        assert_eq!(ok, 2);
        assert_eq!(failed, vec![TextureChannel::Normal]);

        for (_, result) in results {
            if let Ok(image) = result {
                assert_eq!((image.width, image.height), (2, 2));
                assert_eq!(image.pixels.len(), 16);
            }
        }
    }

    #[test]
    fn dropping_the_loader_discards_late_completions() {
        let paths = TexturePaths {
            color: PathBuf::from("no/such/a.jpg"),
            roughness: PathBuf::from("no/such/b.jpg"),
            normal: PathBuf::from("no/such/c.png"),
        };
        let loader = TextureSetLoader::spawn(&paths, 1);
        drop(loader);
        // Worker sends hit a closed channel; nothing to observe beyond the
        // absence of a panic.
        thread::sleep(Duration::from_millis(20));
    }
}
