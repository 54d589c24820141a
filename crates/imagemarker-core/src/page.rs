//! Page image loading.
//!
//! The editor only needs to know an image's size to lay out the background
//! node; decoding and painting are up to the renderer.

use crate::error::{EditorError, EditorResult};
use kurbo::Size;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

/// Boxed future returned by loaders; not required to be `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A loaded page image.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundImage {
    /// Source the image was loaded from, used as the node's href.
    pub source: String,
    /// Natural size in image pixels.
    pub size: Size,
}

/// Resolves an image source into a [`BackgroundImage`].
pub trait ImageLoader {
    fn load(&self, source: &str) -> BoxFuture<'_, EditorResult<BackgroundImage>>;
}

fn load_error(source: &str, reason: impl ToString) -> EditorError {
    EditorError::ImageLoad {
        source_path: source.to_string(),
        reason: reason.to_string(),
    }
}

/// Reads image headers from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileImageLoader {
    /// Directory relative sources are resolved against.
    base_path: Option<PathBuf>,
}

impl FileImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative sources against `base_path`.
    pub fn with_base(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: Some(base_path.into()),
        }
    }

    fn resolve(&self, source: &str) -> PathBuf {
        match &self.base_path {
            Some(base) => base.join(source),
            None => PathBuf::from(source),
        }
    }
}

impl ImageLoader for FileImageLoader {
    fn load(&self, source: &str) -> BoxFuture<'_, EditorResult<BackgroundImage>> {
        let path = self.resolve(source);
        let source = source.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(load_error(&source, format!("{} does not exist", path.display())));
            }
            let (width, height) =
                image::image_dimensions(&path).map_err(|e| load_error(&source, e))?;
            log::info!("Loaded page image {} ({}x{})", source, width, height);
            Ok(BackgroundImage {
                source,
                size: Size::new(f64::from(width), f64::from(height)),
            })
        })
    }
}

/// Loader over a fixed table of known images, for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageLoader {
    images: HashMap<String, Size>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, size: Size) {
        self.images.insert(source.into(), size);
    }

    pub fn with_image(mut self, source: impl Into<String>, size: Size) -> Self {
        self.insert(source, size);
        self
    }
}

impl ImageLoader for MemoryImageLoader {
    fn load(&self, source: &str) -> BoxFuture<'_, EditorResult<BackgroundImage>> {
        let source = source.to_string();
        Box::pin(async move {
            let size = self
                .images
                .get(&source)
                .copied()
                .ok_or_else(|| load_error(&source, "not found"))?;
            Ok(BackgroundImage { source, size })
        })
    }
}
