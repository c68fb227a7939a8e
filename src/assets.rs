//! Sprite images with a process-wide cache
//!
//! Lookups never fail: a missing or broken image degrades to
//! [`Sprite::Placeholder`] and the game draws a plain shape instead.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::AssetError;

/// Raw image bytes as fetched; decoding is up to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub keyword: String,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// What a session draws its targets with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sprite {
    Image(Arc<Image>),
    /// No image; draw the mode's default shape
    Placeholder,
}

impl Sprite {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Sprite::Placeholder)
    }
}

/// Image source for a keyword at a requested size
pub trait ImageProvider: Send + Sync {
    fn fetch(&self, keyword: &str, size: (u32, u32)) -> Result<Image, AssetError>;
}

/// Reads `<dir>/<keyword>.png`
#[derive(Debug, Clone)]
pub struct DirectoryImages {
    dir: PathBuf,
}

/// PNG file signature
const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

impl DirectoryImages {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, keyword: &str) -> PathBuf {
        let name: String = keyword
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.png"))
    }
}

impl ImageProvider for DirectoryImages {
    fn fetch(&self, keyword: &str, size: (u32, u32)) -> Result<Image, AssetError> {
        if keyword.trim().is_empty() {
            return Err(AssetError::NotFound(String::new()));
        }
        let path = self.path_for(keyword);
        if !path.is_file() {
            return Err(AssetError::NotFound(path.display().to_string()));
        }
        let bytes = fs::read(&path)?;
        if !bytes.starts_with(&PNG_MAGIC) {
            return Err(AssetError::Decode(format!(
                "{} is not a PNG",
                path.display()
            )));
        }
        Ok(Image {
            keyword: keyword.to_string(),
            width: size.0,
            height: size.1,
            bytes,
        })
    }
}

/// Shared keyword/size -> image cache
pub struct TextureCache {
    provider: Box<dyn ImageProvider>,
    cache: Mutex<HashMap<String, Arc<Image>>>,
}

impl TextureCache {
    pub fn new(provider: impl ImageProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn key(keyword: &str, size: (u32, u32)) -> String {
        format!("{keyword}_{}x{}", size.0, size.1)
    }

    /// Cached image, fetching on first use. Failures are retried next time.
    pub fn get_image(&self, keyword: &str, size: (u32, u32)) -> Sprite {
        let key = Self::key(keyword, size);
        if let Some(image) = self.lock().get(&key) {
            return Sprite::Image(Arc::clone(image));
        }

        // Fetch outside the lock; a racing fetch of the same key just wins twice
        match self.provider.fetch(keyword, size) {
            Ok(image) => {
                let image = Arc::new(image);
                self.lock().insert(key, Arc::clone(&image));
                Sprite::Image(image)
            }
            Err(e) => {
                log::warn!("No sprite for '{keyword}', using placeholder: {e}");
                Sprite::Placeholder
            }
        }
    }

    /// Warm the cache; returns whether an image is now available
    pub fn prefetch(&self, keyword: &str, size: (u32, u32)) -> bool {
        !self.get_image(keyword, size).is_placeholder()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Image>>> {
        // A poisoned cache still holds valid entries
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for TextureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureCache")
            .field("entries", &self.len())
            .finish()
    }
}
