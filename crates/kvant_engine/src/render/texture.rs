//! Texture capabilities and the named texture table

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// A texture that can be bound to a texture unit
pub trait BindableTexture: Send + Sync {
    /// Bind to `unit`
    fn bind(&self, unit: u32);
}

/// Resolves texture names to bindable textures
pub trait TextureProvider {
    /// Look up a texture by name
    fn get(&self, name: &str) -> Option<Arc<dyn BindableTexture>>;
}

/// Name-keyed texture table
///
/// Textures are shared: a lookup hands out another reference, and a texture
/// can only be evicted once the table holds the last one.
#[derive(Default)]
pub struct TextureRegistry {
    textures: HashMap<String, Arc<dyn BindableTexture>>,
}

impl TextureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture, returning any texture previously under `name`
    pub fn insert(&mut self, name: impl Into<String>, texture: Arc<dyn BindableTexture>) -> Option<Arc<dyn BindableTexture>> {
        let name = name.into();
        log::debug!("Registered texture '{}'", name);
        self.textures.insert(name, texture)
    }

    /// Whether a texture is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    /// Remove the texture if nothing outside the registry still uses it
    pub fn try_remove(&mut self, name: &str) -> bool {
        match self.textures.get(name) {
            Some(texture) if Arc::strong_count(texture) == 1 => {
                self.textures.remove(name);
                log::debug!("Released texture '{}'", name);
                true
            }
            Some(_) => {
                log::debug!("Texture '{}' still in use, keeping it", name);
                false
            }
            None => false,
        }
    }

    /// Number of registered textures
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl TextureProvider for TextureRegistry {
    fn get(&self, name: &str) -> Option<Arc<dyn BindableTexture>> {
        self.textures.get(name).cloned()
    }
}

/// Texture that remembers which units it was bound to
#[derive(Debug, Default)]
pub struct HeadlessTexture {
    bindings: Mutex<Vec<u32>>,
}

impl HeadlessTexture {
    /// Create a texture
    pub fn new() -> Self {
        Self::default()
    }

    /// Every unit this texture was bound to, in order
    pub fn bindings(&self) -> Vec<u32> {
        self.bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl BindableTexture for HeadlessTexture {
    fn bind(&self, unit: u32) {
        self.bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let mut registry = TextureRegistry::new();
        assert!(registry.is_empty());

        registry.insert("ship", Arc::new(HeadlessTexture::new()));
        assert!(registry.contains("ship"));
        assert!(registry.get("ship").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_try_remove_respects_outside_users() {
        let mut registry = TextureRegistry::new();
        registry.insert("ship", Arc::new(HeadlessTexture::new()));

        let in_use = registry.get("ship");
        assert!(!registry.try_remove("ship"));
        assert!(registry.contains("ship"));

        drop(in_use);
        assert!(registry.try_remove("ship"));
        assert!(!registry.contains("ship"));
        assert!(!registry.try_remove("ship"));
    }
}
