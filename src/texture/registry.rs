//! Texture registration table
//!
//! Owns the banner texture adapters handed over by the cache controller.
//! Registration is refcounted; entries registered under the volatile policy
//! survive their last release and stay resolvable until explicitly
//! unloaded, since they are cheap to recreate and likely to be wanted
//! again.

use std::collections::HashMap;

use tracing::trace;

use super::{TextureId, TexturePolicy};
use crate::texture::banner_texture::BannerTexture;

struct RegisteredTexture {
    texture: BannerTexture,
    policy: TexturePolicy,
    refcount: u32,
}

/// Registration table for banner textures.
#[derive(Default)]
pub struct TextureRegistry {
    entries: HashMap<TextureId, RegisteredTexture>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture under `id` with one outstanding hold.
    pub fn register(&mut self, id: TextureId, texture: BannerTexture, policy: TexturePolicy) {
        trace!("Registering texture {}", id.key);
        self.entries.insert(
            id,
            RegisteredTexture {
                texture,
                policy,
                refcount: 1,
            },
        );
    }

    /// Drop one hold on `id`. Volatile entries remain registered at zero
    /// holds; default-policy entries are destroyed.
    pub fn release(&mut self, id: &TextureId) {
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        entry.refcount = entry.refcount.saturating_sub(1);
        if entry.refcount == 0 && entry.policy != TexturePolicy::Volatile {
            self.entries.remove(id);
        }
    }

    /// Remove and destroy a registration regardless of policy.
    pub fn unload(&mut self, id: &TextureId) {
        self.entries.remove(id);
    }

    /// Remove and destroy every registration.
    pub fn unload_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_registered(&self, id: &TextureId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &TextureId) -> Option<&BannerTexture> {
        self.entries.get(id).map(|entry| &entry.texture)
    }

    pub fn get_mut(&mut self, id: &TextureId) -> Option<&mut BannerTexture> {
        self.entries.get_mut(id).map(|entry| &mut entry.texture)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::table::BannerSlot;
    use crate::surface::{Surface, SurfaceFormat};
    use crate::texture::{Renderer, TextureFormat, TextureHandle};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct AnyFormatRenderer;

    impl Renderer for AnyFormatRenderer {
        fn max_texture_size(&self) -> u32 {
            2048
        }
        fn supports_texture_format(&self, _format: TextureFormat) -> bool {
            true
        }
        fn create_texture(
            &self,
            _format: TextureFormat,
            _surface: &Surface,
            _mipmaps: bool,
        ) -> TextureHandle {
            7
        }
        fn delete_texture(&self, _handle: TextureHandle) {}
    }

    fn make_texture(id: &TextureId) -> BannerTexture {
        let slot: BannerSlot = Rc::new(RefCell::new(Some(Surface::new(
            32,
            32,
            SurfaceFormat::Rgba5551,
        ))));
        BannerTexture::new(id.clone(), slot, 64, 64, Rc::new(AnyFormatRenderer)).unwrap()
    }

    #[test]
    fn test_volatile_survives_release() {
        let mut registry = TextureRegistry::new();
        let id = TextureId::new("a");
        registry.register(id.clone(), make_texture(&id), TexturePolicy::Volatile);

        registry.release(&id);
        assert!(registry.is_registered(&id));
        registry.release(&id); // extra releases are harmless
        assert!(registry.is_registered(&id));
    }

    #[test]
    fn test_default_policy_dropped_on_release() {
        let mut registry = TextureRegistry::new();
        let id = TextureId::new("a");
        registry.register(id.clone(), make_texture(&id), TexturePolicy::Default);

        registry.release(&id);
        assert!(!registry.is_registered(&id));
    }

    #[test]
    fn test_unload_all() {
        let mut registry = TextureRegistry::new();
        for key in ["a", "b"] {
            let id = TextureId::new(key);
            registry.register(id.clone(), make_texture(&id), TexturePolicy::Volatile);
        }
        assert_eq!(registry.len(), 2);

        registry.unload_all();
        assert!(registry.is_empty());
        assert!(!registry.is_registered(&TextureId::new("a")));
    }
}
