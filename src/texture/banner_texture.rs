//! Banner texture adapter
//!
//! Binds a resident table slot to a renderer texture resource, created
//! lazily and recreatable at any time (the registry treats these as
//! volatile). The adapter never owns the surface: it resolves through the
//! shared slot on every create, so a rebuilt or converted surface is picked
//! up automatically.

use std::rc::Rc;

use tracing::warn;

use crate::cache::table::BannerSlot;
use crate::errors::{TextureError, TextureResult};
use crate::surface::zoom;
use crate::texture::{Renderer, TextureFormat, TextureHandle, TextureId};

pub struct BannerTexture {
    id: TextureId,
    slot: BannerSlot,
    /// Original pre-downscale source dimensions, for display-space sizing.
    source_width: u32,
    source_height: u32,
    renderer: Rc<dyn Renderer>,
    handle: Option<TextureHandle>,
}

impl BannerTexture {
    /// Create the adapter and immediately materialize the renderer
    /// resource from the bound slot.
    pub fn new(
        id: TextureId,
        slot: BannerSlot,
        source_width: u32,
        source_height: u32,
        renderer: Rc<dyn Renderer>,
    ) -> TextureResult<Self> {
        let mut texture = Self {
            id,
            slot,
            source_width,
            source_height,
            renderer,
            handle: None,
        };
        texture.create()?;
        Ok(texture)
    }

    pub fn id(&self) -> &TextureId {
        &self.id
    }

    pub fn handle(&self) -> Option<TextureHandle> {
        self.handle
    }

    pub fn source_dimensions(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    /// Create the renderer resource from the current slot contents.
    ///
    /// Cache entries are preprocessed, so this does as little work as
    /// possible: the only conversion that can still happen here is an
    /// unexpected clamp to the backend's maximum texture size.
    pub fn create(&mut self) -> TextureResult<()> {
        let max_size = self.renderer.max_texture_size();
        {
            let mut slot = self.slot.borrow_mut();
            let surface = slot.as_mut().ok_or_else(|| TextureError::SurfaceMissing {
                id: self.id.key.clone(),
            })?;

            if surface.width() > max_size || surface.height() > max_size {
                warn!("Converted {} at runtime", self.id.key);
                let width = surface.width().min(max_size);
                let height = surface.height().min(max_size);
                // Written back through the slot so the conversion happens
                // only once, however many times this texture is recreated.
                *surface = zoom::zoom(surface, width, height);
            } else {
                debug_assert!(surface.width().is_power_of_two());
                debug_assert!(surface.height().is_power_of_two());
            }
        }

        let slot = self.slot.borrow();
        let surface = slot.as_ref().ok_or_else(|| TextureError::SurfaceMissing {
            id: self.id.key.clone(),
        })?;

        // Preferred format first; matching the stored file means no
        // conversion at upload time, which is the common case.
        let candidates = if surface.format().is_paletted() {
            [TextureFormat::Paletted8, TextureFormat::Rgba4]
        } else {
            [TextureFormat::Rgb5a1, TextureFormat::Rgba4]
        };
        let format = candidates
            .into_iter()
            .find(|&f| self.renderer.supports_texture_format(f))
            .ok_or_else(|| TextureError::NoSupportedFormat {
                id: self.id.key.clone(),
            })?;

        self.handle = Some(self.renderer.create_texture(format, surface, false));
        Ok(())
    }

    /// Release the renderer resource. Safe to call when already destroyed.
    pub fn destroy(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.renderer.delete_texture(handle);
        }
    }

    /// Destroy then create; used when the underlying surface data changed
    /// in place.
    pub fn reload(&mut self) -> TextureResult<()> {
        self.destroy();
        self.create()
    }

    /// Clear the handle without releasing the renderer resource; ownership
    /// of the resource has been transferred elsewhere.
    pub fn invalidate(&mut self) {
        self.handle = None;
    }
}

impl Drop for BannerTexture {
    fn drop(&mut self) {
        self.destroy();
    }
}
