//! Viewport size tracking across resize and DPI changes.
//!
//! Keeps the physical pixel dimensions the GPU surface and post-processing
//! targets must use, clamped so zero-size windows (Wayland before the first
//! configure) never reach wgpu.

/// Minimum surface dimension.
pub const MIN_DIMENSION: u32 = 1;

/// Result of a resize: the physical dimensions all render targets must adopt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportResize {
    /// New width in physical pixels.
    pub width: u32,
    /// New height in physical pixels.
    pub height: u32,
    /// Current scale factor (physical pixels per logical pixel).
    pub scale_factor: f64,
}

/// Tracks the current physical viewport dimensions and scale factor.
pub struct Viewport {
    width: u32,
    height: u32,
    scale_factor: f64,
}

impl Viewport {
    /// Create a viewport from the window's initial inner size and scale.
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width: width.max(MIN_DIMENSION),
            height: height.max(MIN_DIMENSION),
            scale_factor,
        }
    }

    /// Handle a window resize. Returns the new dimensions if they actually
    /// changed, using the values reported by the window system rather than
    /// any stale cached size.
    pub fn handle_resize(&mut self, width: u32, height: u32) -> Option<ViewportResize> {
        let width = width.max(MIN_DIMENSION);
        let height = height.max(MIN_DIMENSION);
        if width == self.width && height == self.height {
            return None;
        }
        self.width = width;
        self.height = height;
        Some(self.current())
    }

    /// Handle a scale-factor change along with the window's new inner size.
    pub fn handle_scale_factor_changed(
        &mut self,
        scale_factor: f64,
        width: u32,
        height: u32,
    ) -> Option<ViewportResize> {
        self.scale_factor = scale_factor;
        self.handle_resize(width, height)
    }

    /// Current dimensions and scale.
    pub fn current(&self) -> ViewportResize {
        ViewportResize {
            width: self.width,
            height: self.height,
            scale_factor: self.scale_factor,
        }
    }

    /// Width / height, for the camera projection.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_clamped() {
        let viewport = Viewport::new(0, 0, 1.0);
        let current = viewport.current();
        assert_eq!((current.width, current.height), (1, 1));
    }

    #[test]
    fn test_resize_reports_actual_new_dimensions() {
        let mut viewport = Viewport::new(800, 600, 1.0);
        let resize = viewport.handle_resize(1920, 1080).unwrap();
        assert_eq!((resize.width, resize.height), (1920, 1080));
    }

    #[test]
    fn test_no_event_when_size_unchanged() {
        let mut viewport = Viewport::new(800, 600, 1.0);
        assert!(viewport.handle_resize(800, 600).is_none());
    }

    #[test]
    fn test_scale_factor_change_carries_new_scale() {
        let mut viewport = Viewport::new(800, 600, 1.0);
        let resize = viewport
            .handle_scale_factor_changed(2.0, 1600, 1200)
            .unwrap();
        assert_eq!(resize.scale_factor, 2.0);
        assert_eq!((resize.width, resize.height), (1600, 1200));
    }

    #[test]
    fn test_aspect_ratio() {
        let viewport = Viewport::new(1920, 1080, 1.0);
        assert!((viewport.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }
}
