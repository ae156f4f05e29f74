//! 2D camera over the x/y plane: pan, zoom about a point, fit to a region

use eframe::egui::{vec2, Pos2, Rect, Vec2};

const MIN_ZOOM: f32 = 1e-3;
const MAX_ZOOM: f32 = 1e7;

/// Maps world x/y to screen pixels. World y points up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World point drawn at the centre of the viewport
    pub center: Vec2,
    /// Pixels per world unit
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn to_screen(&self, world: Vec2, viewport: Rect) -> Pos2 {
        let rel = world - self.center;
        viewport.center() + vec2(rel.x, -rel.y) * self.zoom
    }

    pub fn to_world(&self, screen: Pos2, viewport: Rect) -> Vec2 {
        let rel = (screen - viewport.center()) / self.zoom;
        self.center + vec2(rel.x, -rel.y)
    }

    /// Move the view by a screen-space drag
    pub fn pan_pixels(&mut self, delta: Vec2) {
        self.center += vec2(-delta.x, delta.y) / self.zoom;
    }

    /// Scale the zoom by `factor`, keeping the world point under `anchor` fixed
    pub fn zoom_at(&mut self, anchor: Pos2, factor: f32, viewport: Rect) {
        if !(factor > 0.0 && factor.is_finite()) {
            return;
        }
        let pinned = self.to_world(anchor, viewport);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let rel = (anchor - viewport.center()) / self.zoom;
        self.center = pinned - vec2(rel.x, -rel.y);
    }

    /// Centre on `center` and zoom so a circle of radius `extent` fills the viewport
    pub fn fit(&mut self, center: Vec2, extent: f32, viewport: Rect) {
        let half = 0.5 * viewport.width().min(viewport.height());
        self.center = center;
        self.zoom = if extent > 0.0 && extent.is_finite() {
            (0.95 * half / extent).clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            1.0
        };
    }
}

/// Scroll wheel points to zoom factor
pub fn scroll_zoom_factor(scroll: f32) -> f32 {
    (scroll * 0.002).exp()
}
