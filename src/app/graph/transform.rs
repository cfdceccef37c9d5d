use eframe::egui::{Pos2, Rect, Vec2};

/// Viewport pan and zoom. Applied when painting only; the layout never sees it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct ViewTransform {
    pub(in crate::app) pan: Vec2,
    pub(in crate::app) zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    pub(in crate::app) const MIN_ZOOM: f32 = 0.1;
    pub(in crate::app) const MAX_ZOOM: f32 = 4.0;

    pub(in crate::app) fn world_to_screen(self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.pan + world * self.zoom
    }

    pub(in crate::app) fn screen_to_world(self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.pan) / self.zoom
    }

    /// Scales by `factor` while keeping the world point under `anchor` fixed on screen.
    pub(in crate::app) fn zoom_about(&mut self, rect: Rect, anchor: Pos2, factor: f32) {
        let world_before = self.screen_to_world(rect, anchor);
        self.zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        self.pan = anchor - rect.center() - (world_before * self.zoom);
    }

    /// Zooms about the viewport center, as the toolbar buttons do.
    pub(in crate::app) fn zoom_centered(&mut self, factor: f32) {
        let previous = self.zoom;
        self.zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        self.pan *= self.zoom / previous;
    }

    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    pub(in crate::app) fn reset(&mut self) {
        *self = Self::default();
    }
}
