//! Seams to the theme system and the drawing surface.
//!
//! The view owns no theme state and performs no pixel work itself. It asks a
//! [`StyleProvider`] for opaque paint resources and issues clip, layer, and
//! composite requests to a [`Canvas`] supplied by the host renderer.

use std::any::Any;

use horizon_treeview_core::{Color, Rect, Size};

/// An image resource together with its pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct SizedImage {
    /// The theme-relative path the image was resolved from.
    pub path: String,
    pub size: Size,
}

/// A vertical gradient described by `(offset, color)` stops with offsets in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Gradient {
    pub stops: Vec<(f32, Color)>,
}

impl Gradient {
    /// A gradient with a single flat color.
    pub fn solid(color: Color) -> Self {
        Self {
            stops: vec![(0.0, color), (1.0, color)],
        }
    }
}

/// Resolves named theme resources.
pub trait StyleProvider: Send + Sync {
    /// A named color, e.g. `"tree_item_select_background"`.
    fn color_for(&self, name: &str) -> Color;

    /// An image by theme path, e.g. `"listview/header_press.png"`.
    fn pixbuf_for(&self, path: &str) -> SizedImage;

    /// A named background gradient, e.g. `"linear_background"`.
    fn shadow_color_for(&self, name: &str) -> Gradient;
}

/// Fallback provider used when the host does not supply a theme.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStyle;

/// Height of the stock column header image.
const DEFAULT_HEADER_HEIGHT: f32 = 24.0;

impl StyleProvider for DefaultStyle {
    fn color_for(&self, name: &str) -> Color {
        match name {
            "tree_item_select_background" => Color::from_rgb8(0x3d, 0x8e, 0xe6),
            "tree_item_drag_line" => Color::from_rgb8(0x1e, 0x5a, 0x9e),
            _ => Color::BLACK,
        }
    }

    fn pixbuf_for(&self, path: &str) -> SizedImage {
        SizedImage {
            path: path.to_string(),
            size: Size::new(1.0, DEFAULT_HEADER_HEIGHT),
        }
    }

    fn shadow_color_for(&self, _name: &str) -> Gradient {
        Gradient::solid(Color::WHITE)
    }
}

/// A drawing surface.
///
/// Coordinates are relative to the surface's own top-left corner. Layers
/// created by [`create_layer`](Canvas::create_layer) are independent surfaces
/// that are later blended back with
/// [`composite_scanline`](Canvas::composite_scanline).
pub trait Canvas {
    /// Size of the surface.
    fn size(&self) -> Size;

    /// Intersect the current clip with `rect`.
    fn push_clip(&mut self, rect: Rect);

    /// Restore the clip active before the matching `push_clip`.
    fn pop_clip(&mut self);

    /// Fill `rect` with a vertical gradient.
    fn fill_gradient(&mut self, rect: Rect, gradient: &Gradient);

    /// Create an offscreen layer of the given size.
    fn create_layer(&self, size: Size) -> Box<dyn Canvas>;

    /// Blend the one-pixel row at `src_y` of `layer` into `dst` with `alpha`.
    fn composite_scanline(&mut self, layer: &dyn Canvas, src_y: f32, dst: Rect, alpha: f32);

    /// Access the concrete surface, for renderers that need to read a layer back.
    fn as_any(&self) -> &dyn Any;
}
