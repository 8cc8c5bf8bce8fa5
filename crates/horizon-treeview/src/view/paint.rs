//! Viewport culling and the faded edge mask.
//!
//! Only rows inside the [`VisibleRange`] are painted. When the viewport is
//! not scrolled to the very top, a band of `mask_bound_height` pixels at the
//! top edge is painted into an offscreen layer and blended back one scanline
//! at a time with a sine ease, so rows fade in from the edge instead of being
//! cut off. The bottom edge gets the mirrored treatment when the viewport is
//! not at the very bottom. Rows outside both bands are painted directly,
//! clipped to the region between them.

use std::f32::consts::PI;

use horizon_treeview_core::logging::targets;
use horizon_treeview_core::{Rect, Size};

use super::geometry::{ScrollState, VisibleRange, visible_range};
use crate::model::{PaintContext, RowHandle, RowStore};
use crate::style::{Canvas, StyleProvider};

/// Opacity of scanline `line` in the top band.
pub fn top_mask_alpha(line: usize, mask_height: f32) -> f32 {
    (line as f32 * PI / (2.0 * mask_height)).sin()
}

/// Opacity of scanline `line` in the bottom band.
pub fn bottom_mask_alpha(line: usize, mask_height: f32) -> f32 {
    1.0 - top_mask_alpha(line, mask_height)
}

/// Which rows go where in one paint pass. Rects are viewport-relative.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintPlan {
    pub range: VisibleRange,
    /// Region painted directly, between the bands. `None` if the bands cover
    /// the whole page.
    pub clip: Option<Rect>,
    pub direct_rows: Vec<usize>,
    pub top_band: Option<Rect>,
    pub top_rows: Vec<usize>,
    pub bottom_band: Option<Rect>,
    pub bottom_rows: Vec<usize>,
}

/// Decide which visible rows are painted directly and which pass through a
/// mask layer. Returns `None` when there is nothing to paint.
pub fn plan_paint(
    heights: &[f32],
    scroll: &ScrollState,
    width: f32,
    mask_height: f32,
) -> Option<PaintPlan> {
    let page = scroll.page_size();
    if page <= 0.0 || width <= 0.0 {
        return None;
    }
    let range = visible_range(heights, scroll.offset(), page)?;

    let band_height = mask_height.min(page);
    let top_band =
        (band_height > 0.0 && !scroll.at_top()).then(|| Rect::new(0.0, 0.0, width, band_height));
    let bottom_band = (band_height > 0.0 && !scroll.at_bottom())
        .then(|| Rect::new(0.0, page - band_height, width, band_height));

    let clip_top = top_band.map_or(0.0, |band| band.bottom());
    let clip_bottom = bottom_band.map_or(page, |band| band.top());
    let clip = (clip_bottom > clip_top).then(|| Rect::new(0.0, clip_top, width, clip_bottom - clip_top));

    let mut plan = PaintPlan {
        range,
        clip,
        direct_rows: Vec::new(),
        top_band,
        top_rows: Vec::new(),
        bottom_band,
        bottom_rows: Vec::new(),
    };

    let mut top = range.start_y - scroll.offset();
    for index in range.rows() {
        let row_rect = Rect::new(0.0, top, width, heights[index]);
        if clip.is_some_and(|c| c.intersect(&row_rect).is_some()) {
            plan.direct_rows.push(index);
        }
        if top_band.is_some_and(|b| b.intersect(&row_rect).is_some()) {
            plan.top_rows.push(index);
        }
        if bottom_band.is_some_and(|b| b.intersect(&row_rect).is_some()) {
            plan.bottom_rows.push(index);
        }
        top += heights[index];
    }

    Some(plan)
}

/// Fill the viewport with the theme's background gradient.
pub(crate) fn paint_background(canvas: &mut dyn Canvas, style: &dyn StyleProvider, viewport: Size) {
    canvas.fill_gradient(
        Rect::new(0.0, 0.0, viewport.width, viewport.height),
        &style.shadow_color_for("linear_background"),
    );
}

/// Paint the rows of `plan` onto `canvas`.
pub(crate) fn paint_plan(
    canvas: &mut dyn Canvas,
    style: &dyn StyleProvider,
    store: &RowStore,
    plan: &PaintPlan,
    scroll: &ScrollState,
    width: f32,
) {
    let widths = store.column_widths();
    // Viewport y of every row in the visible range, in one running pass.
    let tops: Vec<f32> = plan
        .range
        .rows()
        .scan(plan.range.start_y - scroll.offset(), |y, index| {
            let top = *y;
            *y += store.rows()[index].height();
            Some(top)
        })
        .collect();
    let row_y = |index: usize| tops[index - plan.range.start_row];

    if let Some(clip) = plan.clip {
        canvas.push_clip(clip);
        for &index in &plan.direct_rows {
            paint_row(canvas, style, &store.rows()[index], row_y(index), widths);
        }
        canvas.pop_clip();
    }

    if let Some(band) = plan.top_band {
        let lines = band.height().round() as usize;
        let mut layer = canvas.create_layer(Size::new(width, band.height() + 1.0));
        for &index in &plan.top_rows {
            paint_row(layer.as_mut(), style, &store.rows()[index], row_y(index), widths);
        }
        for line in 0..=lines {
            let y = line as f32;
            canvas.composite_scanline(
                layer.as_ref(),
                y,
                Rect::new(0.0, y, width, 1.0),
                top_mask_alpha(line, band.height()),
            );
        }
    }

    if let Some(band) = plan.bottom_band {
        let lines = band.height().round() as usize;
        let mut layer = canvas.create_layer(Size::new(width, band.height()));
        for &index in &plan.bottom_rows {
            paint_row(
                layer.as_mut(),
                style,
                &store.rows()[index],
                row_y(index) - band.top(),
                widths,
            );
        }
        for line in 0..lines {
            let y = line as f32;
            canvas.composite_scanline(
                layer.as_ref(),
                y,
                Rect::new(0.0, band.top() + y, width, 1.0),
                bottom_mask_alpha(line, band.height()),
            );
        }
    }

    tracing::trace!(
        target: targets::PAINT,
        direct = plan.direct_rows.len(),
        top = plan.top_rows.len(),
        bottom = plan.bottom_rows.len(),
        "paint pass"
    );
}

/// Paint each column the row declares, clipped to its column rect.
fn paint_row(
    canvas: &mut dyn Canvas,
    style: &dyn StyleProvider,
    row: &RowHandle,
    y: f32,
    widths: &[f32],
) {
    let height = row.height();
    let state = row.state();
    let declared = row.row().column_widths().len();
    let mut x = 0.0;

    for (column, width) in widths.iter().copied().enumerate().take(declared) {
        let rect = Rect::new(x, y, width, height);
        canvas.push_clip(rect);
        let mut ctx = PaintContext {
            canvas: &mut *canvas,
            style,
            state,
        };
        row.row().paint_column(column, rect, &mut ctx);
        canvas.pop_clip();
        x += width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scroll(offset: f32, page: f32, upper: f32) -> ScrollState {
        let mut scroll = ScrollState::new(page);
        scroll.set_upper(upper);
        scroll.set_offset(offset);
        scroll
    }

    #[test]
    fn test_alpha_curves() {
        assert_eq!(top_mask_alpha(0, 24.0), 0.0);
        assert!((top_mask_alpha(24, 24.0) - 1.0).abs() < 1e-6);
        assert!((top_mask_alpha(12, 24.0) - (PI / 4.0).sin()).abs() < 1e-6);
        assert_eq!(bottom_mask_alpha(0, 24.0), 1.0);
        assert!(bottom_mask_alpha(23, 24.0) < 0.01);
    }

    #[test]
    fn test_no_bands_at_top_of_short_content() {
        let heights = [20.0; 3];
        let plan = plan_paint(&heights, &scroll(0.0, 100.0, 60.0), 200.0, 24.0).unwrap();
        assert_eq!(plan.top_band, None);
        assert_eq!(plan.bottom_band, None);
        assert_eq!(plan.direct_rows, vec![0, 1, 2]);
        assert_eq!(plan.clip, Some(Rect::new(0.0, 0.0, 200.0, 100.0)));
    }

    #[test]
    fn test_bottom_band_only_at_top() {
        let heights = [20.0; 10];
        let plan = plan_paint(&heights, &scroll(0.0, 100.0, 200.0), 100.0, 24.0).unwrap();
        assert!(plan.top_band.is_none());
        assert_eq!(plan.bottom_band, Some(Rect::new(0.0, 76.0, 100.0, 24.0)));
        assert_eq!(plan.range.rows(), 0..5);
        // Row 4 spans 80..100, fully inside the bottom band.
        assert_eq!(plan.direct_rows, vec![0, 1, 2, 3]);
        assert_eq!(plan.bottom_rows, vec![3, 4]);
    }

    #[test]
    fn test_both_bands_mid_scroll() {
        let heights = [20.0; 10];
        let plan = plan_paint(&heights, &scroll(50.0, 100.0, 200.0), 100.0, 24.0).unwrap();
        assert!(plan.top_band.is_some());
        assert!(plan.bottom_band.is_some());
        assert_eq!(plan.clip, Some(Rect::new(0.0, 24.0, 100.0, 52.0)));
        // Row 2 spans -10..10 in viewport space: top band only.
        assert_eq!(plan.top_rows, vec![2, 3]);
        assert!(!plan.direct_rows.contains(&2));
        assert!(plan.direct_rows.contains(&3));
    }

    #[test]
    fn test_top_band_only_at_bottom() {
        let heights = [20.0; 10];
        let plan = plan_paint(&heights, &scroll(100.0, 100.0, 200.0), 100.0, 24.0).unwrap();
        assert!(plan.top_band.is_some());
        assert!(plan.bottom_band.is_none());
        assert_eq!(plan.range.end_row, 10);
    }

    #[test]
    fn test_bands_covering_page_disable_direct_paint() {
        let heights = [20.0; 10];
        let plan = plan_paint(&heights, &scroll(50.0, 40.0, 200.0), 100.0, 24.0).unwrap();
        assert_eq!(plan.clip, None);
        assert!(plan.direct_rows.is_empty());
    }

    #[test]
    fn test_empty_store_has_no_plan() {
        assert!(plan_paint(&[], &scroll(0.0, 100.0, 0.0), 100.0, 24.0).is_none());
    }
}
