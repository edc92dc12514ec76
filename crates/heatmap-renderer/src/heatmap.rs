//! The heat map orchestrator.
//!
//! [`HeatMap`] owns the style, the double-buffered points and the render
//! state. Any thread may change settings or add points; drawing happens on
//! whichever thread owns the destination surface. A refresh (palette
//! rebuild, commit, shadow redraw) runs under the render lock; compositing
//! runs outside it on `Arc` snapshots.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use heatmap_common::style::{
    validate_blur, validate_opacity, validate_padding, validate_radius, validate_stops,
};
use heatmap_common::{
    Argb, DataPoint, GradientStop, HeatMapResult, HeatMapStyle, MaxDrawingSize,
};
use tiny_skia::Pixmap;

use crate::compositor::{composite, OpacityRule};
use crate::data_buffer::DataBuffer;
use crate::hit_test::{MapClickListener, TapTracker};
use crate::layout::{to_pixel, DrawingLayout};
use crate::marker::MarkerCallback;
use crate::nearest::nearest;
use crate::palette::{build_palette, Palette};
use crate::shadow::{draw_shadow, RenderBounds, ShadowLayer, ShadowParams};

type RedrawHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone)]
struct Settings {
    style: HeatMapStyle,
    /// Destination size from the last resize
    size: (u32, u32),
}

#[derive(Debug, Default)]
struct RenderState {
    palette: Option<Arc<Palette>>,
    shadow: Option<Arc<ShadowLayer>>,
    bounds: RenderBounds,
}

/// Everything compositing needs, captured at the end of a refresh check.
struct Frame {
    palette: Option<Arc<Palette>>,
    shadow: Option<Arc<ShadowLayer>>,
    bounds: RenderBounds,
    points: Arc<[DataPoint]>,
    style: HeatMapStyle,
}

/// A heat map overlay.
pub struct HeatMap {
    settings: RwLock<Settings>,
    data: DataBuffer,
    needs_refresh: AtomicBool,
    size_changed: AtomicBool,
    render: Mutex<RenderState>,
    marker: RwLock<Option<Arc<dyn MarkerCallback>>>,
    click_listener: RwLock<Option<Arc<dyn MapClickListener>>>,
    redraw_hook: RwLock<Option<RedrawHook>>,
    tap: Mutex<TapTracker>,
}

impl Default for HeatMap {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HeatMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let settings = self.read_settings();
        f.debug_struct("HeatMap")
            .field("size", &settings.size)
            .field("style", &settings.style)
            .field("pending", &self.data.pending_len())
            .field("needs_refresh", &self.needs_refresh.load(Ordering::SeqCst))
            .field("size_changed", &self.size_changed.load(Ordering::SeqCst))
            .finish()
    }
}

impl HeatMap {
    /// A heat map with the default style. The first draw performs a full
    /// refresh.
    pub fn new() -> Self {
        Self::build(HeatMapStyle::default())
    }

    pub fn with_style(style: HeatMapStyle) -> HeatMapResult<Self> {
        style.validate()?;
        Ok(Self::build(style))
    }

    fn build(style: HeatMapStyle) -> Self {
        Self {
            settings: RwLock::new(Settings { style, size: (0, 0) }),
            data: DataBuffer::new(),
            needs_refresh: AtomicBool::new(true),
            size_changed: AtomicBool::new(false),
            render: Mutex::new(RenderState::default()),
            marker: RwLock::new(None),
            click_listener: RwLock::new(None),
            redraw_hook: RwLock::new(None),
            tap: Mutex::new(TapTracker::new()),
        }
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Current style.
    pub fn style(&self) -> HeatMapStyle {
        self.read_settings().style.clone()
    }

    /// Replace the whole style and request a full refresh.
    pub fn apply_style(&self, style: &HeatMapStyle) -> HeatMapResult<()> {
        style.validate()?;
        let max_changed = {
            let mut settings = self.write_settings();
            let max_changed = settings.style.max_drawing_size != style.max_drawing_size;
            settings.style = style.clone();
            max_changed
        };
        if max_changed {
            self.size_changed.store(true, Ordering::SeqCst);
        }
        self.force_refresh();
        Ok(())
    }

    /// Set the palette ramp. Takes effect on the next full refresh.
    pub fn set_gradient_stops<I>(&self, stops: I) -> HeatMapResult<()>
    where
        I: IntoIterator<Item = (f32, Argb)>,
    {
        let stops: Vec<GradientStop> = stops
            .into_iter()
            .map(|(position, color)| GradientStop::new(position, color))
            .collect();
        validate_stops(&stops)?;
        self.write_settings().style.stops = stops;
        Ok(())
    }

    pub fn set_blur(&self, blur: f64) -> HeatMapResult<()> {
        validate_blur(blur)?;
        self.write_settings().style.blur = blur;
        Ok(())
    }

    pub fn set_minimum(&self, minimum: f64) {
        self.write_settings().style.minimum = minimum;
    }

    pub fn set_maximum(&self, maximum: f64) {
        self.write_settings().style.maximum = maximum;
    }

    pub fn set_opacity(&self, opacity: i32) -> HeatMapResult<()> {
        validate_opacity("opacity", opacity)?;
        self.write_settings().style.opacity = opacity;
        Ok(())
    }

    pub fn set_minimum_opacity(&self, opacity: i32) -> HeatMapResult<()> {
        validate_opacity("min_opacity", opacity)?;
        self.write_settings().style.min_opacity = opacity;
        Ok(())
    }

    pub fn set_maximum_opacity(&self, opacity: i32) -> HeatMapResult<()> {
        validate_opacity("max_opacity", opacity)?;
        self.write_settings().style.max_opacity = opacity;
        Ok(())
    }

    pub fn set_radius(&self, radius: f64) -> HeatMapResult<()> {
        validate_radius(radius)?;
        self.write_settings().style.radius = radius;
        Ok(())
    }

    pub fn set_padding(&self, all: f32) -> HeatMapResult<()> {
        validate_padding("padding", all)?;
        self.write_settings().style.padding = heatmap_common::Padding::uniform(all);
        Ok(())
    }

    pub fn set_top_padding(&self, padding: f32) -> HeatMapResult<()> {
        validate_padding("padding.top", padding)?;
        self.write_settings().style.padding.top = padding;
        Ok(())
    }

    pub fn set_left_padding(&self, padding: f32) -> HeatMapResult<()> {
        validate_padding("padding.left", padding)?;
        self.write_settings().style.padding.left = padding;
        Ok(())
    }

    pub fn set_right_padding(&self, padding: f32) -> HeatMapResult<()> {
        validate_padding("padding.right", padding)?;
        self.write_settings().style.padding.right = padding;
        Ok(())
    }

    pub fn set_bottom_padding(&self, padding: f32) -> HeatMapResult<()> {
        validate_padding("padding.bottom", padding)?;
        self.write_settings().style.padding.bottom = padding;
        Ok(())
    }

    /// Cap the offscreen drawing surface. `None` follows the destination.
    pub fn set_max_drawing_size(&self, width: Option<u32>, height: Option<u32>) -> HeatMapResult<()> {
        let max = MaxDrawingSize::new(width, height);
        max.validate()?;
        self.write_settings().style.max_drawing_size = max;
        self.size_changed.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn set_max_drawing_width(&self, width: Option<u32>) -> HeatMapResult<()> {
        let height = self.read_settings().style.max_drawing_size.height;
        self.set_max_drawing_size(width, height)
    }

    pub fn set_max_drawing_height(&self, height: Option<u32>) -> HeatMapResult<()> {
        let width = self.read_settings().style.max_drawing_size.width;
        self.set_max_drawing_size(width, height)
    }

    pub fn set_background(&self, background: Option<Argb>) {
        self.write_settings().style.background = background;
    }

    pub fn set_marker_callback<M>(&self, marker: M)
    where
        M: MarkerCallback + 'static,
    {
        *write_lock(&self.marker) = Some(Arc::new(marker));
    }

    pub fn remove_marker_callback(&self) {
        *write_lock(&self.marker) = None;
    }

    pub fn set_click_listener<L>(&self, listener: L)
    where
        L: MapClickListener + 'static,
    {
        *write_lock(&self.click_listener) = Some(Arc::new(listener));
    }

    pub fn remove_click_listener(&self) {
        *write_lock(&self.click_listener) = None;
    }

    /// Called by [`force_refresh`](Self::force_refresh) so the host can
    /// schedule a draw.
    pub fn set_redraw_hook<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *write_lock(&self.redraw_hook) = Some(Arc::new(hook));
    }

    // ------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------

    /// Queue a point; visible after the next full refresh.
    pub fn add_data_point(&self, point: DataPoint) {
        self.data.add(point);
    }

    pub fn add_data_points<I>(&self, points: I)
    where
        I: IntoIterator<Item = DataPoint>,
    {
        self.data.add_all(points);
    }

    /// Drop queued points; the next full refresh publishes an empty set.
    pub fn clear_data(&self) {
        self.data.clear();
    }

    /// Points the current shadow layer was drawn from.
    pub fn committed_points(&self) -> Arc<[DataPoint]> {
        self.data.committed()
    }

    pub fn pending_len(&self) -> usize {
        self.data.pending_len()
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Record the destination size. Flags a redraw when the drawing surface
    /// it implies changes size.
    pub fn resize(&self, width: u32, height: u32) {
        let drawing_changed = {
            let mut settings = self.write_settings();
            if settings.size == (width, height) {
                return;
            }
            let max = settings.style.max_drawing_size;
            let (old_w, old_h) = settings.size;
            settings.size = (width, height);
            DrawingLayout::new(old_w, old_h, max).drawing_size()
                != DrawingLayout::new(width, height, max).drawing_size()
        };
        if drawing_changed {
            self.size_changed.store(true, Ordering::SeqCst);
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.read_settings().size
    }

    pub fn drawing_layout(&self) -> DrawingLayout {
        let settings = self.read_settings();
        DrawingLayout::new(settings.size.0, settings.size.1, settings.style.max_drawing_size)
    }

    /// Request a full refresh on the next draw.
    pub fn force_refresh(&self) {
        self.needs_refresh.store(true, Ordering::SeqCst);
        let hook = read_lock(&self.redraw_hook).clone();
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Run a full refresh now, from any thread, sized from the last
    /// [`resize`](Self::resize). The caller should trigger a draw afterwards.
    pub fn force_refresh_off_context(&self) -> HeatMapResult<()> {
        self.refresh(true).map(|_| ())
    }

    /// Refresh if needed, then composite onto `surface` and draw markers.
    ///
    /// The surface's size becomes the destination size.
    pub fn draw(&self, surface: &mut Pixmap) -> HeatMapResult<()> {
        self.resize(surface.width(), surface.height());
        let frame = self.refresh(false)?;

        if frame.points.is_empty() {
            return Ok(());
        }
        let (Some(shadow), Some(palette)) = (&frame.shadow, &frame.palette) else {
            return Ok(());
        };

        let rule = OpacityRule::from_style(&frame.style)?;
        composite(surface, shadow, frame.bounds, palette, &rule, frame.style.background)?;

        let marker = read_lock(&self.marker).clone();
        if let Some(marker) = marker {
            let width = surface.width() as f32;
            let height = surface.height() as f32;
            for point in frame.points.iter() {
                let (x, y) = to_pixel(point.x, point.y, width, height, &frame.style.padding);
                marker.draw_marker(surface, x, y, point);
            }
        }

        Ok(())
    }

    fn refresh(&self, force: bool) -> HeatMapResult<Frame> {
        let mut state = self.lock_render();
        let settings = self.read_settings().clone();

        let full = self.needs_refresh.swap(false, Ordering::SeqCst) || force;
        let resized = self.size_changed.swap(false, Ordering::SeqCst);

        if full || resized {
            if let Err(err) = self.redraw(&mut state, &settings, full) {
                if full {
                    self.needs_refresh.store(true, Ordering::SeqCst);
                }
                if resized {
                    self.size_changed.store(true, Ordering::SeqCst);
                }
                tracing::warn!(error = %err, "Heat map refresh failed");
                return Err(err);
            }
        }

        Ok(Frame {
            palette: state.palette.clone(),
            shadow: state.shadow.clone(),
            bounds: state.bounds,
            points: self.data.committed(),
            style: settings.style,
        })
    }

    /// Rebuild the shadow layer, plus palette and committed points when
    /// `full`. Nothing in `state` changes unless every fallible step passes.
    fn redraw(&self, state: &mut RenderState, settings: &Settings, full: bool) -> HeatMapResult<()> {
        let style = &settings.style;
        let layout = DrawingLayout::new(settings.size.0, settings.size.1, style.max_drawing_size);
        let (width, height) = layout.drawing_size();

        let palette = if full || state.palette.is_none() {
            Some(Arc::new(build_palette(&style.stops)?))
        } else {
            None
        };

        let mut layer = self.take_or_allocate_shadow(state, width, height)?;

        if full {
            self.data.commit();
        }
        let points = self.data.committed();

        let params = ShadowParams {
            radius: style.radius,
            blur: style.blur,
            minimum: style.minimum,
            maximum: style.maximum,
            padding: layout.drawing_padding(&style.padding),
        };
        let bounds = draw_shadow(&mut layer, &points, &params);

        if let Some(palette) = palette {
            state.palette = Some(palette);
        }
        state.shadow = Some(Arc::new(layer));
        state.bounds = bounds;

        tracing::debug!(
            full,
            points = points.len(),
            width,
            height,
            scale = layout.scale(),
            "Heat map refreshed"
        );
        Ok(())
    }

    /// Reuse the current shadow layer when its size matches and no frame
    /// still holds it, otherwise allocate a new one.
    fn take_or_allocate_shadow(
        &self,
        state: &mut RenderState,
        width: u32,
        height: u32,
    ) -> HeatMapResult<ShadowLayer> {
        let reusable = state.shadow.as_ref().is_some_and(|shadow| {
            shadow.width() == width && shadow.height() == height && Arc::strong_count(shadow) == 1
        });
        if reusable {
            if let Some(layer) = state.shadow.take().and_then(|shadow| Arc::try_unwrap(shadow).ok()) {
                return Ok(layer);
            }
        }
        ShadowLayer::new(width, height)
    }

    // ------------------------------------------------------------------
    // Queries and input
    // ------------------------------------------------------------------

    /// Committed point closest to a normalized coordinate.
    pub fn query_nearest(&self, x: f32, y: f32) -> Option<DataPoint> {
        let points = self.data.committed();
        nearest(&points, x, y).cloned()
    }

    /// Report a click at destination pixel (x, y) to the click listener.
    ///
    /// Returns false when no listener is set.
    pub fn click(&self, x: f32, y: f32) -> bool {
        let listener = read_lock(&self.click_listener).clone();
        let Some(listener) = listener else {
            return false;
        };

        let (width, height) = self.size();
        let closest = if width == 0 || height == 0 {
            None
        } else {
            self.query_nearest(x / width as f32, y / height as f32)
        };

        listener.on_map_clicked(x as i32, y as i32, closest.as_ref());
        true
    }

    /// Start of a press gesture at destination pixel (x, y).
    pub fn on_press(&self, x: f32, y: f32) {
        self.lock_tap().press(x, y);
    }

    /// End of a press gesture; clicks when the release stays near the press.
    pub fn on_release(&self, x: f32, y: f32) -> bool {
        let released = self.lock_tap().release(x, y);
        match released {
            Some((x, y)) => self.click(x, y),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn palette(&self) -> Option<Arc<Palette>> {
        self.lock_render().palette.clone()
    }

    pub fn shadow_snapshot(&self) -> Option<Arc<ShadowLayer>> {
        self.lock_render().shadow.clone()
    }

    pub fn render_bounds(&self) -> RenderBounds {
        self.lock_render().bounds
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh.load(Ordering::SeqCst)
    }

    pub fn size_changed(&self) -> bool {
        self.size_changed.load(Ordering::SeqCst)
    }

    fn read_settings(&self) -> RwLockReadGuard<'_, Settings> {
        read_lock(&self.settings)
    }

    fn write_settings(&self) -> RwLockWriteGuard<'_, Settings> {
        write_lock(&self.settings)
    }

    fn lock_render(&self) -> MutexGuard<'_, RenderState> {
        self.render.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_tap(&self) -> MutexGuard<'_, TapTracker> {
        self.tap.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
