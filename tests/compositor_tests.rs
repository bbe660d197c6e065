use maplet_compositor::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Integration tests for whole frames: fault tolerance, pin balance and placeholders.
/// These drive the overlay the way a rendering host does, one frame at a time.
#[cfg(test)]
mod compositor_tests {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Pooled image that counts its pins and can pretend to be recycled
    #[derive(Debug)]
    struct CountingImage {
        raster: RgbaImage,
        valid: bool,
        begins: AtomicUsize,
        finishes: AtomicUsize,
    }

    impl CountingImage {
        fn new(valid: bool) -> Arc<Self> {
            Arc::new(Self {
                raster: RgbaImage::from_pixel(256, 256, image::Rgba([0, 128, 0, 255])),
                valid,
                begins: AtomicUsize::new(0),
                finishes: AtomicUsize::new(0),
            })
        }

        fn balanced(&self) -> bool {
            self.begins.load(Ordering::SeqCst) == self.finishes.load(Ordering::SeqCst)
        }
    }

    impl Pinnable for CountingImage {
        fn begin_use(&self) {
            self.begins.fetch_add(1, Ordering::SeqCst);
        }

        fn finish_use(&self) {
            self.finishes.fetch_add(1, Ordering::SeqCst);
        }

        fn is_valid(&self) -> bool {
            self.valid
        }

        fn raster(&self) -> &RgbaImage {
            &self.raster
        }
    }

    /// Provider serving one counting image per wrapped coordinate
    struct CountingProvider {
        images: HashMap<TileCoord, Arc<CountingImage>>,
        memory_pressure: AtomicUsize,
        tile_size: u32,
    }

    impl CountingProvider {
        fn zoom_two(valid: bool) -> Self {
            let mut images = HashMap::default();
            for x in 0..4 {
                for y in 0..4 {
                    images.insert(TileCoord::new(x, y, 2), CountingImage::new(valid));
                }
            }
            Self {
                images,
                memory_pressure: AtomicUsize::new(0),
                tile_size: 256,
            }
        }

        /// Nothing resolves, and the reported tile size is too large to allocate a placeholder for
        fn unallocatable() -> Self {
            Self {
                images: HashMap::default(),
                memory_pressure: AtomicUsize::new(0),
                tile_size: u32::MAX,
            }
        }

        fn all_balanced(&self) -> bool {
            self.images.values().all(|image| image.balanced())
        }

        fn total_pins(&self) -> usize {
            self.images
                .values()
                .map(|image| image.begins.load(Ordering::SeqCst))
                .sum()
        }
    }

    impl TileProvider for CountingProvider {
        fn resolve(&self, coord: &TileCoord) -> Option<TileImage> {
            self.images
                .get(&coord.wrapped())
                .map(|image| TileImage::Reusable(image.clone()))
        }

        fn ensure_capacity(&self, _count: usize) {}

        fn use_data_connection(&self) -> bool {
            false
        }

        fn set_use_data_connection(&self, _enabled: bool) {}

        fn min_zoom(&self) -> u8 {
            0
        }

        fn max_zoom(&self) -> u8 {
            4
        }

        fn tile_size_pixels(&self) -> u32 {
            self.tile_size
        }

        fn on_memory_pressure(&self) {
            self.memory_pressure.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Surface that fails or panics on the n-th raster it is asked to draw
    struct FaultySurface {
        inner: RenderContext,
        rasters_seen: usize,
        fail_at: usize,
        panic_instead: bool,
    }

    impl FaultySurface {
        fn failing_at(fail_at: usize) -> Self {
            Self {
                inner: RenderContext::new(512, 512),
                rasters_seen: 0,
                fail_at,
                panic_instead: false,
            }
        }

        fn panicking_at(fail_at: usize) -> Self {
            Self {
                panic_instead: true,
                ..Self::failing_at(fail_at)
            }
        }
    }

    impl DrawSurface for FaultySurface {
        fn draw_raster(&mut self, raster: &RgbaImage, dest: PixelRect) -> Result<()> {
            self.rasters_seen += 1;
            if self.rasters_seen == self.fail_at {
                if self.panic_instead {
                    panic!("surface lost mid-frame");
                }
                return Err(MapError::Render("surface lost".to_string()));
            }
            self.inner.draw_raster(raster, dest)
        }

        fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: SerializableColor) -> Result<()> {
            self.inner.draw_line(from, to, color)
        }

        fn draw_text(&mut self, text: &str, origin: PixelPoint, color: SerializableColor) -> Result<()> {
            self.inner.draw_text(text, origin, color)
        }
    }

    fn quadrant_frame() -> FrameProjection {
        FrameProjection::new(2, PixelRect::new(0, 0, 512, 512), 256)
    }

    #[test]
    fn test_failed_draw_does_not_abort_frame() {
        init_logging();
        let provider = Arc::new(CountingProvider::zoom_two(true));
        let mut overlay = TilesOverlay::new(provider.clone()).unwrap();
        let mut surface = FaultySurface::failing_at(2);

        let stats = overlay.draw(&mut surface, &quadrant_frame());

        assert_eq!(stats.visited, 4);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.drawn, 3);
        assert_eq!(surface.inner.rasters().count(), 3);
        assert_eq!(provider.total_pins(), 4);
        assert!(provider.all_balanced(), "every pin must be released");
    }

    #[test]
    fn test_panicking_surface_still_unpins() {
        init_logging();
        let provider = Arc::new(CountingProvider::zoom_two(true));
        let mut overlay = TilesOverlay::new(provider.clone()).unwrap();
        let mut surface = FaultySurface::panicking_at(3);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            overlay.draw(&mut surface, &quadrant_frame())
        }));

        assert!(outcome.is_err());
        assert_eq!(provider.total_pins(), 3);
        assert!(provider.all_balanced());
    }

    #[test]
    fn test_recycled_image_gets_placeholder_and_single_unpin() {
        init_logging();
        let provider = Arc::new(CountingProvider::zoom_two(false));
        let mut overlay = TilesOverlay::new(provider.clone()).unwrap();
        let mut ctx = RenderContext::new(512, 512);

        let stats = overlay.draw(&mut ctx, &quadrant_frame());

        assert_eq!(stats.stale, 4);
        assert_eq!(stats.placeholders, 4);
        assert_eq!(stats.drawn, 0);

        let placeholder = overlay.loading_tile().unwrap().unwrap();
        let source = RenderContext::raster_source(&placeholder);
        assert!(ctx.rasters().all(|(drawn, _)| drawn == source));

        for image in provider.images.values().filter(|i| i.begins.load(Ordering::SeqCst) > 0) {
            assert_eq!(image.begins.load(Ordering::SeqCst), 1);
            assert_eq!(image.finishes.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_recycled_image_without_placeholder_leaves_cell_blank() {
        init_logging();
        let provider = Arc::new(CountingProvider::zoom_two(false));
        let mut overlay = TilesOverlay::new(provider.clone()).unwrap();
        overlay.set_loading_background_color(SerializableColor::TRANSPARENT);
        let mut ctx = RenderContext::new(512, 512);

        let stats = overlay.draw(&mut ctx, &quadrant_frame());

        assert_eq!(stats.blank, 4);
        assert!(ctx.get_drawing_queue().is_empty());
        assert!(provider.all_balanced());
        assert_eq!(provider.memory_pressure.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_placeholder_allocation_failure_leaves_cells_blank() {
        init_logging();
        let provider = Arc::new(CountingProvider::unallocatable());
        let mut overlay = TilesOverlay::new(provider.clone()).unwrap();
        let mut ctx = RenderContext::new(512, 512);

        let stats = overlay.draw(&mut ctx, &quadrant_frame());

        assert_eq!(stats.visited, 4);
        assert_eq!(stats.blank, stats.visited);
        assert_eq!(stats.placeholders, 0);
        assert_eq!(stats.failed, 0);
        assert_eq!(provider.memory_pressure.load(Ordering::SeqCst), 4);
        assert!(ctx.get_drawing_queue().is_empty());
        assert!(overlay.loading_tile().is_err());
    }

    #[test]
    fn test_wrapped_viewport_draws_every_copy() {
        init_logging();
        let provider = Arc::new(CountingProvider::zoom_two(true));
        let mut overlay = TilesOverlay::new(provider.clone()).unwrap();
        let mut ctx = RenderContext::new(2048, 256);

        // Twice the world width at zoom 2: each column shows up twice
        let frame = FrameProjection::new(2, PixelRect::new(-1024, 0, 1024, 256), 256);
        let stats = overlay.draw(&mut ctx, &frame);

        assert_eq!(stats.visited, 8);
        assert_eq!(stats.drawn, 8);
        let same_tile = provider.images[&TileCoord::new(0, 2, 2)].clone();
        assert_eq!(same_tile.begins.load(Ordering::SeqCst), 2);
        assert!(provider.all_balanced());
    }

    #[test]
    fn test_capacity_follows_viewport_and_overshoot() {
        init_logging();
        let cache = Arc::new(TileCache::new(1));
        let options = CompositorOptions {
            overshoot_tile_cache: 5,
            ..CompositorOptions::default()
        };
        let mut overlay = TilesOverlay::with_options(cache.clone(), options).unwrap();
        let mut ctx = RenderContext::new(1024, 768);

        let frame = FrameProjection::centered_on(PixelPoint::new(0, 0), 1024, 768, 5);
        let range = TileRange::covering(&frame.world_viewport(), 5, 256);
        let stats = overlay.draw(&mut ctx, &frame);

        assert_eq!(stats.capacity_advised, range.len() + 5);
        assert_eq!(cache.capacity(), range.len() + 5);

        // Smaller views never shrink the cache
        let small = FrameProjection::centered_on(PixelPoint::new(0, 0), 100, 100, 5);
        ctx.begin_frame();
        overlay.draw(&mut ctx, &small);
        assert_eq!(cache.capacity(), range.len() + 5);
    }

    #[test]
    fn test_raster_frame_end_to_end() -> anyhow::Result<()> {
        init_logging();
        let cache = Arc::new(TileCache::default());
        cache.insert(
            TileCoord::new(2, 2, 2),
            RgbaImage::from_pixel(256, 256, image::Rgba([255, 0, 0, 255])),
        );
        let mut overlay = TilesOverlay::new(cache.clone())?;

        let frame = quadrant_frame();
        let mut surface = RasterSurface::for_screen_rect(frame.screen_rect)?;
        let stats = overlay.draw(&mut surface, &frame);

        assert_eq!(stats.drawn, 1);
        assert_eq!(stats.placeholders, 3);
        assert_eq!(
            surface.pixel_at(PixelPoint::new(10, 10)),
            Some(SerializableColor::rgb(255, 0, 0))
        );
        // Inside the placeholder for tile (3, 3), between grid lines
        assert_eq!(
            surface.pixel_at(PixelPoint::new(300, 300)),
            Some(SerializableColor::loading_background())
        );
        assert_eq!(
            surface.pixel_at(PixelPoint::new(256, 300)),
            Some(SerializableColor::loading_line())
        );

        // The three misses were each requested once
        let requested: HashSet<_> = cache.requests().try_iter().collect();
        assert_eq!(requested.len(), 3);
        assert!(!requested.contains(&TileCoord::new(2, 2, 2)));
        Ok(())
    }

    #[test]
    fn test_overlay_from_json_options() -> anyhow::Result<()> {
        init_logging();
        let options = CompositorOptions::from_json(r#"{ "overshoot_tile_cache": 2, "debug": true }"#)?;
        let overlay = TilesOverlay::with_options(Arc::new(TileCache::default()), options)?;

        assert_eq!(overlay.overshoot_tile_cache(), 2);
        assert!(overlay.is_debug());
        assert_eq!(overlay.loading_line_color(), SerializableColor::loading_line());
        assert_eq!(CompositorOptions::from_json(&overlay.options().to_json()?)?, overlay.options());
        Ok(())
    }

    #[test]
    fn test_provider_pass_throughs() {
        init_logging();
        let cache = Arc::new(TileCache::default().with_zoom_range(3, 12));
        let overlay = TilesOverlay::new(cache.clone()).unwrap();

        assert_eq!(overlay.min_zoom_level(), 3);
        assert_eq!(overlay.max_zoom_level(), 12);
        assert!(overlay.use_data_connection());
        overlay.set_use_data_connection(false);
        assert!(!cache.use_data_connection());

        cache.insert(TileCoord::new(0, 0, 3), RgbaImage::new(256, 256));
        overlay.detach();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_inverted_zoom_range_is_rejected() {
        let cache = Arc::new(TileCache::default().with_zoom_range(10, 2));
        assert!(matches!(
            TilesOverlay::new(cache),
            Err(MapError::Configuration(_))
        ));
    }
}
