//! Headless render loop driving the compositor the way a launcher frame
//! loop would.

use std::path::Path;
use std::time::{Duration, Instant};

use color_eyre::eyre::WrapErr;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use log::{debug, info, warn};

use crate::app::config::{Config, ListConfig};
use crate::ui::compositor::{FrameReport, ListCompositor};
use crate::ui::list::ListState;
use crate::ui::preview::PreviewSource;
use crate::ui::rasterizer::FontRasterizer;
use crate::ui::resources::Resources;
use crate::ui::surface::Surface;

/// Frame timing gathered by the loop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub over_budget: u64,
    pub total: Duration,
    pub worst: Duration,
}

impl FrameStats {
    pub fn average(&self) -> Duration {
        if self.frames == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total.as_nanos() / u128::from(self.frames);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    fn record(&mut self, elapsed: Duration, budget: Option<Duration>) -> bool {
        self.frames += 1;
        self.total = self.total.saturating_add(elapsed);
        self.worst = self.worst.max(elapsed);
        let over = budget.is_some_and(|budget| elapsed > budget);
        if over {
            self.over_budget += 1;
        }
        over
    }
}

pub struct Host<F, R, P>
where
    F: FontRasterizer,
    R: Resources,
    P: PreviewSource,
{
    compositor: ListCompositor<F>,
    resources: R,
    previews: P,
    list: ListState,
    list_config: ListConfig,
    screen: Surface,
    budget: Option<Duration>,
    select_every: u32,
    stats: FrameStats,
}

impl<F, R, P> Host<F, R, P>
where
    F: FontRasterizer,
    R: Resources,
    P: PreviewSource,
{
    pub fn new(
        compositor: ListCompositor<F>,
        resources: R,
        previews: P,
        list: ListState,
        config: &Config,
    ) -> Self {
        let size = config.display.screen_size();
        let budget = config.display.frame_budget_ms;
        Self {
            compositor,
            resources,
            previews,
            list,
            list_config: config.list.clone(),
            screen: Surface::new(size.width, size.height),
            budget: (budget > 0).then(|| Duration::from_millis(budget)),
            select_every: config.host.select_every,
            stats: FrameStats::default(),
        }
    }

    pub fn list(&self) -> &ListState {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListState {
        &mut self.list
    }

    pub fn screen(&self) -> &Surface {
        &self.screen
    }

    pub fn compositor(&self) -> &ListCompositor<F> {
        &self.compositor
    }

    pub fn previews(&self) -> &P {
        &self.previews
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Clear the screen and composite one frame
    pub fn render_frame(&mut self) -> &FrameReport {
        match self.resources.background() {
            Some(background) => background.blit(None, &mut self.screen, Point::zero()),
            None => self.screen.fill(Rgb888::BLACK, u8::MAX),
        }

        let params = self
            .list_config
            .render_params(self.resources.background(), self.compositor.scale());

        let start = Instant::now();
        self.compositor.render_list_custom(
            &mut self.screen,
            &mut self.list,
            &self.resources,
            &mut self.previews,
            &params,
        );
        let elapsed = start.elapsed();

        if self.stats.record(elapsed, self.budget) {
            warn!(
                "Frame {} took {:?} (budget {:?})",
                self.compositor.cache().frame(),
                elapsed,
                self.budget.unwrap_or_default()
            );
        }

        self.compositor.last_frame()
    }

    /// Render `frames` frames, moving the selection every `select_every`
    pub fn run(&mut self, frames: u32) -> FrameStats {
        info!(
            "Rendering {} frames ({} items, select every {})",
            frames,
            self.list.item_count(),
            self.select_every
        );

        for i in 0..frames {
            if self.select_every > 0 && i > 0 && i % self.select_every == 0 {
                self.list.select_next();
                debug!("Selected item {}", self.list.active_pos());
            }
            self.render_frame();
        }

        self.log_stats();
        self.stats
    }

    pub fn log_stats(&self) {
        info!(
            "Rendered {} frames: avg {:?}, worst {:?}, {} over budget",
            self.stats.frames,
            self.stats.average(),
            self.stats.worst,
            self.stats.over_budget
        );
        info!(
            "Glyph cache hit rate {:.1}%, {} live surfaces",
            self.compositor.cache().hit_rate() * 100.0,
            self.compositor.cache().live_entries()
        );
        self.compositor.cache().log_stats();
    }

    /// Write the current screen contents as PNG
    pub fn save_frame(&self, path: &Path) -> color_eyre::Result<()> {
        self.screen
            .image()
            .save(path)
            .wrap_err_with(|| format!("Failed to write frame to {}", path.display()))?;
        info!("Wrote frame to {}", path.display());
        Ok(())
    }

    /// Release every cached glyph surface. Returns how many were live.
    pub fn shutdown(&mut self) -> usize {
        let released = self.compositor.shutdown();
        info!("Released {} cached glyph surfaces", released);
        released
    }
}
