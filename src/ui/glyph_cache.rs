//! Glyph surface cache for rendered text
//!
//! Rasterizing a label is by far the most expensive thing a list frame does,
//! and menus redraw the same handful of strings every frame. This cache maps
//! `(text, color)` to the surface the rasterizer produced for it.
//!
//! The table is direct-mapped:
//! - 128 fixed slots, addressed by a djb2 hash of the text XOR the packed color
//! - no chaining or probing: a mismatching key always overwrites the slot
//! - the previous surface is released before every overwrite
//! - a frame clock owned by the cache drives an aging sweep every 256 frames
//!   that releases entries untouched for more than 512 frames
//!
//! Two keys that land on the same slot evict each other.

use std::rc::Rc;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use log::{debug, trace};

use crate::ui::rasterizer::{FontRasterizer, FontRole};
use crate::ui::surface::Surface;

/// Number of slots in the table
pub const CACHE_SLOTS: usize = 128;

/// Longest key stored, in bytes. Longer text is cut at a char boundary.
pub const MAX_TEXT_BYTES: usize = 255;

/// The aging sweep runs when `frame & SWEEP_MASK == 0` (every 256 frames)
const SWEEP_MASK: u32 = 0xFF;

/// Entries unused for more than this many frames (strictly greater) are released
const STALE_AFTER_FRAMES: u32 = 512;

const HASH_SEED: u32 = 5381;

/// Cut `text` to at most [`MAX_TEXT_BYTES`] without splitting a character
pub fn truncate_text(text: &str) -> &str {
    if text.len() <= MAX_TEXT_BYTES {
        return text;
    }
    let mut end = MAX_TEXT_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Pack a color as `0xRRGGBB`
#[inline]
pub fn pack_color(color: Rgb888) -> u32 {
    ((color.r() as u32) << 16) | ((color.g() as u32) << 8) | color.b() as u32
}

/// 32-bit djb2 hash (`h * 33 + byte`) of `text`, XOR-mixed with the color
#[inline]
pub fn text_hash(text: &str, color: Rgb888) -> u32 {
    let hash = text.bytes().fold(HASH_SEED, |hash, byte| {
        (hash << 5).wrapping_add(hash).wrapping_add(byte as u32)
    });
    hash ^ pack_color(color)
}

/// Slot a `(text, color)` key maps to, after truncation
#[inline]
pub fn slot_index(text: &str, color: Rgb888) -> usize {
    (text_hash(truncate_text(text), color) % CACHE_SLOTS as u32) as usize
}

/// Monotonic frame counter. Only [`GlyphCache::advance_frame`] moves it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    frame: u32,
}

impl FrameClock {
    fn advance(&mut self) -> u32 {
        self.frame = self.frame.wrapping_add(1);
        self.frame
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.frame
    }
}

/// One slot of the table
#[derive(Debug)]
struct CacheEntry {
    /// Key text, already truncated
    text: String,
    color: Rgb888,
    role: FontRole,
    /// The owned surface; `None` means the slot is empty
    surface: Option<Rc<Surface>>,
    /// Frame clock value at the last hit or write
    last_used: u32,
}

impl CacheEntry {
    fn empty() -> Self {
        Self {
            text: String::new(),
            color: Rgb888::BLACK,
            role: FontRole::List,
            surface: None,
            last_used: 0,
        }
    }

    #[inline]
    fn is_valid(&self) -> bool {
        self.surface.is_some()
    }

    #[inline]
    fn matches(&self, text: &str, color: Rgb888, role: FontRole) -> bool {
        self.is_valid() && self.color == color && self.role == role && self.text == text
    }

    /// Drop the owned surface. Returns whether there was one.
    fn release(&mut self) -> bool {
        self.surface.take().is_some()
    }
}

/// Hit/miss accounting
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Surfaces released because another key took their slot
    pub evictions: u64,
    /// Surfaces released by the aging sweep
    pub expired: u64,
    /// Misses where the rasterizer produced nothing
    pub failures: u64,
}

/// Fixed-capacity, direct-mapped cache of rendered text surfaces
#[derive(Debug)]
pub struct GlyphCache {
    slots: Box<[CacheEntry]>,
    clock: FrameClock,
    stats: CacheStats,
}

impl Default for GlyphCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphCache {
    /// Create an empty cache with the clock at frame 0
    pub fn new() -> Self {
        Self {
            slots: (0..CACHE_SLOTS).map(|_| CacheEntry::empty()).collect(),
            clock: FrameClock::default(),
            stats: CacheStats::default(),
        }
    }

    /// Advance the frame clock by one and run the aging sweep when due.
    ///
    /// Must be called once per frame before any lookup for that frame.
    pub fn advance_frame(&mut self) -> u32 {
        let frame = self.clock.advance();
        if frame & SWEEP_MASK == 0 {
            self.sweep(frame);
        }
        frame
    }

    /// Current frame clock value
    #[inline]
    pub fn frame(&self) -> u32 {
        self.clock.current()
    }

    /// Return the cached surface for `(text, color)`, rasterizing on a miss.
    ///
    /// The caller must not keep the surface across frames expecting it to
    /// stay cached; the cache may release its own reference at any miss.
    pub fn get_or_render<F>(
        &mut self,
        fonts: &mut F,
        role: FontRole,
        text: &str,
        color: Rgb888,
    ) -> Option<Rc<Surface>>
    where
        F: FontRasterizer + ?Sized,
    {
        let text = truncate_text(text);
        let frame = self.clock.current();
        let index = (text_hash(text, color) % CACHE_SLOTS as u32) as usize;
        let entry = &mut self.slots[index];

        if entry.matches(text, color, role) {
            entry.last_used = frame;
            self.stats.hits += 1;
            return entry.surface.clone();
        }

        self.stats.misses += 1;
        if entry.release() {
            self.stats.evictions += 1;
            trace!("Glyph slot {} evicted for {:?}", index, text);
        }

        let Some(surface) = fonts.render_text(role, text, color) else {
            self.stats.failures += 1;
            trace!("Rasterizer returned nothing for {:?}", text);
            return None;
        };

        let surface = Rc::new(surface);
        entry.text.clear();
        entry.text.push_str(text);
        entry.color = color;
        entry.role = role;
        entry.last_used = frame;
        entry.surface = Some(Rc::clone(&surface));

        Some(surface)
    }

    /// Release whatever slot `index` holds
    pub fn release(&mut self, index: usize) -> bool {
        self.slots.get_mut(index).is_some_and(CacheEntry::release)
    }

    /// Release every surface (explicit shutdown). Returns how many were live.
    pub fn clear(&mut self) -> usize {
        let released = self
            .slots
            .iter_mut()
            .map(CacheEntry::release)
            .filter(|released| *released)
            .count();
        debug!("GlyphCache cleared: released {} surfaces", released);
        released
    }

    /// Number of slots currently holding a surface
    pub fn live_entries(&self) -> usize {
        self.slots.iter().filter(|entry| entry.is_valid()).count()
    }

    /// Whether `(text, color, role)` is currently cached
    pub fn contains(&self, role: FontRole, text: &str, color: Rgb888) -> bool {
        let text = truncate_text(text);
        self.slots[slot_index(text, color)].matches(text, color, role)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Get the cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.stats.hits + self.stats.misses;
        if total == 0 {
            return 0.0;
        }
        self.stats.hits as f64 / total as f64
    }

    /// Log cache statistics for debugging
    pub fn log_stats(&self) {
        debug!(
            "GlyphCache stats: frame={}, live={}/{}, hits={}, misses={}, evictions={}, expired={}, failures={}, hit_rate={:.1}%",
            self.frame(),
            self.live_entries(),
            CACHE_SLOTS,
            self.stats.hits,
            self.stats.misses,
            self.stats.evictions,
            self.stats.expired,
            self.stats.failures,
            self.hit_rate() * 100.0
        );
    }

    fn sweep(&mut self, frame: u32) {
        let mut expired = 0;
        for entry in self.slots.iter_mut() {
            if entry.is_valid()
                && frame.wrapping_sub(entry.last_used) > STALE_AFTER_FRAMES
                && entry.release()
            {
                expired += 1;
            }
        }
        if expired > 0 {
            self.stats.expired += expired;
            trace!("Glyph sweep at frame {} released {} surfaces", frame, expired);
        }
    }
}
