//! Owned RGBA pixel surfaces and the blit/scale/opacity primitives the
//! compositor draws with.
//!
//! Surfaces double as `embedded-graphics` draw targets so text and placeholder
//! theme art can be rasterized straight into them.

use std::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Rounding bias and scale for the fixed-point `a * alpha / 255` product.
const FIXED_POINT_ROUNDING_BIAS: u32 = 128;
const FIXED_POINT_SCALE_257: u32 = 257;

/// Multiply an alpha value by an opacity in 0..=255 with fixed-point rounding.
#[inline]
pub fn mul_alpha(a: u8, alpha: u8) -> u8 {
    let prod = a as u32 * alpha as u32;
    (((prod + FIXED_POINT_ROUNDING_BIAS) * FIXED_POINT_SCALE_257) >> 16) as u8
}

/// Source-over blend of `src` (with effective coverage `a`) onto `dst`.
#[inline]
fn blend(src: [u8; 4], a: u8, dst: [u8; 4]) -> [u8; 4] {
    if a == u8::MAX {
        return [src[0], src[1], src[2], u8::MAX];
    }
    let a = a as u32;
    let inv = 255 - a;
    let channel = |s: u8, d: u8| ((s as u32 * a + d as u32 * inv + 127) / 255) as u8;
    [
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (a + (dst[3] as u32 * inv + 127) / 255) as u8,
    ]
}

/// An owned RGBA8 pixel buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Create a fully transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Create a surface filled with a single color
    pub fn filled(width: u32, height: u32, color: Rgb888, alpha: u8) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(
                width,
                height,
                Rgba([color.r(), color.g(), color.b(), alpha]),
            ),
        }
    }

    /// Wrap an already decoded image
    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// RGBA value at `(x, y)`, or `None` outside the surface
    pub fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        if x < 0 || y < 0 {
            return None;
        }
        self.pixels.get_pixel_checked(x as u32, y as u32).map(|p| p.0)
    }

    /// Overwrite every pixel with `color`
    pub fn fill(&mut self, color: Rgb888, alpha: u8) {
        let value = Rgba([color.r(), color.g(), color.b(), alpha]);
        for pixel in self.pixels.pixels_mut() {
            *pixel = value;
        }
    }

    /// Blit the whole surface (or `src`, clipped to it) onto `dst` at `at`.
    pub fn blit(&self, src: Option<Rectangle>, dst: &mut Surface, at: Point) {
        self.blit_alpha(src, dst, at, u8::MAX);
    }

    /// Blit with an extra opacity multiplier. The source is never modified.
    pub fn blit_alpha(&self, src: Option<Rectangle>, dst: &mut Surface, at: Point, alpha: u8) {
        if alpha == 0 {
            return;
        }
        let bounds = self.bounding_box();
        let src = src.map_or(bounds, |rect| rect.intersection(&bounds));
        if src.size.width == 0 || src.size.height == 0 {
            return;
        }

        let dst_w = dst.width() as i32;
        let dst_h = dst.height() as i32;

        for row in 0..src.size.height as i32 {
            let dy = at.y + row;
            if dy < 0 || dy >= dst_h {
                continue;
            }
            let sy = (src.top_left.y + row) as u32;
            for col in 0..src.size.width as i32 {
                let dx = at.x + col;
                if dx < 0 || dx >= dst_w {
                    continue;
                }
                let sx = (src.top_left.x + col) as u32;
                let s = self.pixels.get_pixel(sx, sy).0;
                let a = mul_alpha(s[3], alpha);
                if a == 0 {
                    continue;
                }
                let d = dst.pixels.get_pixel_mut(dx as u32, dy as u32);
                d.0 = blend(s, a, d.0);
            }
        }
    }

    /// Produce a new scaled copy. The caller owns the result.
    pub fn scaled(&self, factor_x: f64, factor_y: f64, smoothing: bool) -> Surface {
        let width = ((self.width() as f64 * factor_x).round() as u32).max(1);
        let height = ((self.height() as f64 * factor_y).round() as u32).max(1);
        let filter = if smoothing {
            FilterType::Triangle
        } else {
            FilterType::Nearest
        };
        Surface {
            pixels: imageops::resize(&self.pixels, width, height, filter),
        }
    }

    /// Copy of this surface with every pixel's alpha multiplied by `alpha`
    pub fn with_opacity(&self, alpha: u8) -> Surface {
        let mut copy = self.clone();
        for pixel in copy.pixels.pixels_mut() {
            pixel.0[3] = mul_alpha(pixel.0[3], alpha);
        }
        copy
    }
}

impl OriginDimensions for Surface {
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}

impl DrawTarget for Surface {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = (self.width() as i32, self.height() as i32);
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 || point.x >= width || point.y >= height {
                continue;
            }
            self.pixels.put_pixel(
                point.x as u32,
                point.y as u32,
                Rgba([color.r(), color.g(), color.b(), u8::MAX]),
            );
        }
        Ok(())
    }
}
