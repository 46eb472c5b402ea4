//! Graphics support via embedded-graphics
//!
//! [`Canvas`] is a frame-sized pair of bit planes implementing
//! [`DrawTarget`] for [`Rgb888`]. Colors go through the same classification
//! as [`show_image`](crate::Epd::show_image): pure white, pure black, and
//! red for everything else.
//!
//! ## Example
//!
//! ```rust,ignore
//! use embedded_graphics::{prelude::*, primitives::{Circle, PrimitiveStyle}};
//! use embedded_graphics::pixelcolor::Rgb888;
//! use waveshare_epd::{Canvas, Model};
//!
//! let mut canvas = Canvas::new(Model::Waveshare2in7bV2.dimensions());
//! Circle::new(Point::new(40, 40), 60)
//!     .into_styled(PrimitiveStyle::with_fill(Rgb888::RED))
//!     .draw(&mut canvas)?;
//!
//! canvas.show(&mut panel)?;
//! ```

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::{Rgb888, RgbColor},
};

use crate::config::Dimensions;
use crate::encoder::Color;
use crate::error::Error;
use crate::panel::Epd;

/// Off-screen drawing surface for one full frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    dimensions: Dimensions,
    black: Vec<u8>,
    red: Vec<u8>,
}

impl Canvas {
    /// Create a white canvas
    ///
    /// Each row starts on a byte boundary, so a width that isn't a multiple
    /// of 8 leaves padding bits at the end of every row.
    pub fn new(dimensions: Dimensions) -> Self {
        let size = Self::row_bytes(dimensions) * usize::from(dimensions.height);
        Self {
            dimensions,
            black: vec![Color::White.black_byte(); size],
            red: vec![Color::White.red_byte(); size],
        }
    }

    /// Fill the whole canvas with one color
    pub fn fill(&mut self, color: Color) {
        self.black.fill(color.black_byte());
        self.red.fill(color.red_byte());
    }

    /// Black and red planes, ready for `show_image_buffer`
    pub fn planes(&self) -> (&[u8], &[u8]) {
        (&self.black, &self.red)
    }

    /// Display the canvas on `panel`
    pub fn show<P: Epd>(&self, panel: &mut P) -> Result<(), Error<P::Interface>> {
        panel.show_image_buffer(&self.black, &self.red)
    }

    /// Color of one pixel, `None` outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let (index, mask) = self.locate(x, y)?;
        let black = self.black[index] & mask != 0;
        let red = self.red[index] & mask != 0;
        Some(match (black, red) {
            (false, _) => Color::Black,
            (true, false) => Color::Red,
            (true, true) => Color::White,
        })
    }

    fn row_bytes(dimensions: Dimensions) -> usize {
        usize::from(dimensions.width).div_ceil(8)
    }

    fn locate(&self, x: u32, y: u32) -> Option<(usize, u8)> {
        if x >= u32::from(self.dimensions.width) || y >= u32::from(self.dimensions.height) {
            return None;
        }
        let index = y as usize * Self::row_bytes(self.dimensions) + x as usize / 8;
        if index >= self.black.len() {
            return None;
        }
        Some((index, 0x80 >> (x % 8)))
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let Some((index, mask)) = self.locate(x, y) else {
            return;
        };
        for (plane, bit) in [
            (&mut self.black, color.black_bit()),
            (&mut self.red, color.red_bit()),
        ] {
            if bit == 1 {
                plane[index] |= mask;
            } else {
                plane[index] &= !mask;
            }
        }
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if x >= 0 && y >= 0 {
                let color = Color::classify([color.r(), color.g(), color.b()]);
                self.set_pixel(x as u32, y as u32, color);
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(Color::classify([color.r(), color.g(), color.b()]));
        Ok(())
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(
            u32::from(self.dimensions.width),
            u32::from(self.dimensions.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder;
    use crate::mock::{Event, MockInterface};
    use crate::models::Model;

    fn small() -> Canvas {
        Canvas::new(Dimensions {
            width: 16,
            height: 2,
        })
    }

    #[test]
    fn starts_white() {
        let canvas = small();
        assert_eq!(canvas.planes(), (&[0xFF; 4][..], &[0xFF; 4][..]));
        assert_eq!(canvas.size(), Size::new(16, 2));
    }

    #[test]
    fn drawn_pixels_land_in_planes() {
        let mut canvas = small();
        canvas
            .draw_iter([
                Pixel(Point::new(0, 0), Rgb888::BLACK),
                Pixel(Point::new(15, 1), Rgb888::new(200, 0, 0)),
            ])
            .unwrap();

        let (black, red) = canvas.planes();
        assert_eq!(black, [0x7F, 0xFF, 0xFF, 0xFF]);
        assert_eq!(red, [0xFF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(canvas.pixel(0, 0), Some(Color::Black));
        assert_eq!(canvas.pixel(15, 1), Some(Color::Red));
        assert_eq!(canvas.pixel(1, 0), Some(Color::White));
    }

    #[test]
    fn out_of_bounds_is_clipped() {
        let mut canvas = small();
        canvas
            .draw_iter([
                Pixel(Point::new(-1, 0), Rgb888::BLACK),
                Pixel(Point::new(16, 0), Rgb888::BLACK),
                Pixel(Point::new(0, 2), Rgb888::BLACK),
            ])
            .unwrap();
        assert_eq!(canvas, small());
        assert_eq!(canvas.pixel(16, 0), None);
    }

    #[test]
    fn redrawing_white_clears_both_planes() {
        let mut canvas = small();
        canvas.draw_iter([Pixel(Point::new(3, 0), Rgb888::RED)]).unwrap();
        canvas.draw_iter([Pixel(Point::new(3, 0), Rgb888::WHITE)]).unwrap();
        assert_eq!(canvas, small());
    }

    #[test]
    fn unaligned_width_pads_each_row() {
        let mut canvas = Canvas::new(Dimensions {
            width: 3,
            height: 3,
        });
        assert_eq!(canvas.planes().0.len(), 3);

        canvas
            .draw_iter([
                Pixel(Point::new(2, 2), Rgb888::BLACK),
                Pixel(Point::new(0, 1), Rgb888::RED),
            ])
            .unwrap();

        let (black, red) = canvas.planes();
        assert_eq!(black, [0xFF, 0xFF, 0xDF]);
        assert_eq!(red, [0xFF, 0x7F, 0xFF]);
        assert_eq!(canvas.pixel(2, 2), Some(Color::Black));
        assert_eq!(canvas.pixel(0, 1), Some(Color::Red));
        assert_eq!(canvas.pixel(3, 0), None);
    }

    #[test]
    fn clear_fills_planes() {
        let mut canvas = small();
        canvas.clear(Rgb888::BLACK).unwrap();
        assert_eq!(canvas.planes(), (&[0x00; 4][..], &[0xFF; 4][..]));
    }

    #[test]
    fn matches_pixel_encoder() {
        let colors = [
            Rgb888::WHITE,
            Rgb888::BLACK,
            Rgb888::RED,
            Rgb888::new(12, 34, 56),
        ];
        let mut canvas = small();
        let mut rgb = Vec::new();
        for i in 0..32 {
            let color = colors[(i * 7) % colors.len()];
            canvas
                .draw_iter([Pixel(Point::new(i as i32 % 16, i as i32 / 16), color)])
                .unwrap();
            rgb.extend([color.r(), color.g(), color.b()]);
        }

        let planes = encoder::encode(&rgb).unwrap();
        assert_eq!(canvas.planes(), (&planes.black[..], &planes.red[..]));
    }

    #[test]
    fn show_sends_planes() {
        let mock = MockInterface::new();
        let probe = mock.probe();
        let mut panel = Model::Waveshare2in7bV2.connect(mock);
        let frame = vec![0xFF; 176 * 264 / 8];
        panel.set_chunk_size(frame.len());
        panel.power_on().unwrap();
        probe.clear();

        let canvas = Canvas::new(Model::Waveshare2in7bV2.dimensions());
        canvas.show(&mut panel).unwrap();

        let planes = probe
            .events()
            .into_iter()
            .filter(|e| *e == Event::Data(frame.clone()))
            .count();
        assert_eq!(planes, 2);
    }
}
