// SPDX-License-Identifier: GPL-3.0-or-later

//! Shape rasterization on top of the pixel and rectangle primitives.

use std::mem::swap;

use crate::ili9225::Rejected;
use crate::{Color, Coord, Ili9225, Rect, Res, Transport};

// Error term and minor-axis steps of a Bresenham walk after `k` major-axis
// steps, with 0 <= dy <= dx. The error term always ends up in [0, dx).
fn bresenham_skip(dx: i64, dy: i64, k: i64) -> (i64, i64) {
    if k == 0 || dx == 0 {
        return (dx / 2, 0);
    }
    let t = (dx / 2) as i128 - k as i128 * dy as i128;
    let err = t.rem_euclid(dx as i128);
    (err as i64, ((err - t) / dx as i128) as i64)
}

// Last coordinate covered by a span of `len` pixels starting at `start`.
fn far_edge(start: i32, len: u32) -> i32 {
    (start as i64 + len as i64 - 1).clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl<T: Transport> Ili9225<T> {
    /// Bresenham line between two points, both included. Only the part of
    /// the major axis that crosses the panel is walked.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) -> Res<()> {
        let Some((width, height)) = self.extents() else {
            return Ok(());
        };
        let (from, to) = (Coord::new(x0, y0), Coord::new(x1, y1));
        let (mut x0, mut y0, mut x1, mut y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            swap(&mut x0, &mut y0);
            swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            swap(&mut x0, &mut x1);
            swap(&mut y0, &mut y1);
        }

        let (major, minor) = if steep { (height, width) } else { (width, height) };
        let first = x0.max(0);
        let last = x1.min(major as i64 - 1);
        if first > last {
            return self.reject(Rejected::Line(from, to, width, height));
        }

        let dx = x1 - x0;
        let dy = (y1 - y0).abs();
        let ystep = if y0 < y1 { 1 } else { -1 };
        let (mut err, taken) = bresenham_skip(dx, dy, first - x0);
        let mut y = y0 + ystep * taken;
        for x in first..=last {
            if (0..minor as i64).contains(&y) {
                let (px, py) = if steep { (y, x) } else { (x, y) };
                self.draw_pixel(px as i32, py as i32, color)?;
            }
            err -= dy;
            if err < 0 {
                y += ystep;
                err += dx;
            }
        }
        Ok(())
    }

    pub fn draw_hline(&mut self, x: i32, y: i32, w: u32, color: Color) -> Res<()> {
        self.fill_rect(x, y, w, 1, color)
    }

    pub fn draw_vline(&mut self, x: i32, y: i32, h: u32, color: Color) -> Res<()> {
        self.fill_rect(x, y, 1, h, color)
    }

    /// Outline of the rectangle covering the same pixels as
    /// [`Ili9225::fill_rect`] with the same arguments.
    pub fn draw_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) -> Res<()> {
        let Some((width, height)) = self.extents() else {
            return Ok(());
        };
        let rect = Rect::new(x, y, w, h);
        if rect.is_empty() {
            return self.reject(Rejected::Rect(rect, width, height));
        }
        let (x2, y2) = (far_edge(x, w), far_edge(y, h));
        self.draw_line(x, y, x2, y, color)?;
        self.draw_line(x, y, x, y2, color)?;
        self.draw_line(x2, y, x2, y2, color)?;
        self.draw_line(x, y2, x2, y2, color)
    }

    pub fn draw_triangle(&mut self, p0: Coord, p1: Coord, p2: Coord, color: Color) -> Res<()> {
        self.draw_line(p0.x, p0.y, p1.x, p1.y, color)?;
        self.draw_line(p1.x, p1.y, p2.x, p2.y, color)?;
        self.draw_line(p2.x, p2.y, p0.x, p0.y, color)
    }

    /// Midpoint circle outline. A circle that does not fit the panel
    /// entirely is dropped.
    pub fn draw_circle(&mut self, x: i32, y: i32, r: i32, color: Color) -> Res<()> {
        let Some((width, height)) = self.extents() else {
            return Ok(());
        };
        if r <= 0 {
            return self.reject(Rejected::Radius(r));
        }
        let (cx, cy, rr) = (x as i64, y as i64, r as i64);
        if cx - rr < 0 || cy - rr < 0 || cx + rr >= width as i64 || cy + rr >= height as i64 {
            return self.reject(Rejected::Circle(Coord::new(x, y), r, width, height));
        }

        let mut f = 1 - r;
        let mut ddf_x = 1;
        let mut ddf_y = -2 * r;
        let (mut x0, mut y0) = (0, r);

        self.draw_pixel(x, y + r, color)?;
        self.draw_pixel(x, y - r, color)?;
        self.draw_pixel(x + r, y, color)?;
        self.draw_pixel(x - r, y, color)?;
        while x0 < y0 {
            if f >= 0 {
                y0 -= 1;
                ddf_y += 2;
                f += ddf_y;
            }
            x0 += 1;
            ddf_x += 2;
            f += ddf_x;

            for (px, py) in [
                (x + x0, y + y0),
                (x - x0, y + y0),
                (x + x0, y - y0),
                (x - x0, y - y0),
                (x + y0, y + x0),
                (x - y0, y + x0),
                (x + y0, y - x0),
                (x - y0, y - x0),
            ] {
                self.draw_pixel(px, py, color)?;
            }
        }
        Ok(())
    }

    /// Filled disc, one clipped span per scanline pair. Radii longer than
    /// the panel diagonal are rejected.
    pub fn fill_circle(&mut self, x: i32, y: i32, r: i32, color: Color) -> Res<()> {
        let Some((width, height)) = self.extents() else {
            return Ok(());
        };
        let (w, h, rr) = (width as i64, height as i64, r as i64);
        if r <= 0 || rr * rr > w * w + h * h {
            return self.reject(Rejected::Radius(r));
        }
        let (cx, cy) = (x as i64, y as i64);
        if cx + rr < 0 || cy + rr < 0 || cx - rr >= w || cy - rr >= h {
            return self.reject(Rejected::Circle(Coord::new(x, y), r, width, height));
        }

        let mut f = 1 - r;
        let mut ddf_x = 1;
        let mut ddf_y = -2 * r;
        let (mut x0, mut y0) = (0, r);
        let diameter = 2 * r as u32 + 1;

        self.draw_vline(x, y - r, diameter, color)?;
        self.draw_hline(x - r, y, diameter, color)?;
        while x0 < y0 {
            if f >= 0 {
                y0 -= 1;
                ddf_y += 2;
                f += ddf_y;
            }
            x0 += 1;
            ddf_x += 2;
            f += ddf_x;

            let (outer, inner) = (2 * x0 as u32 + 1, 2 * y0 as u32 + 1);
            self.draw_hline(x - x0, y + y0, outer, color)?;
            self.draw_hline(x - x0, y - y0, outer, color)?;
            self.draw_hline(x - y0, y + x0, inner, color)?;
            self.draw_hline(x - y0, y - x0, inner, color)?;
        }
        Ok(())
    }

    /// Plot the set bits of a 1-bit bitmap: rows padded to whole bytes,
    /// most significant bit leftmost.
    pub fn draw_bitmap(
        &mut self,
        x: i32,
        y: i32,
        bitmap: &[u8],
        w: u32,
        h: u32,
        color: Color,
    ) -> Res<()> {
        if self.extents().is_none() {
            return Ok(());
        }
        let stride = (w as usize + 7) / 8;
        let needed = stride * h as usize;
        if bitmap.len() < needed {
            return self.reject(Rejected::ShortData {
                what: "bitmap",
                rect: Rect::new(x, y, w, h),
                needed,
                got: bitmap.len(),
            });
        }
        for j in 0..h as usize {
            let row = &bitmap[j * stride..(j + 1) * stride];
            for i in 0..w as usize {
                if row[i / 8] & (0x80u8 >> (i & 7)) != 0 {
                    self.draw_pixel(x + i as i32, y + j as i32, color)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{PANEL_HEIGHT, PANEL_WIDTH};
    use crate::{colors, Ili9225Mirror, PinConfig, Rotation};
    use std::collections::HashSet;

    fn device() -> Res<Ili9225<Ili9225Mirror>> {
        let mut dev = Ili9225::new(Ili9225Mirror::new(PANEL_WIDTH, PANEL_HEIGHT), PinConfig::default());
        dev.initialize(PANEL_WIDTH, PANEL_HEIGHT, Rotation::Portrait)?;
        Ok(dev)
    }

    fn lit(dev: &Ili9225<Ili9225Mirror>, color: Color) -> HashSet<(i32, i32)> {
        dev.transport()
            .framebuffer()
            .find(color)
            .into_iter()
            .map(|(x, y)| (x as i32, y as i32))
            .collect()
    }

    #[test]
    fn test_line_direction_symmetry() -> Res<()> {
        let mut dev = device()?;
        for (a, b) in [
            ((3, 4), (90, 17)),
            ((10, 200), (12, 3)),
            ((0, 0), (175, 219)),
            ((50, 50), (20, 80)),
            ((7, 7), (7, 70)),
            ((100, 5), (30, 5)),
            ((-20, -10), (40, 60)),
        ] {
            dev.refresh_display()?;
            dev.draw_line(a.0, a.1, b.0, b.1, colors::WHITE)?;
            let forward = dev.transport().framebuffer().digest();
            dev.refresh_display()?;
            dev.draw_line(b.0, b.1, a.0, a.1, colors::WHITE)?;
            let backward = dev.transport().framebuffer().digest();
            assert_eq!(forward, backward, "{a:?} -> {b:?}");
        }
        Ok(())
    }

    #[test]
    fn test_line_pixels() -> Res<()> {
        let mut dev = device()?;
        dev.draw_line(2, 3, 6, 3, colors::RED)?;
        let expected: HashSet<_> = (2..=6).map(|x| (x, 3)).collect();
        assert_eq!(lit(&dev, colors::RED), expected);

        dev.draw_line(0, 10, 4, 14, colors::GREEN)?;
        let expected: HashSet<_> = (0..=4).map(|i| (i, 10 + i)).collect();
        assert_eq!(lit(&dev, colors::GREEN), expected);

        // steep: one pixel per row
        dev.draw_line(20, 20, 22, 30, colors::BLUE)?;
        let rows: HashSet<_> = lit(&dev, colors::BLUE).into_iter().map(|(_, y)| y).collect();
        assert_eq!(rows, (20..=30).collect::<HashSet<_>>());
        assert_eq!(lit(&dev, colors::BLUE).len(), 11);
        Ok(())
    }

    #[test]
    fn test_draw_rect_footprint() -> Res<()> {
        let mut dev = device()?;
        dev.draw_rect(10, 20, 5, 3, colors::YELLOW)?;
        let outline = lit(&dev, colors::YELLOW);
        assert_eq!(outline.len(), 2 * 5 + 2);
        assert!(outline.contains(&(10, 20)));
        assert!(outline.contains(&(14, 22)));
        assert!(!outline.contains(&(15, 20)));
        assert!(!outline.contains(&(12, 21)));

        dev.draw_rect(30, 30, 0, 4, colors::CYAN)?;
        assert!(lit(&dev, colors::CYAN).is_empty());
        Ok(())
    }

    #[test]
    fn test_draw_triangle() -> Res<()> {
        let mut dev = device()?;
        let (a, b, c) = (Coord::new(10, 10), Coord::new(60, 30), Coord::new(25, 90));
        dev.draw_triangle(a, b, c, colors::MAGENTA)?;
        let edges = lit(&dev, colors::MAGENTA);
        for p in [a, b, c] {
            assert!(edges.contains(&(p.x, p.y)), "{p}");
        }
        Ok(())
    }

    #[test]
    fn test_circle_symmetry() -> Res<()> {
        let mut dev = device()?;
        let (cx, cy, r) = (80, 100, 37);
        dev.draw_circle(cx, cy, r, colors::WHITE)?;
        let offsets: HashSet<_> = lit(&dev, colors::WHITE)
            .into_iter()
            .map(|(x, y)| (x - cx, y - cy))
            .collect();
        assert!(offsets.contains(&(0, r)));
        assert!(offsets.contains(&(-r, 0)));
        for &(dx, dy) in &offsets {
            for sym in [
                (dx, dy),
                (-dx, dy),
                (dx, -dy),
                (-dx, -dy),
                (dy, dx),
                (-dy, dx),
                (dy, -dx),
                (-dy, -dx),
            ] {
                assert!(offsets.contains(&sym), "{sym:?} missing for ({dx}, {dy})");
            }
        }
        Ok(())
    }

    #[test]
    fn test_circle_rejected() -> Res<()> {
        let mut dev = device()?;
        dev.draw_circle(10, 50, 11, colors::RED)?; // crosses the left edge
        dev.draw_circle(100, 100, 0, colors::RED)?;
        dev.draw_circle(100, 100, -4, colors::RED)?;
        dev.draw_circle(170, 100, 6, colors::RED)?; // touches x == width
        assert!(lit(&dev, colors::RED).is_empty());

        dev.draw_circle(10, 50, 10, colors::RED)?;
        assert!(lit(&dev, colors::RED).contains(&(0, 50)));
        Ok(())
    }

    #[test]
    fn test_fill_circle_covers_outline() -> Res<()> {
        let mut dev = device()?;
        let (cx, cy, r) = (88, 110, 25);
        dev.draw_circle(cx, cy, r, colors::WHITE)?;
        let outline = lit(&dev, colors::WHITE);
        dev.refresh_display()?;
        dev.fill_circle(cx, cy, r, colors::GREEN)?;
        let disc = lit(&dev, colors::GREEN);

        assert!(outline.is_subset(&disc));
        for y in cy - r..=cy + r {
            let xs: Vec<i32> = disc.iter().filter(|p| p.1 == y).map(|p| p.0).collect();
            let (lo, hi) = (*xs.iter().min().unwrap(), *xs.iter().max().unwrap());
            // no holes, centered
            assert_eq!(xs.len() as i32, hi - lo + 1, "row {y}");
            assert_eq!(cx - lo, hi - cx, "row {y}");
        }
        assert_eq!(disc.iter().filter(|p| p.1 == cy).count(), 2 * r as usize + 1);
        Ok(())
    }

    #[test]
    fn test_fill_circle_clips() -> Res<()> {
        let mut dev = device()?;
        dev.fill_circle(0, 0, 5, colors::BLUE)?;
        let disc = lit(&dev, colors::BLUE);
        assert!(disc.contains(&(0, 0)));
        assert!(disc.contains(&(5, 0)));
        assert!(disc.iter().all(|&(x, y)| x * x + y * y <= 25 + 5));
        assert_eq!(dev.transport().stats().dropped, 0);
        Ok(())
    }

    // Unclipped walk of the same line, keeping the points on the panel.
    fn walked(mut x0: i64, mut y0: i64, mut x1: i64, mut y1: i64) -> HashSet<(i32, i32)> {
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            swap(&mut x0, &mut y0);
            swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            swap(&mut x0, &mut x1);
            swap(&mut y0, &mut y1);
        }
        let (dx, dy) = (x1 - x0, (y1 - y0).abs());
        let ystep = if y0 < y1 { 1 } else { -1 };
        let (mut err, mut y) = (dx / 2, y0);
        let mut points = HashSet::new();
        for x in x0..=x1 {
            let (px, py) = if steep { (y, x) } else { (x, y) };
            if (0..PANEL_WIDTH as i64).contains(&px) && (0..PANEL_HEIGHT as i64).contains(&py) {
                points.insert((px as i32, py as i32));
            }
            err -= dy;
            if err < 0 {
                y += ystep;
                err += dx;
            }
        }
        points
    }

    #[test]
    fn test_clipped_line_matches_full_walk() -> Res<()> {
        let mut dev = device()?;
        for (i, (a, b)) in [
            ((-300, -100), (400, 250)),
            ((130, -500), (40, 700)),
            ((500, 10), (-90, 200)),
            ((-7, 230), (180, -3)),
        ]
        .into_iter()
        .enumerate()
        {
            dev.refresh_display()?;
            dev.draw_line(a.0, a.1, b.0, b.1, colors::CYAN)?;
            let expected = walked(a.0 as i64, a.1 as i64, b.0 as i64, b.1 as i64);
            assert!(!expected.is_empty(), "case {i}");
            assert_eq!(lit(&dev, colors::CYAN), expected, "case {i}");
        }
        Ok(())
    }

    #[test]
    fn test_line_with_extreme_endpoints() -> Res<()> {
        let mut dev = device()?;
        dev.draw_line(0, -10, 5, i32::MAX, colors::RED)?;
        let expected: HashSet<_> = (0..PANEL_HEIGHT as i32).map(|y| (0, y)).collect();
        assert_eq!(lit(&dev, colors::RED), expected);

        let before = dev.transport().stats().pixels;
        dev.draw_line(-50_000_000, 5, 50_000_000, 5, colors::GREEN)?;
        assert_eq!(dev.transport().stats().pixels - before, PANEL_WIDTH as usize);
        let expected: HashSet<_> = (0..PANEL_WIDTH as i32).map(|x| (x, 5)).collect();
        assert_eq!(lit(&dev, colors::GREEN), expected);

        dev.draw_line(i32::MIN, i32::MIN, i32::MAX, i32::MAX, colors::BLUE)?;
        let expected: HashSet<_> = (0..PANEL_WIDTH as i32).map(|k| (k, k)).collect();
        assert_eq!(lit(&dev, colors::BLUE), expected);

        let before = dev.transport().stats();
        dev.draw_line(i32::MIN, -1, i32::MAX, -1, colors::WHITE)?;
        dev.draw_line(-100_000_000, 40, -1, 40, colors::WHITE)?;
        dev.draw_line(i32::MAX, i32::MAX, i32::MAX - 3, i32::MAX, colors::WHITE)?;
        assert_eq!(dev.transport().stats(), before);
        Ok(())
    }

    #[test]
    fn test_circles_with_extreme_arguments() -> Res<()> {
        let mut dev = device()?;
        let before = dev.transport().stats();
        dev.draw_circle(i32::MAX - 1, 100, 5, colors::RED)?;
        dev.draw_circle(100, i32::MIN, 5, colors::RED)?;
        dev.draw_circle(88, 110, i32::MAX, colors::RED)?;
        dev.fill_circle(88, 110, i32::MAX, colors::RED)?;
        dev.fill_circle(88, 110, 282, colors::RED)?; // longer than the diagonal
        dev.fill_circle(i32::MAX, 0, 10, colors::RED)?;
        dev.fill_circle(i32::MIN, i32::MIN, 10, colors::RED)?;
        dev.fill_circle(-20, 50, 10, colors::RED)?;
        assert_eq!(dev.transport().stats(), before);

        dev.fill_circle(88, 110, 150, colors::GREEN)?;
        assert_eq!(lit(&dev, colors::GREEN).len(), (PANEL_WIDTH * PANEL_HEIGHT) as usize);
        Ok(())
    }

    #[test]
    fn test_draw_bitmap() -> Res<()> {
        let mut dev = device()?;
        let bitmap = [0b1010_0000, 0b0100_0000, 0xff, 0xc0];
        dev.draw_bitmap(40, 50, &bitmap, 10, 2, colors::RED)?;
        let mut expected: HashSet<_> = [(40, 50), (42, 50), (49, 50)].into_iter().collect();
        expected.extend((40..50).map(|x| (x, 51)));
        assert_eq!(lit(&dev, colors::RED), expected);

        dev.draw_bitmap(0, 0, &bitmap, 10, 3, colors::CYAN)?;
        assert!(lit(&dev, colors::CYAN).is_empty());
        Ok(())
    }
}
