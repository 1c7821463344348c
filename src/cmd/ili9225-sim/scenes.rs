// SPDX-License-Identifier: GPL-3.0-or-later

use ili9225::colors::{self, BLACK, BLUE, CYAN, GREEN, MAGENTA, RED, WHITE, YELLOW};
use ili9225::{Color, Coord, GfxFont, Ili9225, Res, Transport, FONT_5X8};

/// An RGB565 picture loaded from disk.
pub struct Picture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl Picture {
    pub fn load(path: &str) -> Res<Self> {
        let image = lodepng::decode32_file(path)?;
        let pixels = image
            .buffer
            .iter()
            .map(|p| colors::from_rgb(p.r, p.g, p.b))
            .collect();
        Ok(Self {
            width: image.width as u32,
            height: image.height as u32,
            pixels,
        })
    }
}

#[derive(Default)]
pub struct Assets {
    pub font: Option<GfxFont>,
    pub picture: Option<Picture>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Pixels,
    Lines,
    Rectangles,
    Circles,
    FilledCircles,
    Text,
    Complex,
    FillScreen(Color),
    Picture,
}

pub fn run<T: Transport>(dev: &mut Ili9225<T>, scene: Scene, assets: &Assets) -> Res<()> {
    match scene {
        Scene::Pixels => pixels(dev),
        Scene::Lines => lines(dev),
        Scene::Rectangles => rectangles(dev),
        Scene::Circles => circles(dev),
        Scene::FilledCircles => filled_circles(dev),
        Scene::Text => text(dev, assets.font.as_ref()),
        Scene::Complex => complex(dev),
        Scene::FillScreen(color) => dev.fill_screen(color),
        Scene::Picture => match &assets.picture {
            Some(p) => {
                dev.fill_screen(BLACK)?;
                dev.draw_image(0, 0, p.width, p.height, &p.pixels)
            }
            None => Ok(()),
        },
    }
}

fn pixels<T: Transport>(dev: &mut Ili9225<T>) -> Res<()> {
    dev.fill_screen(WHITE)?;
    // the diagonal runs off the right edge; those pixels are dropped
    for i in 0..220 {
        dev.draw_pixel(i, i, RED)?;
    }
    for x in 0..176 {
        dev.draw_pixel(x, 110, BLUE)?;
    }
    for y in 0..220 {
        dev.draw_pixel(88, y, GREEN)?;
    }
    Ok(())
}

fn lines<T: Transport>(dev: &mut Ili9225<T>) -> Res<()> {
    dev.fill_screen(BLACK)?;
    dev.draw_line(10, 10, 166, 10, RED)?;
    dev.draw_line(10, 30, 166, 50, GREEN)?;
    dev.draw_line(10, 70, 40, 150, BLUE)?;
    dev.draw_line(0, 0, 175, 219, YELLOW)?;
    dev.draw_line(175, 0, 0, 219, CYAN)?;
    Ok(())
}

fn rectangles<T: Transport>(dev: &mut Ili9225<T>) -> Res<()> {
    dev.fill_screen(BLACK)?;
    dev.draw_rect(20, 20, 50, 40, RED)?;
    dev.fill_rect(80, 20, 50, 40, GREEN)?;
    dev.draw_rect(20, 80, 50, 40, BLUE)?;
    dev.fill_rect(80, 80, 50, 40, YELLOW)?;
    dev.draw_triangle(
        Coord::new(88, 140),
        Coord::new(40, 200),
        Coord::new(136, 200),
        MAGENTA,
    )
}

fn circles<T: Transport>(dev: &mut Ili9225<T>) -> Res<()> {
    dev.fill_screen(BLACK)?;
    dev.draw_circle(88, 60, 30, RED)?;
    dev.draw_circle(88, 60, 40, GREEN)?;
    dev.draw_circle(88, 60, 50, BLUE)
}

fn filled_circles<T: Transport>(dev: &mut Ili9225<T>) -> Res<()> {
    dev.fill_screen(BLACK)?;
    dev.fill_circle(40, 50, 30, RED)?;
    dev.fill_circle(88, 80, 25, GREEN)?;
    dev.fill_circle(136, 50, 30, BLUE)
}

fn text<T: Transport>(dev: &mut Ili9225<T>, font: Option<&GfxFont>) -> Res<()> {
    dev.fill_screen(BLACK)?;
    dev.draw_text(10, 10, "ILI9225 Test", &FONT_5X8, WHITE)?;
    dev.draw_text(10, 30, "Hello from Rust\nsecond line", &FONT_5X8, GREEN)?;
    dev.draw_text(10, 60, "0123456789", &FONT_5X8, YELLOW)?;

    let big = FONT_5X8.with_size(2);
    let mut x = 10;
    for c in ['A', 'B', 'C'] {
        x += dev.draw_char(x, 90, c, &big, CYAN)?;
    }

    if let Some(font) = font {
        dev.draw_text(10, 130, "TrueType", font, MAGENTA)?;
    }
    Ok(())
}

fn complex<T: Transport>(dev: &mut Ili9225<T>) -> Res<()> {
    dev.fill_screen(BLACK)?;
    dev.fill_rect(0, 0, 176, 20, BLUE)?;
    dev.draw_text(5, 6, "ILI9225 Display", &FONT_5X8, WHITE)?;
    dev.draw_rect(5, 25, 166, 150, WHITE)?;
    dev.fill_circle(50, 80, 20, RED)?;
    dev.fill_rect(100, 60, 40, 40, GREEN)?;
    dev.draw_circle(120, 120, 25, YELLOW)?;
    dev.draw_line(10, 170, 166, 130, CYAN)?;
    dev.fill_rect(0, 200, 176, 20, colors::from_rgb(64, 64, 64))?;
    dev.draw_text(5, 206, "Status: OK", &FONT_5X8, GREEN)?;
    Ok(())
}
