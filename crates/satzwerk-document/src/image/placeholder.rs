// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Placeholder illustrations — procedurally drawn scenes for chapters and
// covers that have no artwork yet.
//
// Each theme is one row of a static table: a palette plus a motif function.
// Drawing is fully deterministic; the same theme and size always produce the
// same pixels.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use satzwerk_core::types::Theme;

struct Palette {
    sky_top: [u8; 3],
    sky_bottom: [u8; 3],
    ground: [u8; 3],
    accent: [u8; 3],
}

type Motif = fn(&mut RgbaImage, &Palette);

struct ThemeStyle {
    theme: Theme,
    palette: Palette,
    motif: Motif,
}

static STYLES: [ThemeStyle; 6] = [
    ThemeStyle {
        theme: Theme::Adventure,
        palette: Palette {
            sky_top: [240, 150, 60],
            sky_bottom: [250, 215, 140],
            ground: [120, 85, 50],
            accent: [90, 70, 80],
        },
        motif: mountains,
    },
    ThemeStyle {
        theme: Theme::Mystery,
        palette: Palette {
            sky_top: [20, 24, 48],
            sky_bottom: [60, 66, 96],
            ground: [30, 34, 40],
            accent: [235, 230, 200],
        },
        motif: moon_and_fog,
    },
    ThemeStyle {
        theme: Theme::Romance,
        palette: Palette {
            sky_top: [250, 190, 200],
            sky_bottom: [255, 230, 225],
            ground: [215, 140, 160],
            accent: [200, 40, 70],
        },
        motif: hearts,
    },
    ThemeStyle {
        theme: Theme::Fantasy,
        palette: Palette {
            sky_top: [90, 60, 150],
            sky_bottom: [180, 150, 220],
            ground: [60, 110, 70],
            accent: [170, 170, 185],
        },
        motif: castle,
    },
    ThemeStyle {
        theme: Theme::SciFi,
        palette: Palette {
            sky_top: [5, 5, 20],
            sky_bottom: [25, 20, 60],
            ground: [40, 40, 55],
            accent: [90, 200, 230],
        },
        motif: planet_and_stars,
    },
    ThemeStyle {
        theme: Theme::Nature,
        palette: Palette {
            sky_top: [120, 180, 230],
            sky_bottom: [200, 230, 245],
            ground: [90, 150, 70],
            accent: [40, 100, 50],
        },
        motif: trees,
    },
];

fn style(theme: Theme) -> &'static ThemeStyle {
    STYLES
        .iter()
        .find(|style| style.theme == theme)
        .unwrap_or(&STYLES[5])
}

/// Draw the placeholder scene for `theme` at `width` x `height` pixels.
pub fn draw_placeholder(theme: Theme, width: u32, height: u32) -> RgbaImage {
    let (width, height) = (width.max(1), height.max(1));
    let style = style(theme);
    let palette = &style.palette;

    let mut canvas = RgbaImage::from_fn(width, height, |_, y| {
        let t = y as f32 / height as f32;
        rgba(mix(palette.sky_top, palette.sky_bottom, t))
    });

    let horizon = horizon(&canvas);
    fill_rect(&mut canvas, 0, horizon, width, height - horizon, palette.ground);
    (style.motif)(&mut canvas, palette);
    canvas
}

// -- Drawing helpers ----------------------------------------------------------

fn rgba(rgb: [u8; 3]) -> Rgba<u8> {
    Rgba([rgb[0], rgb[1], rgb[2], 255])
}

fn mix(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let lerp = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    [lerp(a[0], b[0]), lerp(a[1], b[1]), lerp(a[2], b[2])]
}

/// Two thirds of the way down.
fn horizon(canvas: &RgbaImage) -> u32 {
    canvas.height() * 2 / 3
}

fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, rgb: [u8; 3]) {
    if width == 0 || height == 0 {
        return;
    }
    draw_filled_rect_mut(
        canvas,
        Rect::at(x as i32, y as i32).of_size(width, height),
        rgba(rgb),
    );
}

fn triangle(canvas: &mut RgbaImage, apex: (i32, i32), half_base: i32, base_y: i32, rgb: [u8; 3]) {
    if half_base <= 0 || base_y <= apex.1 {
        return;
    }
    let points = [
        Point::new(apex.0, apex.1),
        Point::new(apex.0 + half_base, base_y),
        Point::new(apex.0 - half_base, base_y),
    ];
    draw_polygon_mut(canvas, &points, rgba(rgb));
}

fn circle(canvas: &mut RgbaImage, center: (i32, i32), radius: i32, rgb: [u8; 3]) {
    if radius > 0 {
        draw_filled_circle_mut(canvas, center, radius, rgba(rgb));
    }
}

/// Small deterministic sequence for scattering stars.
fn scatter(seed: u32, count: usize, width: u32, height: u32) -> Vec<(i32, i32)> {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let x = state % width.max(1);
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let y = state % height.max(1);
            (x as i32, y as i32)
        })
        .collect()
}

// -- Motifs -------------------------------------------------------------------

fn mountains(canvas: &mut RgbaImage, palette: &Palette) {
    let (w, h) = (canvas.width() as i32, horizon(canvas) as i32);
    triangle(canvas, (w / 4, h / 3), w / 3, h, palette.accent);
    triangle(canvas, (w * 2 / 3, h / 5), w * 2 / 5, h, mix(palette.accent, [0, 0, 0], 0.2));
    let snow = [245, 245, 250];
    triangle(canvas, (w * 2 / 3, h / 5), w / 14, h / 5 + h / 8, snow);
}

fn moon_and_fog(canvas: &mut RgbaImage, palette: &Palette) {
    let (w, h) = (canvas.width(), canvas.height());
    let radius = (w.min(h) / 8) as i32;
    circle(canvas, ((w * 3 / 4) as i32, (h / 5) as i32), radius, palette.accent);
    let fog = mix(palette.sky_bottom, [200, 200, 210], 0.5);
    let band = (h / 30).max(1);
    for i in 0..3 {
        let y = horizon(canvas).saturating_sub(band * (2 * i + 1));
        let inset = w / 10 * i;
        fill_rect(canvas, inset, y, w.saturating_sub(2 * inset), band, fog);
    }
}

fn hearts(canvas: &mut RgbaImage, palette: &Palette) {
    let (w, h) = (canvas.width() as i32, canvas.height() as i32);
    for (cx, cy, size) in [(w / 2, h / 3, w.min(h) / 6), (w / 5, h / 5, w.min(h) / 12)] {
        let lobe = size / 2;
        circle(canvas, (cx - lobe, cy), lobe, palette.accent);
        circle(canvas, (cx + lobe, cy), lobe, palette.accent);
        if size > 0 {
            let points = [
                Point::new(cx - size, cy + lobe / 3),
                Point::new(cx + size, cy + lobe / 3),
                Point::new(cx, cy + size + lobe / 2),
            ];
            draw_polygon_mut(canvas, &points, rgba(palette.accent));
        }
    }
}

fn castle(canvas: &mut RgbaImage, palette: &Palette) {
    let (w, h) = (canvas.width(), horizon(canvas));
    let tower = (w / 10).max(1);
    let wall_top = h - h / 4;
    fill_rect(canvas, w / 4, wall_top, w / 2, h - wall_top, palette.accent);
    for x in [w / 4 - tower / 2, w / 2 - tower / 2, w * 3 / 4 - tower / 2] {
        let top = h / 3;
        fill_rect(canvas, x, top, tower, h - top, palette.accent);
        let roof = mix(palette.sky_top, [0, 0, 0], 0.3);
        let apex = ((x + tower / 2) as i32, (top - h / 8) as i32);
        triangle(canvas, apex, (tower / 2 + 2) as i32, top as i32, roof);
    }
}

fn planet_and_stars(canvas: &mut RgbaImage, palette: &Palette) {
    let (w, h) = (canvas.width(), horizon(canvas));
    for (x, y) in scatter(w ^ (h << 16), 60, w, h) {
        circle(canvas, (x, y), 1, [250, 250, 255]);
    }
    let radius = (w.min(h) / 5) as i32;
    circle(canvas, ((w / 3) as i32, (h / 2) as i32), radius, palette.accent);
    let ring = mix(palette.accent, [255, 255, 255], 0.5);
    let band = (radius / 6).max(1) as u32;
    fill_rect(
        canvas,
        (w / 3).saturating_sub(radius as u32 * 3 / 2),
        (h / 2).saturating_sub(band / 2),
        radius as u32 * 3,
        band,
        ring,
    );
}

fn trees(canvas: &mut RgbaImage, palette: &Palette) {
    let (w, h) = (canvas.width(), horizon(canvas));
    let trunk = [100, 70, 40];
    for i in 1..=4u32 {
        let cx = w * i / 5;
        let crown = (w / 12).max(2);
        let top = h / 3 + (i % 2) * h / 10;
        fill_rect(canvas, cx.saturating_sub(crown / 4), h - h / 8, (crown / 2).max(1), h / 8, trunk);
        triangle(
            canvas,
            (cx as i32, top as i32),
            crown as i32,
            (h - h / 8) as i32,
            palette.accent,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Theme; 6] = [
        Theme::Adventure,
        Theme::Mystery,
        Theme::Romance,
        Theme::Fantasy,
        Theme::SciFi,
        Theme::Nature,
    ];

    #[test]
    fn every_theme_has_a_style() {
        for theme in ALL {
            assert_eq!(style(theme).theme, theme);
        }
    }

    #[test]
    fn drawing_is_deterministic() {
        for theme in ALL {
            assert_eq!(
                draw_placeholder(theme, 120, 90),
                draw_placeholder(theme, 120, 90)
            );
        }
    }

    #[test]
    fn themes_look_different() {
        let adventure = draw_placeholder(Theme::Adventure, 80, 60);
        let scifi = draw_placeholder(Theme::SciFi, 80, 60);
        assert_ne!(adventure, scifi);
    }

    #[test]
    fn degenerate_sizes_do_not_panic() {
        for theme in ALL {
            for (w, h) in [(0, 0), (1, 1), (3, 200), (200, 3)] {
                let image = draw_placeholder(theme, w, h);
                assert_eq!(image.dimensions(), (w.max(1), h.max(1)));
            }
        }
    }

    #[test]
    fn sky_is_opaque() {
        let image = draw_placeholder(Theme::Nature, 50, 50);
        assert!(image.pixels().all(|p| p.0[3] == 255));
    }
}
