//! Neon ASCII banner with gradient (WORKGROUP HUB).

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Chalkboard green (#2ecc71).
const CHALK_GREEN: (u8, u8, u8) = (0x2e, 0xcc, 0x71);
/// Pencil yellow (#f9d423).
const PENCIL_YELLOW: (u8, u8, u8) = (0xf9, 0xd4, 0x23);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Banner art lines. Falls back to plain text if the figlet font cannot render.
fn banner_lines(text: &str) -> Vec<String> {
    let Ok(font) = FIGfont::standard() else {
        return vec![text.to_string()];
    };
    match font.convert(text) {
        Some(figure) => figure.to_string().lines().map(str::to_string).collect(),
        None => vec![text.to_string()],
    }
}

/// Prints the welcome banner with a green-to-yellow gradient, then the version.
pub fn print_welcome() {
    let mut out = stdout();
    let lines = banner_lines("WG HUB");
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(CHALK_GREEN, PENCIL_YELLOW, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: PENCIL_YELLOW.0,
        g: PENCIL_YELLOW.1,
        b: PENCIL_YELLOW.2,
    }));
    let _ = out.execute(Print(format!("v{}  student work groups\r\n", version)));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
