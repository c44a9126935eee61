//! Startup banner: figlet "EVENT BOARD", shaded pink to cyan top to bottom.

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{self, Write, stdout};
use tracing::debug;

const TITLE: &str = "EVENT BOARD";
const TAGLINE: &str = "time spent, per workspace";

type Rgb = (u8, u8, u8);

const NEON_PINK: Rgb = (0xff, 0x2e, 0x97);
const CYBER_CYAN: Rgb = (0x0f, 0xf0, 0xfc);

fn lerp_rgb(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let mix = |x: u8, y: u8| (f64::from(x) * (1.0 - t) + f64::from(y) * t).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn rgb((r, g, b): Rgb) -> Color {
    Color::Rgb { r, g, b }
}

/// Built-in figlet font; plain title if it cannot be loaded.
fn render_title() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert(TITLE).map(|figure| figure.to_string()))
        .unwrap_or_else(|| TITLE.to_string())
}

/// Non-blank lines of `art`, each paired with its gradient stop.
fn shade(art: &str) -> Vec<(Rgb, &str)> {
    let lines: Vec<&str> = art.lines().filter(|l| !l.trim().is_empty()).collect();
    let last = lines.len().saturating_sub(1).max(1) as f64;
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| (lerp_rgb(NEON_PINK, CYBER_CYAN, i as f64 / last), line))
        .collect()
}

fn write_banner(out: &mut impl Write) -> io::Result<()> {
    let art = render_title();
    for (color, line) in shade(&art) {
        queue!(out, SetForegroundColor(rgb(color)), Print(line), Print("\r\n"))?;
    }
    queue!(
        out,
        SetForegroundColor(rgb(CYBER_CYAN)),
        Print(format!("v{}  {}\r\n", env!("CARGO_PKG_VERSION"), TAGLINE)),
        ResetColor
    )?;
    out.flush()
}

pub fn print_welcome() {
    if let Err(e) = write_banner(&mut stdout()) {
        debug!(error = %e, "banner not printed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(lerp_rgb(NEON_PINK, CYBER_CYAN, 0.0), NEON_PINK);
        assert_eq!(lerp_rgb(NEON_PINK, CYBER_CYAN, 1.0), CYBER_CYAN);
    }

    #[test]
    fn test_shade_runs_pink_to_cyan_skipping_blank_lines() {
        let shaded = shade("top\n   \nmiddle\nbottom\n");
        let lines: Vec<&str> = shaded.iter().map(|(_, l)| *l).collect();
        assert_eq!(lines, vec!["top", "middle", "bottom"]);
        assert_eq!(shaded[0].0, NEON_PINK);
        assert_eq!(shaded[2].0, CYBER_CYAN);
        assert_eq!(shade("solo")[0].0, NEON_PINK);
    }

    #[test]
    fn test_banner_ends_with_tagline() {
        let mut buf = Vec::new();
        write_banner(&mut buf).unwrap();
        let text = String::from_utf8_lossy(&buf);
        assert!(text.lines().count() > 2);
        assert!(text.contains(TAGLINE));
    }
}
