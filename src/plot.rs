//! Diagnostic SVG rendering of a grain waveform.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

const WIDTH: f32 = 1200.0;
const HEIGHT: f32 = 400.0;
const MARGIN: f32 = 20.0;
const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Renders `samples` as an SVG line plot with a zero axis.
///
/// The vertical axis is fixed to [-1, 1]; values outside are clamped to the
/// plot area.
pub fn render_svg(samples: &[f32], title: &str) -> String {
    let plot_width = WIDTH - 2.0 * MARGIN;
    let plot_height = HEIGHT - 2.0 * MARGIN;
    let mid_y = MARGIN + plot_height / 2.0;
    let step = if samples.len() > 1 {
        plot_width / (samples.len() - 1) as f32
    } else {
        0.0
    };

    let mut points = String::with_capacity(samples.len() * 16);
    for (i, &sample) in samples.iter().enumerate() {
        let x = MARGIN + i as f32 * step;
        let y = mid_y - sample.clamp(-1.0, 1.0) * plot_height / 2.0;
        if i > 0 {
            points.push(' ');
        }
        let _ = write!(points, "{:.2},{:.2}", x, y);
    }

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="{ns}" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        ns = SVG_NAMESPACE,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = writeln!(svg, "<title>{}</title>", escape(title));
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r##"<line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="#bbbbbb" stroke-width="1"/>"##,
        x1 = MARGIN,
        x2 = WIDTH - MARGIN,
        y = mid_y
    );
    let _ = writeln!(
        svg,
        r##"<polyline fill="none" stroke="#1f77b4" stroke-width="1.5" points="{}"/>"##,
        points
    );
    svg.push_str("</svg>\n");
    svg
}

/// Renders `samples` and writes the SVG to `path`.
pub fn write_plot(path: &Path, samples: &[f32], title: &str) -> io::Result<()> {
    fs::write(path, render_svg(samples, title))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
