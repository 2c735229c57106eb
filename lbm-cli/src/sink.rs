use anyhow::Context;
use image::{Rgb, RgbImage};
use lbm_core::Comparison;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Presentation output for a finished run. Nothing here feeds back into the
/// solver.
pub trait ProfileSink {
    fn write(&mut self, profile: &Comparison) -> anyhow::Result<()>;
}

pub fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    Ok(())
}

// ---- CSV ----

pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        CsvSink {
            path: path.as_ref().to_path_buf(),
        }
    }
}

pub fn write_csv<W: Write>(w: &mut W, profile: &Comparison) -> std::io::Result<()> {
    writeln!(w, "x,lbm,analytical,abs_error")?;
    for i in 0..profile.x.len() {
        writeln!(
            w,
            "{},{},{},{}",
            profile.x[i], profile.simulated[i], profile.analytical[i], profile.abs_error[i]
        )?;
    }
    Ok(())
}

impl ProfileSink for CsvSink {
    fn write(&mut self, profile: &Comparison) -> anyhow::Result<()> {
        ensure_parent(&self.path)?;
        let file = File::create(&self.path)
            .with_context(|| format!("creating {}", self.path.display()))?;
        let mut w = BufWriter::new(file);
        write_csv(&mut w, profile)?;
        w.flush()?;
        Ok(())
    }
}

// ---- PNG line plot ----

const WIDTH: u32 = 800;
const HEIGHT: u32 = 500;
const MARGIN: u32 = 40;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const SIMULATED: Rgb<u8> = Rgb([31, 119, 180]);
const ANALYTICAL: Rgb<u8> = Rgb([214, 39, 40]);

/// Temperature vs x: simulated profile solid blue, analytical dashed red,
/// legend swatches in the top right corner.
pub struct PngPlot {
    path: PathBuf,
}

impl PngPlot {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        PngPlot {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ProfileSink for PngPlot {
    fn write(&mut self, profile: &Comparison) -> anyhow::Result<()> {
        ensure_parent(&self.path)?;
        render(profile)
            .save(&self.path)
            .with_context(|| format!("saving plot {}", self.path.display()))?;
        Ok(())
    }
}

struct Frame {
    t_min: f64,
    t_max: f64,
}

impl Frame {
    fn new(profile: &Comparison) -> Frame {
        let mut t_min = f64::INFINITY;
        let mut t_max = f64::NEG_INFINITY;
        for &v in profile.simulated.iter().chain(&profile.analytical) {
            if v.is_finite() {
                t_min = t_min.min(v);
                t_max = t_max.max(v);
            }
        }
        if !(t_min.is_finite() && t_max.is_finite()) {
            t_min = 0.0;
            t_max = 1.0;
        }
        if t_max - t_min < 1e-12 {
            t_min -= 0.5;
            t_max += 0.5;
        }
        Frame { t_min, t_max }
    }

    fn px(&self, x: f64) -> f64 {
        MARGIN as f64 + x.clamp(0.0, 1.0) * (WIDTH - 2 * MARGIN) as f64
    }

    fn py(&self, t: f64) -> f64 {
        let s = ((t - self.t_min) / (self.t_max - self.t_min)).clamp(0.0, 1.0);
        (HEIGHT - MARGIN) as f64 - s * (HEIGHT - 2 * MARGIN) as f64
    }
}

pub fn render(profile: &Comparison) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);
    let frame = Frame::new(profile);

    // 10x10 grid
    for k in 0..=10 {
        let gx = frame.px(k as f64 / 10.0);
        let gy = (HEIGHT - MARGIN) as f64 - k as f64 / 10.0 * (HEIGHT - 2 * MARGIN) as f64;
        line(&mut img, (gx, MARGIN as f64), (gx, (HEIGHT - MARGIN) as f64), GRID, None);
        line(&mut img, (MARGIN as f64, gy), ((WIDTH - MARGIN) as f64, gy), GRID, None);
    }
    let (x0, y0) = (MARGIN as f64, (HEIGHT - MARGIN) as f64);
    line(&mut img, (x0, y0), ((WIDTH - MARGIN) as f64, y0), AXIS, None);
    line(&mut img, (x0, y0), (x0, MARGIN as f64), AXIS, None);

    polyline(&mut img, &frame, &profile.x, &profile.analytical, ANALYTICAL, Some(8));
    polyline(&mut img, &frame, &profile.x, &profile.simulated, SIMULATED, None);

    // legend: simulated on top, analytical below
    let lx = (WIDTH - MARGIN - 60) as f64;
    let ly = (MARGIN + 15) as f64;
    for dy in 0..2 {
        let d = dy as f64;
        line(&mut img, (lx, ly + d), (lx + 40.0, ly + d), SIMULATED, None);
        line(&mut img, (lx, ly + 15.0 + d), (lx + 40.0, ly + 15.0 + d), ANALYTICAL, Some(8));
    }

    img
}

fn polyline(
    img: &mut RgbImage,
    frame: &Frame,
    xs: &[f64],
    ts: &[f64],
    color: Rgb<u8>,
    dash: Option<u32>,
) {
    for (x, t) in xs.windows(2).zip(ts.windows(2)) {
        let a = (frame.px(x[0]), frame.py(t[0]));
        let b = (frame.px(x[1]), frame.py(t[1]));
        // two pixels thick
        line(img, a, b, color, dash);
        line(img, (a.0, a.1 + 1.0), (b.0, b.1 + 1.0), color, dash);
    }
}

/// DDA line. `dash` draws `n` pixels on, `n` off.
fn line(img: &mut RgbImage, a: (f64, f64), b: (f64, f64), color: Rgb<u8>, dash: Option<u32>) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
    for s in 0..=steps {
        if let Some(n) = dash {
            if (s / n) % 2 == 1 {
                continue;
            }
        }
        let f = s as f64 / steps as f64;
        let x = (a.0 + f * dx).round();
        let y = (a.1 + f * dy).round();
        if x >= 0.0 && y >= 0.0 && (x as u32) < img.width() && (y as u32) < img.height() {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn linear(nx: usize) -> Comparison {
        let t: Vec<f64> = (0..nx)
            .map(|p| 100.0 * (1.0 - p as f64 / (nx - 1) as f64))
            .collect();
        Comparison::new(&t, 100.0, 0.0).unwrap()
    }

    #[test]
    fn csv_has_header_and_one_row_per_point() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &linear(5)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "x,lbm,analytical,abs_error");
        assert_eq!(lines[1], "0,100,100,0");
        assert_eq!(lines[5], "1,0,0,0");
    }

    #[test]
    fn plot_draws_curve_endpoints() {
        let img = render(&linear(11));
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
        // the simulated curve is drawn last, so it owns the shared endpoints
        assert_eq!(*img.get_pixel(MARGIN, MARGIN), SIMULATED);
        assert_eq!(*img.get_pixel(WIDTH - MARGIN, HEIGHT - MARGIN), SIMULATED);
        assert_eq!(*img.get_pixel(1, 1), BACKGROUND);
    }

    #[test]
    fn flat_profile_does_not_divide_by_zero() {
        let c = Comparison::new(&[5.0, 5.0, 5.0], 5.0, 5.0).unwrap();
        let img = render(&c);
        let mid_y = HEIGHT / 2;
        assert_eq!(*img.get_pixel(WIDTH / 2, mid_y), SIMULATED);
    }

    #[test]
    fn csv_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/profile.csv");
        CsvSink::new(&path).write(&linear(3)).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 4);
    }
}
