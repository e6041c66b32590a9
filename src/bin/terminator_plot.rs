use clap::{Parser, ValueEnum};
use csv::ReaderBuilder;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render terminator points from a termpt CSV as an orthographic view"
)]
struct Cli {
    #[arg(long)]
    input: PathBuf,
    #[arg(long, default_value = "artifacts/terminator.png")]
    output: PathBuf,
    /// Body-fixed axis the view looks along
    #[arg(long, value_enum, default_value_t = View::Z)]
    view: View,
    #[arg(long, default_value_t = 900)]
    width: u32,
    #[arg(long, default_value_t = 900)]
    height: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum View {
    X,
    Y,
    Z,
}

impl View {
    /// Indices of the horizontal and vertical plot axes.
    fn axes(self) -> (usize, usize) {
        match self {
            View::X => (1, 2),
            View::Y => (2, 0),
            View::Z => (0, 1),
        }
    }

    fn labels(self) -> (&'static str, &'static str) {
        match self {
            View::X => ("y (km)", "z (km)"),
            View::Y => ("z (km)", "x (km)"),
            View::Z => ("x (km)", "y (km)"),
        }
    }
}

#[derive(Debug, Clone)]
struct Sample {
    cut: usize,
    position: [f64; 3],
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (samples, epoch_label) = read_samples(&cli.input)?;
    if samples.is_empty() {
        return Err(anyhow::anyhow!("No terminator points in the provided CSV"));
    }

    let (h, v) = cli.view.axes();
    let extent = samples
        .iter()
        .flat_map(|s| [s.position[h].abs(), s.position[v].abs()])
        .fold(0.0_f64, f64::max)
        .max(f64::MIN_POSITIVE)
        * 1.1;
    let cut_count = samples.iter().map(|s| s.cut).max().unwrap_or(0) + 1;

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let output_str = cli
        .output
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Output path contains invalid UTF-8"))?;
    let root = BitMapBackend::new(output_str, (cli.width, cli.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 16.0, FontStyle::Normal);
    let caption = match &epoch_label {
        Some(epoch) => format!("Terminator points, {epoch}"),
        None => "Terminator points".to_string(),
    };

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(caption, caption_font)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-extent..extent, -extent..extent)?;

    let (x_desc, y_desc) = cli.view.labels();
    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style(label_font.clone())
        .axis_desc_style(label_font)
        .x_label_formatter(&|v| format!("{v:.1}"))
        .y_label_formatter(&|v| format!("{v:.1}"))
        .draw()?;

    // Outermost point of each cut, in cut order, traces the limb of the
    // shadow boundary.
    let mut outline: Vec<(f64, f64)> = Vec::new();
    let mut last_cut = None;
    for sample in &samples {
        if last_cut != Some(sample.cut) {
            outline.push((sample.position[h], sample.position[v]));
            last_cut = Some(sample.cut);
        }
    }
    if outline.len() > 2 {
        outline.push(outline[0]);
    }
    if outline.len() > 1 {
        chart.draw_series(std::iter::once(PathElement::new(
            outline,
            ShapeStyle::from(&BLACK.mix(0.4)).stroke_width(1),
        )))?;
    }

    chart.draw_series(samples.iter().map(|sample| {
        let t = sample.cut as f64 / cut_count.max(2).saturating_sub(1) as f64;
        Circle::new(
            (sample.position[h], sample.position[v]),
            3,
            jet_color(t).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

fn read_samples(path: &Path) -> anyhow::Result<(Vec<Sample>, Option<String>)> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow::anyhow!("CSV missing '{name}' column"))
    };
    let cut_idx = column("cut")?;
    let coord_idx = [column("x_km")?, column("y_km")?, column("z_km")?];
    let epoch_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("target_tdb"));

    let mut samples = Vec::new();
    let mut epoch_label = None;
    for rec in rdr.records() {
        let r = rec?;
        let Some(cut) = r.get(cut_idx).and_then(|v| v.trim().parse::<usize>().ok()) else {
            continue;
        };
        let mut position = [f64::NAN; 3];
        for (slot, idx) in position.iter_mut().zip(coord_idx) {
            *slot = r.get(idx).unwrap_or("").trim().parse().unwrap_or(f64::NAN);
        }
        if !position.iter().all(|c| c.is_finite()) {
            continue;
        }
        if epoch_label.is_none() {
            epoch_label = epoch_idx.and_then(|idx| r.get(idx)).map(str::to_string);
        }
        samples.push(Sample { cut, position });
    }
    Ok((samples, epoch_label))
}

fn jet_color(t_in: f64) -> RGBColor {
    let t = t_in.clamp(0.0, 1.0);
    fn comp(v: f64) -> f64 {
        (1.0 - (v - 1.0).abs()).clamp(0.0, 1.0)
    }
    let r = comp(1.5 - 4.0 * (t - 0.75).abs());
    let g = comp(1.5 - 4.0 * (t - 0.5).abs());
    let b = comp(1.5 - 4.0 * (t - 0.25).abs());
    RGBColor((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}
