//! End-to-end figure workflows: build, finalize, render and save.
//!
//! Run: cargo test --test figure_workflow_test

#![allow(clippy::unwrap_used)]

use std::fs;
use std::io::Cursor;

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use trueno_figure::backend::{Artifact, RasterBackend, RenderBackend, SvgBackend};
use trueno_figure::color::Rgba;
use trueno_figure::config::FigureConfig;
use trueno_figure::error::Error;
use trueno_figure::figure::{Figure, LineSpec};
use trueno_figure::layout::{shared_grid, CellRequest, GridSpec, OuterMargins};
use trueno_figure::series::DataSeries;
use trueno_figure::style::{AxisSelector, Options, Scope, SeriesStyle};

fn two_panel_figure(name: &str) -> Figure {
    let mut fig = Figure::with_name(name, GridSpec::new(2, 1).size(400, 200)).unwrap();
    fig.define_plot(CellRequest::Next, Options::new().with("title", "spectrum"))
        .unwrap();
    let h = DataSeries::uniform_histogram("spectrum", 0.0, 10.0, &[0.0, 2.0, 5.0, 9.0, 4.0, 1.0, 0.0])
        .unwrap()
        .with_errors(&[0.0, 1.4, 2.2, 3.0, 2.0, 1.0, 0.0])
        .unwrap()
        .with_axis_titles("E [GeV]", "events");
    fig.add_series(&h, None, Some("data")).unwrap();

    fig.define_plot(CellRequest::Next, Options::new().with("y_log", true))
        .unwrap();
    let decay = DataSeries::function("decay", |t| (-t).exp(), (0.0, 5.0)).unwrap();
    let points = DataSeries::graph("points", &[0.5, 1.5, 2.5, 3.5], &[0.6, 0.22, 0.08, 0.03]).unwrap();
    fig.set_series(&[decay, points], &["model", "measured"]).unwrap();
    fig.add_line(LineSpec::horizontal(0.1)).unwrap();
    fig.add_text("fit", 0.1, 0.1, 0.04).unwrap();
    fig
}

fn decode_png(bytes: &[u8]) -> (u32, u32, Vec<u8>) {
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    buf.truncate(info.buffer_size());
    (info.width, info.height, buf)
}

// ============================================================================
// Saving
// ============================================================================

#[test]
fn test_save_png_is_decodable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("panels.png");
    two_panel_figure("png_fig").finalize().unwrap().save(&path).unwrap();

    let bytes = fs::read(&path).unwrap();
    let (width, height, pixels) = decode_png(&bytes);
    assert_eq!((width, height), (400, 200));
    assert_eq!(pixels.len(), 400 * 200 * 4);
    let white = Rgba::WHITE.to_array();
    let drawn = pixels.chunks_exact(4).filter(|p| *p != white).count();
    assert!(drawn > 500, "only {drawn} non-white pixels");
}

#[test]
fn test_save_svg_is_well_formed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("panels.SVG");
    two_panel_figure("svg_fig").finalize().unwrap().save(&path).unwrap();

    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert_eq!(svg.matches("<g ").count(), svg.matches("</g>").count());
    assert!(svg.contains("svg_fig_pad_0_0"));
    assert!(svg.contains("svg_fig_pad_1_0"));
    assert!(svg.contains(">spectrum</text>"));
    assert!(svg.contains(">E [GeV]</text>"));
    assert!(svg.contains(">measured</text>"));
    assert!(svg.contains(">fit</text>"));
}

#[test]
fn test_save_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let err = two_panel_figure("pdf_fig")
        .finalize()
        .unwrap()
        .save(dir.path().join("panels.pdf"))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(ext) if ext == "pdf"));
}

#[test]
fn test_backends_share_object_names() {
    let done = two_panel_figure("names").finalize().unwrap();
    let raster = RasterBackend::new().render(&done).unwrap();
    let vector = SvgBackend::new().render(&done).unwrap();
    assert_eq!(raster.objects(), vector.objects());
    assert!(raster.objects().contains(&"decay_0".to_string()));
    assert!(raster.objects().contains(&"spectrum_0".to_string()));

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("direct.png");
    raster.save(&path).unwrap();
    assert_eq!(decode_png(&fs::read(&path).unwrap()).0, 400);
}

// ============================================================================
// Finalized geometry
// ============================================================================

#[test]
fn test_log_axis_and_series_titles() {
    let done = two_panel_figure("geom").finalize().unwrap();
    let left = &done.plots[0];
    let right = &done.plots[1];

    assert_eq!(left.title.as_deref(), Some("spectrum"));
    assert_eq!(left.x_axis.spec.title, "E [GeV]");
    assert_eq!(left.y_axis.spec.title, "events");
    assert!(left.legend.is_some());

    assert!(right.y_axis.spec.is_log);
    assert!(right.y_axis.limits.0 > 0.0);
    let legend = right.legend.as_ref().unwrap();
    let labels: Vec<&str> = legend.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, ["model", "measured"]);
    assert_eq!(right.lines.len(), 1);
    assert_eq!(right.texts.len(), 1);
    assert!(right.frame.contains(right.texts[0].position));
}

#[test]
fn test_explicit_style_survives_finalize() {
    let mut fig = Figure::new(GridSpec::new(1, 1)).unwrap();
    let style = SeriesStyle {
        line_color: Rgba::rgb(10, 20, 30),
        ..SeriesStyle::default()
    };
    let g = DataSeries::graph("g", &[0.0, 1.0], &[0.0, 1.0]).unwrap();
    fig.add_series(&g, Some(style), None).unwrap();
    let done = fig.finalize().unwrap();
    assert_eq!(done.plots[0].series[0].style.line_color, Rgba::rgb(10, 20, 30));
}

#[test]
fn test_attached_series_is_independent_copy() {
    let mut fig = Figure::new(GridSpec::new(1, 1)).unwrap();
    let mut g = DataSeries::graph("g", &[0.0, 1.0], &[0.0, 1.0]).unwrap();
    fig.add_series(&g, None, None).unwrap();
    g = g.with_axis_titles("changed", "later");
    assert_eq!(g.x_title(), Some("changed"));
    let done = fig.finalize().unwrap();
    assert_eq!(done.plots[0].series[0].series.x_title(), None);
}

// ============================================================================
// Shared grid and configuration
// ============================================================================

#[test]
fn test_shared_grid_renders() {
    let (mut fig, plots) = shared_grid(2, 2, OuterMargins::default(), (300, 300)).unwrap();
    for (i, plot) in plots.iter().enumerate() {
        let offset = i as f64;
        let g = DataSeries::graph("g", &[0.0, 1.0, 2.0], &[offset, offset + 1.0, offset + 0.5]).unwrap();
        fig.add_series_to(*plot, &g, None, None).unwrap();
    }
    let done = fig.finalize().unwrap();

    let widths: Vec<f64> = done.plots.iter().map(|p| p.frame.width()).collect();
    for w in &widths {
        assert_abs_diff_eq!(*w, widths[0], epsilon = 1e-9);
    }
    let top_right = done.plot(plots[3]).unwrap();
    let bottom_right = done.plot(plots[1]).unwrap();
    let top_left = done.plot(plots[2]).unwrap();
    assert!(top_right.x_axis.shared && top_right.y_axis.shared);
    assert_eq!(top_right.x_axis.limits, bottom_right.x_axis.limits);
    assert_eq!(top_right.y_axis.limits, top_left.y_axis.limits);

    let svg = SvgBackend::new().render(&done).unwrap().to_svg_string();
    assert_eq!(svg.matches("<g id=\"frame_").count(), 4);
}

#[test]
fn test_config_file_workflow() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("figure.yaml");
    fs::write(
        &config_path,
        "name: configured\nsize: [320, 240]\nn_cols: 2\nx_axis:\n  title: t\nlegend:\n  n_columns: 2\n",
    )
    .unwrap();

    let mut fig = FigureConfig::load(&config_path).unwrap().into_figure().unwrap();
    fig.define_plot(CellRequest::Next, Options::new()).unwrap();
    let a = DataSeries::function("a", |x| x, (0.0, 1.0)).unwrap();
    let b = DataSeries::function("b", |x| 1.0 - x, (0.0, 1.0)).unwrap();
    fig.set_series(&[a, b], &["up", "down"]).unwrap();
    fig.axes(Scope::CurrentPlot, AxisSelector::Y, Options::new().with("title", "level"))
        .unwrap();

    let done = fig.finalize().unwrap();
    assert_eq!(done.name, "configured");
    assert_eq!(done.size, (320, 240));
    let plot = &done.plots[0];
    assert_eq!(plot.x_axis.spec.title, "t");
    assert_eq!(plot.y_axis.spec.title, "level");
    assert_eq!(plot.legend.as_ref().unwrap().n_columns, 2);
    assert_eq!(done.plots.len(), 1);

    let out = dir.path().join("configured.png");
    done.save(&out).unwrap();
    assert_eq!(decode_png(&fs::read(&out).unwrap()).1, 240);
}
