use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::{GrayImage, Rgb, RgbImage};
use nalgebra::DMatrix;
use rw_core::Image;
use rw_warp::{Affine, Resize, Warp};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "rw_gallery")]
#[command(about = "Run raster-warp operations on external image files")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(name = "warp")]
    Warp(WarpArgs),
    #[command(name = "resize")]
    Resize(ResizeArgs),
    #[command(name = "crop")]
    Crop(CropArgs),
    #[command(name = "greyscale")]
    Greyscale(GreyscaleArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "out")]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct WarpArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Forward affine as 6 row-major values in (row, col) coordinates:
    /// m00,m01,t0,m10,m11,t1
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    matrix: Vec<f32>,
    #[arg(long)]
    rows: Option<usize>,
    #[arg(long)]
    cols: Option<usize>,
    #[arg(long)]
    batch_size: Option<usize>,
}

#[derive(Args, Debug, Clone)]
struct ResizeArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, required = true)]
    rows: usize,
    #[arg(long, required = true)]
    cols: usize,
}

#[derive(Args, Debug, Clone)]
struct CropArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Inclusive minimum corner: row,col
    #[arg(long, value_delimiter = ',')]
    min: Vec<usize>,
    /// Exclusive maximum corner: row,col
    #[arg(long, value_delimiter = ',')]
    max: Vec<usize>,
}

#[derive(Args, Debug, Clone)]
struct GreyscaleArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Clone, Serialize)]
struct MetaWarp {
    matrix: Vec<f32>,
    dest_shape: [usize; 2],
    batch_size: Option<usize>,
    interpolation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct MetaResize {
    from: [usize; 2],
    to: [usize; 2],
}

#[derive(Debug, Clone, Serialize)]
struct MetaCrop {
    min: [usize; 2],
    max: [usize; 2],
}

#[derive(Debug, Clone, Serialize)]
struct MetaGreyscale {
    weights: &'static str,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Warp(args) => run_warp(args),
        Command::Resize(args) => run_resize(args),
        Command::Crop(args) => run_crop(args),
        Command::Greyscale(args) => run_greyscale(args),
    }
}

fn run_warp(args: WarpArgs) -> Result<()> {
    let out_dir = prepare_out_dir(&args.common)?;
    let img = load_rgb(&args.common.input)?;
    let [src_rows, src_cols] = shape_2d(&img)?;

    let m = &args.matrix;
    if m.len() != 6 {
        bail!("--matrix needs 6 comma-separated values, got {}", m.len());
    }
    let transform = Affine::from_matrix(DMatrix::from_row_slice(
        3,
        3,
        &[m[0], m[1], m[2], m[3], m[4], m[5], 0.0, 0.0, 1.0],
    ));

    let rows = args.rows.unwrap_or(src_rows);
    let cols = args.cols.unwrap_or(src_cols);
    let warped = img
        .warp_to_shape([rows, cols], &transform, args.batch_size)
        .context("warp failed")?;

    save_rgb(out_dir.join("warped.png"), &warped)?;
    write_json(
        out_dir.join("meta.json"),
        &MetaWarp {
            matrix: args.matrix.clone(),
            dest_shape: [rows, cols],
            batch_size: args.batch_size,
            interpolation: "linear, zero extension",
        },
    )?;

    Ok(())
}

fn run_resize(args: ResizeArgs) -> Result<()> {
    let out_dir = prepare_out_dir(&args.common)?;
    let img = load_rgb(&args.common.input)?;
    let from = shape_2d(&img)?;

    let resized = img.resize([args.rows, args.cols]).context("resize failed")?;

    save_rgb(out_dir.join("resized.png"), &resized)?;
    write_json(
        out_dir.join("meta.json"),
        &MetaResize {
            from,
            to: [args.rows, args.cols],
        },
    )?;

    Ok(())
}

fn run_crop(args: CropArgs) -> Result<()> {
    let out_dir = prepare_out_dir(&args.common)?;
    let img = load_rgb(&args.common.input)?;

    if args.min.len() != 2 || args.max.len() != 2 {
        bail!("--min and --max each need 2 comma-separated values");
    }
    let cropped = img
        .crop(&args.min, &args.max)
        .context("crop region outside the image")?;

    save_rgb(out_dir.join("cropped.png"), &cropped)?;
    write_json(
        out_dir.join("meta.json"),
        &MetaCrop {
            min: [args.min[0], args.min[1]],
            max: [args.max[0], args.max[1]],
        },
    )?;

    Ok(())
}

fn run_greyscale(args: GreyscaleArgs) -> Result<()> {
    let out_dir = prepare_out_dir(&args.common)?;
    let img = load_rgb(&args.common.input)?;

    let grey = img.as_greyscale().context("greyscale conversion failed")?;

    save_grey(out_dir.join("grey.png"), &grey)?;
    write_json(
        out_dir.join("meta.json"),
        &MetaGreyscale {
            weights: "Rec. 601 (0.299, 0.587, 0.114)",
        },
    )?;

    Ok(())
}

fn prepare_out_dir(common: &CommonArgs) -> Result<PathBuf> {
    fs::create_dir_all(&common.out)
        .with_context(|| format!("create output directory {}", common.out.display()))?;
    Ok(common.out.clone())
}

fn load_rgb(path: &Path) -> Result<Image> {
    let img = image::open(path)
        .with_context(|| format!("open input image {}", path.display()))?
        .to_rgb8();

    let (width, height) = img.dimensions();
    let data: Vec<f32> = img.as_raw().iter().map(|&v| v as f32).collect();
    Image::from_vec([height as usize, width as usize], 3, data)
        .context("decoded image has inconsistent dimensions")
}

fn shape_2d(img: &Image) -> Result<[usize; 2]> {
    let dims = img.shape().dims();
    if dims.len() != 2 {
        bail!("expected a planar image, got {} axes", dims.len());
    }
    Ok([dims[0], dims[1]])
}

fn save_rgb(path: PathBuf, img: &Image) -> Result<()> {
    let [rows, cols] = shape_2d(img)?;
    if img.n_channels() != 3 {
        bail!("expected 3 channels, got {}", img.n_channels());
    }

    let mut out = RgbImage::new(cols as u32, rows as u32);
    for r in 0..rows {
        for c in 0..cols {
            let px = &img.pixels()[(r * cols + c) * 3..(r * cols + c) * 3 + 3];
            out.put_pixel(
                c as u32,
                r as u32,
                Rgb([to_u8(px[0]), to_u8(px[1]), to_u8(px[2])]),
            );
        }
    }
    out.save(&path)
        .with_context(|| format!("save {}", path.display()))
}

fn save_grey(path: PathBuf, img: &Image) -> Result<()> {
    let [rows, cols] = shape_2d(img)?;
    if img.n_channels() != 1 {
        bail!("expected 1 channel, got {}", img.n_channels());
    }

    let mut out = GrayImage::new(cols as u32, rows as u32);
    for r in 0..rows {
        for c in 0..cols {
            out.put_pixel(c as u32, r as u32, image::Luma([to_u8(img.pixels()[r * cols + c])]));
        }
    }
    out.save(&path)
        .with_context(|| format!("save {}", path.display()))
}

fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn write_json<T: Serialize>(path: PathBuf, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value).context("serialize metadata")?;
    fs::write(&path, body).with_context(|| format!("write {}", path.display()))
}
