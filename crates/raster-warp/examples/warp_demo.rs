//! Rotates a synthetic gradient image about its center and reports how much
//! of the masked result stays defined.

use nalgebra::DMatrix;
use raster_warp::{Affine, Interpolation, MaskedImage, Resize, Warp};

fn main() {
    let rows = 64usize;
    let cols = 64usize;

    let mut src = MaskedImage::init_blank([rows, cols], 1, 0.0);
    for r in 0..rows {
        for c in 0..cols {
            src.set(&[r, c], 0, (r + c) as f32).expect("in bounds");
        }
    }

    // rotation by 30 degrees about the image center, in (row, col) axes
    let angle = 30f32.to_radians();
    let (sin, cos) = angle.sin_cos();
    let cy = (rows - 1) as f32 / 2.0;
    let cx = (cols - 1) as f32 / 2.0;
    let to_origin = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, -cy, 0.0, 1.0, -cx, 0.0, 0.0, 1.0]);
    let rotate = DMatrix::from_row_slice(3, 3, &[cos, -sin, 0.0, sin, cos, 0.0, 0.0, 0.0, 1.0]);
    let back = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, cy, 0.0, 1.0, cx, 0.0, 0.0, 1.0]);
    let transform = Affine::from_matrix(back * rotate * to_origin);

    let warped = src
        .warp_to_shape([rows, cols], &transform, Some(1024))
        .expect("rotation is invertible");

    println!(
        "rotated {}x{}: {} of {} pixels defined",
        rows,
        cols,
        warped.n_true_pixels(),
        rows * cols
    );

    let center = warped
        .sample(&[cy, cx], Interpolation::Linear)
        .expect("center stays defined");
    println!("value at center: {:.3}", center.point(0)[0]);

    let thumb = warped.resize([16, 16]).expect("valid resize");
    println!(
        "16x16 thumbnail keeps {} defined pixels",
        thumb.n_true_pixels()
    );
}
