use image::{Rgb, RgbImage};
use ndarray::{Array2, ArrayView2, Zip};
use num_complex::Complex64;
use palette::white_point::D65;
use palette::{Lch, Srgb};
use rs_propagate::{Field, Pitch, Propagator};
use std::f64::consts::PI;
use std::path::Path;

pub fn main() {
    env_logger::init();

    // all lengths in wavelengths
    let shape = 64;
    let pitch = 2.0;
    let r_outer = 24.0 * pitch;
    let r_co = 8.0 * pitch;

    let input_field = generate_aperture(shape, pitch, r_outer, r_co);
    write_intensity_png("aperture_input.png", input_field.values(), 1.0).unwrap();

    for &(z, scale) in &[(200.0, 1.0), (2000.0, 2.0)] {
        let output = Propagator::new(z).scale(scale).run(&input_field).unwrap();
        println!(
            "z:{} scale:{} shape:{}x{} flux in:{} out:{}",
            z,
            scale,
            output.rows(),
            output.cols(),
            input_field.intensity_integral(),
            output.intensity_integral()
        );

        write_intensity_png(format!("aperture_{}_intensity.png", z), output.values(), 1e-6)
            .unwrap();
        write_phase_png(format!("aperture_{}_phase.png", z), output.values()).unwrap();
    }
}

// 0 inside radius, 1 outside, linear across one pitch centred on the edge
fn edge(r: f64, radius: f64, pitch: f64) -> f64 {
    ((r - radius) / pitch + 0.5).max(0.0).min(1.0)
}

// annular aperture, clear between r_co and r_outer
pub fn generate_aperture(shape: usize, pitch: f64, r_outer: f64, r_co: f64) -> Field {
    let mut field = Field::zeros(shape, shape, Pitch::new(pitch, pitch)).unwrap();
    let points = Array2::from_shape_fn((shape, shape), |(row, col)| field.point_at(row, col));

    let mut view = field.view_mut();
    Zip::from(view.as_array_mut())
        .and(&points)
        .par_for_each(|e, p| {
            let r = (p.x * p.x + p.y * p.y).sqrt();
            let value = edge(r, r_co, pitch) * (1.0 - edge(r, r_outer, pitch));
            *e = Complex64::new(value, 0.0);
        });

    field
}

fn write_png<F>(
    file_name: impl AsRef<Path>,
    values: ArrayView2<Complex64>,
    colour: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: Fn(Complex64) -> Lch<D65, f64>,
{
    let (h, w) = values.dim();
    let mut img = RgbImage::new(w as u32, h as u32);
    for (x, y, p) in img.enumerate_pixels_mut() {
        let rgb = Srgb::from(colour(values[[y as usize, x as usize]]));
        *p = Rgb([
            (rgb.red * 255.0) as u8,
            (rgb.green * 255.0) as u8,
            (rgb.blue * 255.0) as u8,
        ]);
    }
    img.save(file_name)?;
    Ok(())
}

/// Intensity normalised to its peak, log scaled down to `floor` when `floor < 1`.
pub fn write_intensity_png(
    file_name: impl AsRef<Path>,
    values: ArrayView2<Complex64>,
    floor: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let peak = values.iter().fold(0.0f64, |max, v| v.norm_sqr().max(max));
    let decades = -floor.ln();
    println!("{}x{} peak intensity {}", values.nrows(), values.ncols(), peak);

    write_png(file_name, values, |v| {
        let i = v.norm_sqr() / peak;
        let level = if decades > 0.0 { i.ln() / decades + 1.0 } else { i };
        let level = level.max(0.0).min(1.0);
        Lch::new(level * 70.0, level * 128.0, 280.0 - 245.0 * level)
    })
}

/// Hue follows phase, lightness follows amplitude.
pub fn write_phase_png(
    file_name: impl AsRef<Path>,
    values: ArrayView2<Complex64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let peak = values.iter().fold(0.0f64, |max, v| v.norm().max(max));

    write_png(file_name, values, |v| {
        let (r, theta) = v.to_polar();
        let r = r / peak;
        Lch::new(r * 100.0, r * 128.0, 180.0 * (theta / PI + 1.0))
    })
}
