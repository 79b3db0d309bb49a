//! Direct evaluation of the Rayleigh-Sommerfeld diffraction integral.
//!
//! Every destination sample is the sum over all source samples of the spherical
//! wave `exp(i k r) / r`, weighted by the source value and the source pixel area.
//! All lengths are in wavelengths, so `k = 2π`.
//!
//! The cost is `O(rows_dst * cols_dst * rows_src * cols_src)`. Destination pixels
//! are independent and are filled in parallel.

use crate::error::FieldError;
use crate::field::{FieldView, FieldViewMut, Grid};
use crate::point::Point;
use crate::Field;
use log::{debug, trace};
use ndarray::Zip;
use num_complex::Complex64;
use std::f64::consts::PI;
use std::time::Instant;

/// Field at `target` due to every sample of `source`.
///
/// `target` is expressed in the source plane's frame, source samples lie at `z = 0`.
/// A target that coincides with a source pixel centre gives a non-finite result.
pub fn calculate(target: Point, source: &FieldView) -> Complex64 {
    let mut sum = Complex64::new(0.0, 0.0);

    for col in 0..source.cols() {
        for row in 0..source.rows() {
            let r = (target - source.point_at(row, col)).length();
            sum += source.get(row, col) * Complex64::new(0.0, 2.0 * PI * r).exp() / r;
        }
    }

    // dividing by i
    sum * Complex64::new(0.0, -1.0) * source.pitch().area()
}

/// Fill `destination` with the field of `source` after propagating `distance`.
///
/// The destination grid sits on the plane `z = distance`, centred on the same axis
/// as the source, with its own extents and pitch.
pub fn propagate(source: &FieldView, distance: f64, destination: &mut FieldViewMut) {
    let grid = destination.grid();
    let offset = Point::new(0.0, 0.0, distance);

    Zip::indexed(destination.as_array_mut()).par_for_each(|(row, col), e| {
        *e = calculate(grid.point_at(row, col) + offset, source);
    });
}

/// Single threaded form of [`propagate`], writing through the bounds-checked accessor.
pub fn propagate_serial(source: &FieldView, distance: f64, destination: &mut FieldViewMut) {
    let offset = Point::new(0.0, 0.0, distance);

    for row in 0..destination.rows() {
        for col in 0..destination.cols() {
            let target = destination.point_at(row, col) + offset;
            destination.set(row, col, calculate(target, source));
        }
    }
}

/// Destination extents for a source of `rows x cols` resampled by `scale`.
pub fn output_shape(rows: usize, cols: usize, scale: f64) -> (usize, usize) {
    (
        (rows as f64 * scale).round() as usize,
        (cols as f64 * scale).round() as usize,
    )
}

/// Propagation parameters.
///
/// ```
/// use num_complex::Complex64;
/// use rs_propagate::{Field, Propagator};
///
/// let source = Field::from_column_major(1, 1, 1.0, vec![Complex64::new(1.0, 0.0)]).unwrap();
/// let out = Propagator::new(5.0).run(&source).unwrap();
/// assert!((out.values()[[0, 0]] - Complex64::new(0.0, -0.2)).norm() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Propagator {
    distance: f64,
    scale: f64,
    threads: Option<usize>,
}

impl Propagator {
    /// Propagate by `distance` wavelengths at the source resolution.
    pub fn new(distance: f64) -> Self {
        Propagator {
            distance,
            scale: 1.0,
            threads: None,
        }
    }

    /// Ratio of destination to source sample count on each axis.
    ///
    /// The destination pitch is the source pitch multiplied by the same factor.
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Run on a dedicated pool of `threads` workers instead of the global rayon pool.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// The destination grid for a given source grid. It is empty when an extent rounds to zero.
    pub fn output_grid(&self, source: Grid) -> Result<Grid, FieldError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(FieldError::InvalidScale(self.scale));
        }
        Ok(source.resampled(self.scale))
    }

    /// Propagate `source` into an already allocated `destination`.
    ///
    /// The destination's own extents and pitch are used as given.
    pub fn run_into(
        &self,
        source: &FieldView,
        destination: &mut FieldViewMut,
    ) -> Result<(), FieldError> {
        debug!(
            "propagating {}x{} -> {}x{} over {} wavelengths",
            source.rows(),
            source.cols(),
            destination.rows(),
            destination.cols(),
            self.distance
        );
        let start = Instant::now();

        match self.threads {
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| FieldError::ThreadPool(e.to_string()))?;
                debug!("using a dedicated pool of {} threads", pool.current_num_threads());
                pool.install(|| propagate(source, self.distance, destination));
            }
            None => {
                debug!("using the global pool of {} threads", rayon::current_num_threads());
                propagate(source, self.distance, destination);
            }
        }

        trace!("propagation took {:?}", start.elapsed());
        Ok(())
    }

    /// Allocate the destination field and propagate `source` into it.
    ///
    /// A [`Field`] always has at least one sample, so an empty destination is
    /// reported as [`FieldError::EmptyGrid`]. Use [`Propagator::run_buffer`] to get
    /// an empty buffer instead.
    pub fn run(&self, source: &Field) -> Result<Field, FieldError> {
        let grid = self.output_grid(source.view().grid())?;
        let mut out = Field::zeros(grid.rows(), grid.cols(), grid.pitch())?;
        self.run_into(&source.view(), &mut out.view_mut())?;
        Ok(out)
    }

    /// Propagate a column-major sample buffer, returning the destination buffer and its extents.
    ///
    /// Extents that round to zero give an empty buffer.
    pub fn run_buffer(
        &self,
        samples: &[Complex64],
        rows: usize,
        cols: usize,
        pitch: impl Into<crate::Pitch>,
    ) -> Result<(Vec<Complex64>, usize, usize), FieldError> {
        let source = FieldView::new(rows, cols, pitch, samples)?;
        let grid = self.output_grid(source.grid())?;
        if grid.is_empty() {
            debug!("destination {}x{} is empty", grid.rows(), grid.cols());
            return Ok((Vec::new(), grid.rows(), grid.cols()));
        }

        let mut out = vec![Complex64::new(0.0, 0.0); grid.len()];
        let mut destination = FieldViewMut::new(grid.rows(), grid.cols(), grid.pitch(), &mut out)?;
        self.run_into(&source, &mut destination)?;

        Ok((out, grid.rows(), grid.cols()))
    }
}
