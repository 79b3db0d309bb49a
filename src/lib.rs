//! Free space propagation of sampled scalar fields by direct evaluation of the
//! Rayleigh-Sommerfeld integral.
//!
//! Fields are complex samples on a rectangular grid, centred on the optical axis,
//! stored column-major. All lengths (pixel pitch, propagation distance) are in
//! units of wavelength.

use ndarray::{Array2, ArrayView2, ShapeBuilder};
use num_complex::Complex64;

mod error;
pub mod field;
pub mod point;
pub mod rsmethod;

pub use crate::error::FieldError;
pub use crate::field::{FieldView, FieldViewMut, Grid, Pitch};
pub use crate::point::Point;
pub use crate::rsmethod::{output_shape, Propagator};

/// Represents a field sampled at a given pitch.
///
/// This represents a complex scalar field (e.g. transverse electrical), the square of which is the Irradiance.
/// Values are indexed `[row, col]` (`[y, x]`) and kept in column-major memory order, so a
/// [`FieldView`] can borrow them directly.
#[derive(Clone, Debug)]
pub struct Field {
    values: Array2<Complex64>,
    pitch: Pitch,
}

impl Field {
    /// A field of zeros.
    pub fn zeros(rows: usize, cols: usize, pitch: impl Into<Pitch>) -> Result<Field, FieldError> {
        let grid = Grid::new(rows, cols, pitch.into())?;
        Ok(Field {
            values: Array2::zeros((rows, cols).f()),
            pitch: grid.pitch(),
        })
    }

    /// Wraps an array of any memory layout, copying it into column-major order if needed.
    pub fn from_array(
        values: Array2<Complex64>,
        pitch: impl Into<Pitch>,
    ) -> Result<Field, FieldError> {
        let grid = Grid::new(values.nrows(), values.ncols(), pitch.into())?;
        let values = if values.t().is_standard_layout() {
            values
        } else {
            let mut f = Array2::zeros(values.raw_dim().f());
            f.assign(&values);
            f
        };
        Ok(Field {
            values,
            pitch: grid.pitch(),
        })
    }

    /// Takes ownership of a buffer laid out as `row + col * rows`.
    pub fn from_column_major(
        rows: usize,
        cols: usize,
        pitch: impl Into<Pitch>,
        samples: Vec<Complex64>,
    ) -> Result<Field, FieldError> {
        let grid = Grid::new(rows, cols, pitch.into())?;
        let actual = samples.len();
        let values = Array2::from_shape_vec((rows, cols).f(), samples).map_err(|_| {
            FieldError::ShapeMismatch {
                expected: grid.len(),
                actual,
            }
        })?;
        Ok(Field {
            values,
            pitch: grid.pitch(),
        })
    }

    pub fn values(&self) -> ArrayView2<'_, Complex64> {
        self.values.view()
    }

    pub fn into_values(self) -> Array2<Complex64> {
        self.values
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn point_at(&self, row: usize, col: usize) -> Point {
        self.view().point_at(row, col)
    }

    pub fn view(&self) -> FieldView<'_> {
        let data = self
            .values
            .as_slice_memory_order()
            .expect("field values are contiguous");
        FieldView::new(self.rows(), self.cols(), self.pitch, data)
            .expect("field extents are checked on construction")
    }

    pub fn view_mut(&mut self) -> FieldViewMut<'_> {
        let (rows, cols, pitch) = (self.rows(), self.cols(), self.pitch);
        let data = self
            .values
            .as_slice_memory_order_mut()
            .expect("field values are contiguous");
        FieldViewMut::new(rows, cols, pitch, data)
            .expect("field extents are checked on construction")
    }

    /// Calculates the area weighted sum of the squared norm of the field.
    ///
    /// This results in a conserved value, Radiant flux.
    pub fn intensity_integral(&self) -> f64 {
        self.values.iter().fold(0.0, |sum, &v| sum + v.norm_sqr()) * self.pitch.area()
    }
}

/// Propagate a column-major buffer of `rows x cols` samples by `distance`, resampling by `scale`.
///
/// Returns the destination samples, column-major, with their extents
/// `(round(rows * scale), round(cols * scale))`. The destination pitch is `pitch * scale`.
pub fn propagate(
    samples: &[Complex64],
    rows: usize,
    cols: usize,
    pitch: impl Into<Pitch>,
    distance: f64,
    scale: f64,
) -> Result<(Vec<Complex64>, usize, usize), FieldError> {
    Propagator::new(distance)
        .scale(scale)
        .run_buffer(samples, rows, cols, pitch)
}
