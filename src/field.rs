//! Borrowed views over column-major complex sample buffers.
//!
//! Sample `(row, col)` lives at linear index `row + col * rows`. This matches the
//! buffers handed over by array hosts that store matrices column by column, and
//! is the layout [`crate::Field`] keeps its values in.

use crate::error::FieldError;
use crate::point::Point;
use crate::rsmethod::output_shape;
use ndarray::{ArrayView2, ArrayViewMut2, ShapeBuilder};
use num_complex::Complex64;

/// Physical pixel size along each axis, in wavelengths.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pitch {
    pub x: f64,
    pub y: f64,
}

impl Pitch {
    pub fn new(x: f64, y: f64) -> Self {
        Pitch { x, y }
    }

    /// Both axes multiplied by `scale`.
    pub fn scaled(self, scale: f64) -> Self {
        Pitch::new(self.x * scale, self.y * scale)
    }

    /// Area of a single pixel.
    pub fn area(self) -> f64 {
        self.x * self.y
    }

    pub(crate) fn validate(self) -> Result<Self, FieldError> {
        if self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0 {
            Ok(self)
        } else {
            Err(FieldError::InvalidPitch {
                x: self.x,
                y: self.y,
            })
        }
    }
}

/// Square pixels.
impl From<f64> for Pitch {
    fn from(p: f64) -> Self {
        Pitch::new(p, p)
    }
}

/// `(x, y)` pitch pair.
impl From<(f64, f64)> for Pitch {
    fn from((x, y): (f64, f64)) -> Self {
        Pitch::new(x, y)
    }
}

/// Extents and pitch of a sampled plane, without the samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    pitch: Pitch,
}

impl Grid {
    pub fn new(rows: usize, cols: usize, pitch: Pitch) -> Result<Self, FieldError> {
        if rows == 0 || cols == 0 {
            return Err(FieldError::EmptyGrid { rows, cols });
        }
        Ok(Grid {
            rows,
            cols,
            pitch: pitch.validate()?,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// True for a resampled grid whose extents rounded down to zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Extents `round(rows * scale)` by `round(cols * scale)`, pitch multiplied by `scale`.
    ///
    /// Either extent may round to zero, giving an empty grid.
    pub fn resampled(&self, scale: f64) -> Grid {
        let (rows, cols) = output_shape(self.rows, self.cols, scale);
        Grid {
            rows,
            cols,
            pitch: self.pitch.scaled(scale),
        }
    }

    pub fn pitch(&self) -> Pitch {
        self.pitch
    }

    /// Position of the centre of pixel `(row, col)` on the plane `z = 0`, with the grid
    /// centred on the origin.
    ///
    /// Indices are not checked.
    #[inline]
    pub fn point_at(&self, row: usize, col: usize) -> Point {
        let x = (col as f64 + 0.5 - 0.5 * self.cols as f64) * self.pitch.x;
        let y = (row as f64 + 0.5 - 0.5 * self.rows as f64) * self.pitch.y;
        Point::new(x, y, 0.0)
    }

    /// Linear column-major index of `(row, col)`.
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> Result<usize, FieldError> {
        if row >= self.rows || col >= self.cols {
            return Err(FieldError::IndexOutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row + col * self.rows)
    }

    #[inline]
    fn index_or_abort(&self, row: usize, col: usize) -> usize {
        match self.index(row, col) {
            Ok(i) => i,
            Err(e) => abort_on(e),
        }
    }

    fn check_len(&self, actual: usize) -> Result<(), FieldError> {
        if actual != self.len() {
            return Err(FieldError::ShapeMismatch {
                expected: self.len(),
                actual,
            });
        }
        Ok(())
    }
}

// out of range access is a caller defect
#[cold]
#[inline(never)]
fn abort_on(e: FieldError) -> ! {
    panic!("{}", e)
}

/// Read-only view of a sampled field over a borrowed buffer.
#[derive(Clone, Copy, Debug)]
pub struct FieldView<'a> {
    grid: Grid,
    data: &'a [Complex64],
}

impl<'a> FieldView<'a> {
    pub fn new(
        rows: usize,
        cols: usize,
        pitch: impl Into<Pitch>,
        data: &'a [Complex64],
    ) -> Result<Self, FieldError> {
        let grid = Grid::new(rows, cols, pitch.into())?;
        grid.check_len(data.len())?;
        Ok(FieldView { grid, data })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn rows(&self) -> usize {
        self.grid.rows
    }

    pub fn cols(&self) -> usize {
        self.grid.cols
    }

    pub fn pitch(&self) -> Pitch {
        self.grid.pitch
    }

    pub fn point_at(&self, row: usize, col: usize) -> Point {
        self.grid.point_at(row, col)
    }

    /// Sample at `(row, col)`.
    ///
    /// # Panics
    /// If either index is outside the field.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[self.grid.index_or_abort(row, col)]
    }

    pub fn try_get(&self, row: usize, col: usize) -> Result<Complex64, FieldError> {
        Ok(self.data[self.grid.index(row, col)?])
    }

    /// The samples in column-major order.
    pub fn as_slice(&self) -> &'a [Complex64] {
        self.data
    }

    /// The samples as a `rows x cols` array, indexed `[row, col]`.
    pub fn as_array(&self) -> ArrayView2<'a, Complex64> {
        ArrayView2::from_shape((self.grid.rows, self.grid.cols).f(), self.data)
            .expect("buffer length is checked on construction")
    }
}

/// Exclusive view of a sampled field over a borrowed buffer.
#[derive(Debug)]
pub struct FieldViewMut<'a> {
    grid: Grid,
    data: &'a mut [Complex64],
}

impl<'a> FieldViewMut<'a> {
    pub fn new(
        rows: usize,
        cols: usize,
        pitch: impl Into<Pitch>,
        data: &'a mut [Complex64],
    ) -> Result<Self, FieldError> {
        let grid = Grid::new(rows, cols, pitch.into())?;
        grid.check_len(data.len())?;
        Ok(FieldViewMut { grid, data })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn rows(&self) -> usize {
        self.grid.rows
    }

    pub fn cols(&self) -> usize {
        self.grid.cols
    }

    pub fn pitch(&self) -> Pitch {
        self.grid.pitch
    }

    pub fn point_at(&self, row: usize, col: usize) -> Point {
        self.grid.point_at(row, col)
    }

    /// # Panics
    /// If either index is outside the field.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[self.grid.index_or_abort(row, col)]
    }

    /// # Panics
    /// If either index is outside the field.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Complex64) {
        let i = self.grid.index_or_abort(row, col);
        self.data[i] = value;
    }

    pub fn try_get(&self, row: usize, col: usize) -> Result<Complex64, FieldError> {
        Ok(self.data[self.grid.index(row, col)?])
    }

    pub fn try_set(&mut self, row: usize, col: usize, value: Complex64) -> Result<(), FieldError> {
        let i = self.grid.index(row, col)?;
        self.data[i] = value;
        Ok(())
    }

    /// Reborrow as a read-only view.
    pub fn view(&self) -> FieldView<'_> {
        FieldView {
            grid: self.grid,
            data: &*self.data,
        }
    }

    pub fn as_slice_mut(&mut self) -> &mut [Complex64] {
        &mut *self.data
    }

    /// The samples as a mutable `rows x cols` array, indexed `[row, col]`.
    pub fn as_array_mut(&mut self) -> ArrayViewMut2<'_, Complex64> {
        ArrayViewMut2::from_shape((self.grid.rows, self.grid.cols).f(), &mut *self.data)
            .expect("buffer length is checked on construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn pattern(rows: usize, cols: usize) -> Vec<Complex64> {
        (0..rows * cols)
            .map(|i| Complex64::new(i as f64, -(i as f64) * 0.5))
            .collect()
    }

    #[test]
    fn index_is_column_major() {
        let data = pattern(3, 4);
        let view = FieldView::new(3, 4, 1.0, &data).unwrap();

        assert_eq!(view.get(0, 0), data[0]);
        assert_eq!(view.get(2, 0), data[2]);
        assert_eq!(view.get(0, 1), data[3]);
        assert_eq!(view.get(1, 3), data[1 + 3 * 3]);
        assert_eq!(view.as_array()[[1, 3]], view.get(1, 3));
    }

    #[test]
    fn points_are_pixel_centres_about_origin() {
        let data = pattern(2, 3);
        let view = FieldView::new(2, 3, (2.0, 0.5), &data).unwrap();

        let p = view.point_at(0, 0);
        assert_abs_diff_eq!(p.x, -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, -0.25, epsilon = 1e-12);
        assert_eq!(p.z, 0.0);

        let p = view.point_at(1, 1);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.25, epsilon = 1e-12);

        let p = view.point_at(1, 2);
        assert_abs_diff_eq!(p.x, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn construction_rejects_bad_buffers() {
        let data = pattern(2, 2);
        assert_eq!(
            FieldView::new(2, 3, 1.0, &data).unwrap_err(),
            FieldError::ShapeMismatch {
                expected: 6,
                actual: 4
            }
        );
        assert_eq!(
            FieldView::new(0, 4, 1.0, &data).unwrap_err(),
            FieldError::EmptyGrid { rows: 0, cols: 4 }
        );
        assert!(matches!(
            FieldView::new(2, 2, (1.0, 0.0), &data),
            Err(FieldError::InvalidPitch { .. })
        ));
        assert!(matches!(
            FieldView::new(2, 2, f64::NAN, &data),
            Err(FieldError::InvalidPitch { .. })
        ));
    }

    #[test]
    fn resampled_grid_may_be_empty() {
        let grid = Grid::new(3, 5, Pitch::new(0.5, 2.0)).unwrap();
        assert!(!grid.is_empty());

        let up = grid.resampled(2.0);
        assert_eq!((up.rows(), up.cols()), (6, 10));
        assert_eq!(up.pitch(), Pitch::new(1.0, 4.0));

        let down = grid.resampled(0.1);
        assert_eq!((down.rows(), down.cols()), (0, 1));
        assert!(down.is_empty());
    }

    #[test]
    fn try_access_reports_out_of_range() {
        let mut data = pattern(2, 2);
        let mut view = FieldViewMut::new(2, 2, 1.0, &mut data).unwrap();

        assert_eq!(
            view.try_get(2, 0),
            Err(FieldError::IndexOutOfRange {
                row: 2,
                col: 0,
                rows: 2,
                cols: 2
            })
        );
        assert!(view.try_set(0, 2, Complex64::new(1.0, 0.0)).is_err());
        assert!(view.try_set(1, 1, Complex64::new(9.0, 1.0)).is_ok());
        assert_eq!(view.get(1, 1), Complex64::new(9.0, 1.0));
        drop(view);
        assert_eq!(data[3], Complex64::new(9.0, 1.0));
    }

    #[test]
    #[should_panic(expected = "outside range")]
    fn get_panics_past_last_row() {
        let data = pattern(2, 3);
        let view = FieldView::new(2, 3, 1.0, &data).unwrap();
        view.get(2, 0);
    }

    #[test]
    #[should_panic(expected = "outside range")]
    fn set_panics_past_last_col() {
        let mut data = pattern(2, 3);
        let mut view = FieldViewMut::new(2, 3, 1.0, &mut data).unwrap();
        view.set(0, 3, Complex64::new(0.0, 0.0));
    }
}
