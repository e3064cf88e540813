//! Conversion of caller image tensors into the engine's input layout.
//!
//! Callers hand in column-major data: the first dimension (width) varies
//! fastest, followed by height, channel and batch. The engine reads the
//! buffer with the two spatial axes swapped relative to that convention, so
//! every plane is transposed before it is fed. Outputs are returned in the
//! engine's own order and are not converted back.

use std::fmt;

use crate::error::{Error, Result};

/// Canonical 4D input shape in host order: width, height, channel, batch.
///
/// Two shapes are equal only if all four dimensions match, which makes this
/// the cache key for predictor reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputShape {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub batch: usize,
}

impl InputShape {
    pub fn new(width: usize, height: usize, channels: usize, batch: usize) -> Self {
        Self {
            width,
            height,
            channels,
            batch,
        }
    }

    /// Builds a canonical shape from a rank 2, 3 or 4 dimension list.
    /// Missing trailing dimensions default to 1.
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        if !(2..=4).contains(&dims.len()) {
            return Err(Error::Shape(format!(
                "unsupported input rank {} (want 2, 3 or 4)",
                dims.len()
            )));
        }
        if let Some(i) = dims.iter().position(|&d| d == 0) {
            return Err(Error::Shape(format!("input dimension {i} is zero")));
        }

        let mut full = [1usize; 4];
        full[..dims.len()].copy_from_slice(dims);
        let shape = Self::new(full[0], full[1], full[2], full[3]);
        shape.num_elements()?;
        Ok(shape)
    }

    /// Dimensions in host order.
    pub fn dims(&self) -> [usize; 4] {
        [self.width, self.height, self.channels, self.batch]
    }

    /// Total number of elements, or `Shape` if it does not fit in a usize.
    pub fn num_elements(&self) -> Result<usize> {
        self.dims()
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| Error::Shape(format!("element count of {self} overflows")))
    }

    /// Dimensions reversed into the engine's slowest-to-fastest order:
    /// `[batch, channel, height, width]`.
    pub fn engine_dims(&self) -> Result<[u32; 4]> {
        let mut out = [0u32; 4];
        for (slot, &d) in out.iter_mut().zip(self.dims().iter().rev()) {
            *slot = u32::try_from(d).map_err(|_| Error::Shape(format!("dimension {d} exceeds u32")))?;
        }
        Ok(out)
    }
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}x{}", self.width, self.height, self.channels, self.batch)
    }
}

/// Borrowed view of caller images: a shape of rank 2, 3 or 4 and the
/// matching column-major data.
///
/// Rank 2 and 3 inputs describe a single image; channel and batch default
/// to 1. Nothing is validated until the images are converted.
#[derive(Debug, Clone, Copy)]
pub struct Images<'a> {
    shape: &'a [usize],
    data: &'a [f32],
}

impl<'a> Images<'a> {
    pub fn new(shape: &'a [usize], data: &'a [f32]) -> Self {
        Self { shape, data }
    }

    pub fn shape(&self) -> &'a [usize] {
        self.shape
    }

    pub fn data(&self) -> &'a [f32] {
        self.data
    }
}

/// Converts images into the buffer the engine expects.
///
/// Returns the canonical shape together with a fresh buffer in which each
/// width x height plane is transposed: the host element at
/// `(x, y, c, n)` moves to `y + height * (x + width * (c + channels * n))`.
pub fn to_engine_layout(images: Images<'_>) -> Result<(InputShape, Vec<f32>)> {
    let shape = InputShape::from_dims(images.shape())?;
    let data = images.data();
    let need = shape.num_elements()?;
    if data.len() != need {
        return Err(Error::Shape(format!(
            "data has {} elements, shape {shape} needs {need}",
            data.len()
        )));
    }

    let (w, h) = (shape.width, shape.height);
    let plane = w * h;
    let mut out = vec![0.0f32; data.len()];
    for (src, dst) in data.chunks_exact(plane).zip(out.chunks_exact_mut(plane)) {
        for y in 0..h {
            for x in 0..w {
                dst[y + h * x] = src[x + w * y];
            }
        }
    }
    Ok((shape, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_pads_trailing_dims() {
        assert_eq!(InputShape::from_dims(&[4, 3]).unwrap(), InputShape::new(4, 3, 1, 1));
        assert_eq!(InputShape::from_dims(&[4, 3, 2]).unwrap(), InputShape::new(4, 3, 2, 1));
        assert_eq!(InputShape::from_dims(&[4, 3, 2, 5]).unwrap(), InputShape::new(4, 3, 2, 5));
    }

    #[test]
    fn shape_rejects_bad_rank() {
        for dims in [&[][..], &[7][..], &[1, 2, 3, 4, 5][..]] {
            assert!(matches!(InputShape::from_dims(dims), Err(Error::Shape(_))), "{dims:?}");
        }
    }

    #[test]
    fn shape_rejects_zero_dim() {
        assert!(matches!(InputShape::from_dims(&[4, 0, 3]), Err(Error::Shape(_))));
    }

    #[test]
    fn shape_rejects_element_count_overflow() {
        assert!(matches!(InputShape::from_dims(&[usize::MAX, 2]), Err(Error::Shape(_))));
        let err = to_engine_layout(Images::new(&[usize::MAX, 2], &[0.0; 4])).unwrap_err();
        assert!(err.to_string().contains("overflows"));
        assert!(InputShape::new(usize::MAX, 1, 1, 1).num_elements().is_ok());
    }

    #[test]
    fn engine_dims_are_reversed() {
        let shape = InputShape::from_dims(&[224, 224, 3]).unwrap();
        assert_eq!(shape.engine_dims().unwrap(), [1, 3, 224, 224]);
        let shape = InputShape::new(5, 6, 7, 8);
        assert_eq!(shape.engine_dims().unwrap(), [8, 7, 6, 5]);
    }

    #[test]
    fn transposes_single_plane() {
        // 3 wide, 2 high, column-major: x varies fastest.
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let (shape, out) = to_engine_layout(Images::new(&[3, 2], &data)).unwrap();
        assert_eq!(shape, InputShape::new(3, 2, 1, 1));
        assert_eq!(out, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn transposes_each_plane_independently() {
        // 2x2 planes, 2 channels, 2 images.
        let data: Vec<f32> = (0..16).map(|i| i as f32).collect();
        let (_, out) = to_engine_layout(Images::new(&[2, 2, 2, 2], &data)).unwrap();
        assert_eq!(
            out,
            vec![
                0.0, 2.0, 1.0, 3.0, //
                4.0, 6.0, 5.0, 7.0, //
                8.0, 10.0, 9.0, 11.0, //
                12.0, 14.0, 13.0, 15.0,
            ]
        );
    }

    #[test]
    fn single_row_is_unchanged() {
        let data = [1.0, 2.0, 3.0];
        let (_, out) = to_engine_layout(Images::new(&[3, 1], &data)).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn rejects_length_mismatch() {
        let data = [0.0; 5];
        let err = to_engine_layout(Images::new(&[3, 2], &data)).unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }

    #[test]
    fn rejects_rank_five() {
        let data = [0.0; 1];
        let err = to_engine_layout(Images::new(&[1, 1, 1, 1, 1], &data)).unwrap_err();
        assert!(err.to_string().contains("rank 5"));
    }
}
