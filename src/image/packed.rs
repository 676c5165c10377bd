//! Packed complex (FFT) unpacking.
//!
//! DigitalMicrograph stores the FFT of a real image as one half plane of
//! real/imaginary pairs in a real-valued `width x height` block. The full
//! spectrum is Hermitian, so the other half is rebuilt by conjugate
//! mirroring through the center.
//!
//! The index arithmetic below reproduces DigitalMicrograph-compatible
//! readers exactly; it has not been checked against ground-truth spectra.

use ndarray::Array2;
use num_complex::Complex32;

use crate::error::ImageError;

/// Rebuild a full `width x height` complex spectrum from packed data.
///
/// With `W = width`, `H = height` and `p` the packed block:
/// - columns `H/2+1 .. H` hold pairs `p[i, 2+2k] + j*p[i, 3+2k]`
/// - columns `1 .. H/2` are `conj(out[W-1-i, H-1-c])`
/// - column 0 and column `H/2` take rows `W/2+1 .. W` from `p[.., 0..2]`
///   and mirror them into rows `1 .. W/2`
/// - the four corners `(0|W/2, 0|H/2)` are real samples from `p`
///
/// Both sides must be even and at least 2.
pub fn unpack_packed_complex(packed: &Array2<f32>) -> Result<Array2<Complex32>, ImageError> {
    let (w, h) = packed.dim();
    if w < 2 || h < 2 || w % 2 != 0 || h % 2 != 0 {
        return Err(ImageError::PackedShape {
            width: w,
            height: h,
            depth: 1,
        });
    }
    let (hw, hh) = (w / 2, h / 2);
    let pair = |row: usize, col: usize| Complex32::new(packed[[row, col]], packed[[row, col + 1]]);

    let mut out = Array2::from_elem((w, h), Complex32::new(1.0, 0.0));

    for i in 0..w {
        for k in 0..(h - 1 - hh) {
            out[[i, hh + 1 + k]] = pair(i, 2 + 2 * k);
        }
    }
    for i in 0..w {
        for c in 0..(hh - 1) {
            out[[i, 1 + c]] = out[[w - 1 - i, h - 1 - c]].conj();
        }
    }

    // Nyquist columns
    for r in 0..(hw - 1) {
        out[[hw + 1 + r, 0]] = pair(1 + r, 0);
        out[[hw + 1 + r, hh]] = pair(hw + 1 + r, 0);
    }
    for r in 0..(hw - 1) {
        out[[1 + r, 0]] = out[[w - 1 - r, 0]].conj();
        out[[1 + r, hh]] = out[[w - 1 - r, hh]].conj();
    }

    out[[0, 0]] = Complex32::new(packed[[0, 1]], 0.0);
    out[[hw, 0]] = Complex32::new(packed[[0, 0]], 0.0);
    out[[0, hh]] = Complex32::new(packed[[hw, 1]], 0.0);
    out[[hw, hh]] = Complex32::new(packed[[hw, 0]], 0.0);

    Ok(out)
}
