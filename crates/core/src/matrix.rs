//! Row-major 3x3 rotation matrices.

use crate::vector::Vector3;

/// Row-major 3x3 matrix.
pub type Matrix3 = [[f64; 3]; 3];

/// Identity matrix.
pub const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Matrix times vector.
#[inline]
pub fn mxv(m: &Matrix3, v: &Vector3) -> Vector3 {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Transpose of the matrix times vector.
#[inline]
pub fn mtxv(m: &Matrix3, v: &Vector3) -> Vector3 {
    [
        m[0][0] * v[0] + m[1][0] * v[1] + m[2][0] * v[2],
        m[0][1] * v[0] + m[1][1] * v[1] + m[2][1] * v[2],
        m[0][2] * v[0] + m[1][2] * v[1] + m[2][2] * v[2],
    ]
}

/// Matrix product `a * b`.
pub fn mxm(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Frame rotation about coordinate axis `axis` (1, 2 or 3) by `angle`
/// radians. Applying the result to a vector expresses it in the rotated
/// frame. Any other axis index yields the identity.
pub fn frame_rotation(angle: f64, axis: usize) -> Matrix3 {
    let (s, c) = angle.sin_cos();
    match axis {
        1 => [[1.0, 0.0, 0.0], [0.0, c, s], [0.0, -s, c]],
        2 => [[c, 0.0, -s], [0.0, 1.0, 0.0], [s, 0.0, c]],
        3 => [[c, s, 0.0], [-s, c, 0.0], [0.0, 0.0, 1.0]],
        _ => IDENTITY,
    }
}

/// Build a 3-1-3 Euler frame rotation: `R3(c) * R1(b) * R3(a)`.
pub fn euler_313(a: f64, b: f64, c: f64) -> Matrix3 {
    mxm(
        &frame_rotation(c, 3),
        &mxm(&frame_rotation(b, 1), &frame_rotation(a, 3)),
    )
}
