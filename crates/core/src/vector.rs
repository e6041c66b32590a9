//! Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.

/// Alias for a 3D vector in kilometres or km/s depending on context.
pub type Vector3 = [f64; 3];

/// Zero vector.
pub const ZERO: Vector3 = [0.0; 3];

/// Euclidean norm of a vector.
#[inline]
pub fn norm(v: &Vector3) -> f64 {
    dot(v, v).sqrt()
}

/// Dot product of two vectors.
#[inline]
pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Vector addition.
#[inline]
pub fn add(a: &Vector3, b: &Vector3) -> Vector3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

/// Vector subtraction.
#[inline]
pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Scale a vector by a scalar.
#[inline]
pub fn scale(v: &Vector3, s: f64) -> Vector3 {
    [v[0] * s, v[1] * s, v[2] * s]
}

/// Cross product `a × b`.
#[inline]
pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Linear combination `a * u + b * v`.
#[inline]
pub fn lincomb(a: f64, u: &Vector3, b: f64, v: &Vector3) -> Vector3 {
    [
        a * u[0] + b * v[0],
        a * u[1] + b * v[1],
        a * u[2] + b * v[2],
    ]
}

/// Unit vector in the direction of `v`, or `None` for the zero vector.
pub fn unit(v: &Vector3) -> Option<Vector3> {
    let n = norm(v);
    if n > 0.0 && n.is_finite() {
        Some(scale(v, 1.0 / n))
    } else {
        None
    }
}

/// Component of `v` perpendicular to `axis`. Returns `v` unchanged when
/// `axis` is the zero vector.
pub fn perpendicular(v: &Vector3, axis: &Vector3) -> Vector3 {
    match unit(axis) {
        Some(u) => sub(v, &scale(&u, dot(v, &u))),
        None => *v,
    }
}

/// Angular separation between two vectors in radians, in `[0, π]`.
///
/// Uses the half-chord formulation so nearly parallel and nearly opposite
/// vectors keep full precision.
pub fn separation(a: &Vector3, b: &Vector3) -> f64 {
    let (Some(ua), Some(ub)) = (unit(a), unit(b)) else {
        return 0.0;
    };
    if dot(&ua, &ub) >= 0.0 {
        2.0 * (0.5 * norm(&sub(&ua, &ub))).min(1.0).asin()
    } else {
        std::f64::consts::PI - 2.0 * (0.5 * norm(&add(&ua, &ub))).min(1.0).asin()
    }
}

/// Rotate `v` counter-clockwise by `angle` radians about `axis`
/// (right-hand rule). A zero axis leaves `v` unchanged.
pub fn rotate_about(v: &Vector3, axis: &Vector3, angle: f64) -> Vector3 {
    let Some(k) = unit(axis) else {
        return *v;
    };
    let (sin, cos) = angle.sin_cos();
    let along = scale(&k, dot(&k, v));
    let perp = sub(v, &along);
    let side = cross(&k, &perp);
    add(&along, &lincomb(cos, &perp, sin, &side))
}

/// Distance between two points.
#[inline]
pub fn distance(a: &Vector3, b: &Vector3) -> f64 {
    norm(&sub(a, b))
}
