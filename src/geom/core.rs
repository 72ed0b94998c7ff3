use std::fmt::Debug;

// ─────────────────────────────────────────────────────────────────────────────
// ControlPoint
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed-size coordinate tuple that the fitting engine can solve for.
///
/// The solver only ever touches points through their coordinates, so any
/// dimension works: planar data uses [`Point2`], spatial data [`Point3`] or
/// [`Vec3`], and rational curves fit in homogeneous space with [`Point4`].
///
/// Every arithmetic helper is provided on top of [`coord`](Self::coord) and
/// [`from_coords`](Self::from_coords); implementors only supply those two.
pub trait ControlPoint: Copy + Debug + PartialEq + Send + Sync {
    /// Number of coordinates per point.
    const DIM: usize;

    /// Coordinate along `axis` (`0..DIM`).
    fn coord(&self, axis: usize) -> f64;

    /// Build a point from a coordinate generator called once per axis.
    fn from_coords(f: impl FnMut(usize) -> f64) -> Self;

    /// Returns `self * a + other * b`.
    #[must_use]
    fn combine(self, a: f64, other: Self, b: f64) -> Self {
        Self::from_coords(|axis| self.coord(axis) * a + other.coord(axis) * b)
    }

    #[must_use]
    fn plus(self, other: Self) -> Self {
        self.combine(1.0, other, 1.0)
    }

    #[must_use]
    fn minus(self, other: Self) -> Self {
        self.combine(1.0, other, -1.0)
    }

    #[must_use]
    fn scaled(self, s: f64) -> Self {
        Self::from_coords(|axis| self.coord(axis) * s)
    }

    /// Returns `self * (1 - t) + other * t`.
    #[must_use]
    fn lerp_to(self, other: Self, t: f64) -> Self {
        self.combine(1.0 - t, other, t)
    }

    #[must_use]
    fn dot_with(self, other: Self) -> f64 {
        (0..Self::DIM).map(|axis| self.coord(axis) * other.coord(axis)).sum()
    }

    /// Euclidean length of the coordinate tuple.
    #[must_use]
    fn norm(self) -> f64 {
        self.dot_with(self).sqrt()
    }

    #[must_use]
    fn distance_between(self, other: Self) -> f64 {
        self.minus(other).norm()
    }

    #[must_use]
    fn is_finite(self) -> bool {
        (0..Self::DIM).all(|axis| self.coord(axis).is_finite())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

/// Displacement between two [`Point3`]s.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector, or `None` for a zero or non-finite length.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        (len.is_finite() && len > 0.0).then(|| self.mul_scalar(1.0 / len))
    }

    #[must_use]
    pub const fn mul_scalar(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl ControlPoint for Vec3 {
    const DIM: usize = 3;

    fn coord(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    fn from_coords(mut f: impl FnMut(usize) -> f64) -> Self {
        Self::new(f(0), f(1), f(2))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point2
// ─────────────────────────────────────────────────────────────────────────────

/// Planar point, the usual input for sketch-style curve fitting.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl ControlPoint for Point2 {
    const DIM: usize = 2;

    fn coord(&self, axis: usize) -> f64 {
        if axis == 0 { self.x } else { self.y }
    }

    fn from_coords(mut f: impl FnMut(usize) -> f64) -> Self {
        Self::new(f(0), f(1))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn add_vec(self, v: Vec3) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }

    /// Vector from `rhs` to `self`.
    #[must_use]
    pub const fn sub_point(self, rhs: Self) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        self.sub_point(other).length()
    }
}

impl ControlPoint for Point3 {
    const DIM: usize = 3;

    fn coord(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    fn from_coords(mut f: impl FnMut(usize) -> f64) -> Self {
        Self::new(f(0), f(1), f(2))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point4
// ─────────────────────────────────────────────────────────────────────────────

/// Homogeneous point `(x*w, y*w, z*w, w)`.
///
/// Fitting weighted data happens in homogeneous space; project back with
/// [`Point4::to_point3`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Point4 {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Homogeneous form of a weighted point.
    #[must_use]
    pub const fn from_weighted(point: Point3, weight: f64) -> Self {
        Self::new(point.x * weight, point.y * weight, point.z * weight, weight)
    }

    /// Perspective divide; `None` when the weight is zero or not finite.
    #[must_use]
    pub fn to_point3(self) -> Option<Point3> {
        if self.w.is_finite() && self.w != 0.0 {
            Some(Point3::new(self.x / self.w, self.y / self.w, self.z / self.w))
        } else {
            None
        }
    }
}

impl ControlPoint for Point4 {
    const DIM: usize = 4;

    fn coord(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => self.w,
        }
    }

    fn from_coords(mut f: impl FnMut(usize) -> f64) -> Self {
        Self::new(f(0), f(1), f(2), f(3))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    /// Default geometric tolerance (1e-9).
    pub const DEFAULT: Self = Self { eps: 1e-9 };

    /// Tolerance for detecting zero-length chords and degenerate inputs (1e-12).
    pub const ZERO_LENGTH: Self = Self { eps: 1e-12 };

    /// Smallest pivot accepted by the LU factorization, relative to the
    /// largest matrix entry (1e-14).
    pub const PIVOT: Self = Self { eps: 1e-14 };

    /// Loose tolerance for coarse comparisons (1e-6).
    pub const LOOSE: Self = Self { eps: 1e-6 };

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    #[must_use]
    pub const fn default_geom() -> Self {
        Self::DEFAULT
    }

    /// Create a scaled tolerance (e.g., for relative comparisons).
    #[must_use]
    pub fn scaled(self, scale: f64) -> Self {
        Self::new(self.eps * scale.abs())
    }

    #[must_use]
    pub fn approx_eq_f64(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.eps
    }

    #[must_use]
    pub fn approx_zero_f64(self, a: f64) -> bool {
        a.abs() <= self.eps
    }

    /// Compare two points of any dimension by Euclidean distance.
    #[must_use]
    pub fn approx_eq_point<P: ControlPoint>(self, a: P, b: P) -> bool {
        let d = a.minus(b);
        d.dot_with(d) <= self.eps * self.eps
    }

    /// Check if a length/distance is approximately zero.
    #[must_use]
    pub fn is_zero_length(self, len: f64) -> bool {
        len.abs() <= self.eps
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point3_vector_round_trip() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let q = Point3::new(4.0, 6.0, 3.0);
        let v = q.sub_point(p);

        assert_eq!(v, Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(p.add_vec(v), q);
        assert!((v.length() - 5.0).abs() < 1e-12);
        let unit = v.normalized().unwrap();
        assert!(Tolerance::DEFAULT.approx_eq_point(unit, Vec3::new(0.6, 0.8, 0.0)));
        assert_eq!(Vec3::default().normalized(), None);
    }

    #[test]
    fn test_control_point_arithmetic_is_dimension_agnostic() {
        let a = Point2::new(1.0, 2.0);
        let b = Point2::new(3.0, 6.0);
        assert_eq!(a.plus(b), Point2::new(4.0, 8.0));
        assert_eq!(b.minus(a), Point2::new(2.0, 4.0));
        assert_eq!(a.scaled(3.0), Point2::new(3.0, 6.0));
        assert_eq!(a.lerp_to(b, 0.5), Point2::new(2.0, 4.0));
        assert!((a.dot_with(b) - 15.0).abs() < 1e-12);
        assert!((Point2::new(3.0, 4.0).norm() - 5.0).abs() < 1e-12);

        let h = Point4::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(h.scaled(0.5), Point4::new(0.5, 1.0, 1.5, 2.0));
        assert!((h.dot_with(h) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_point3_trait_and_inherent_distance_agree() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 2.0, 2.0);
        assert!((a.distance_to(b) - 3.0).abs() < 1e-12);
        assert!((a.distance_between(b) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_point4_homogeneous_round_trip() {
        let p = Point3::new(1.0, -2.0, 0.5);
        let h = Point4::from_weighted(p, 2.5);
        assert_eq!(h.to_point3(), Some(p));
        assert_eq!(Point4::new(1.0, 1.0, 1.0, 0.0).to_point3(), None);
    }

    #[test]
    fn test_non_finite_detection() {
        assert!(Point3::new(1.0, 2.0, 3.0).is_finite());
        assert!(!Point3::new(f64::NAN, 2.0, 3.0).is_finite());
        assert!(!Point2::new(0.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_tolerance_constants() {
        assert!(Tolerance::ZERO_LENGTH.eps < Tolerance::DEFAULT.eps);
        assert!(Tolerance::PIVOT.eps < Tolerance::ZERO_LENGTH.eps);
        assert!(Tolerance::LOOSE.eps > Tolerance::DEFAULT.eps);
    }

    #[test]
    fn test_tolerance_point_comparison() {
        let tol = Tolerance::new(1e-9);
        let a = Point2::new(1.0, 2.0);
        let b = Point2::new(1.0 + 1e-10, 2.0);
        let c = Point2::new(1.0 + 1e-8, 2.0);

        assert!(tol.approx_eq_point(a, b));
        assert!(!tol.approx_eq_point(a, c));
    }
}
