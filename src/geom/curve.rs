use super::basis::find_span;
use super::core::{ControlPoint, Point3, Tolerance, Vec3};
use super::curve_fit::CurveFitError;
use super::knot_vector;

/// Straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3 {
    pub start: Point3,
    pub end: Point3,
}

impl Line3 {
    #[must_use]
    pub const fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn direction(self) -> Vec3 {
        self.end.sub_point(self.start)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.direction().length()
    }

    /// Point at `t`, with `t = 0` at `start` and `t = 1` at `end`.
    #[must_use]
    pub fn point_at(self, t: f64) -> Point3 {
        self.start.add_vec(self.direction().mul_scalar(t))
    }

    /// Lengthens the segment by `start_length` before `start` and `end_length`
    /// past `end`. Negative lengths shorten it.
    ///
    /// An end whose `|length| <= tol.eps` is left untouched.
    ///
    /// # Errors
    /// [`CurveFitError::DegenerateInput`] if the segment has zero length and
    /// therefore no direction, or if shortening would collapse or flip it.
    pub fn extend(
        self,
        start_length: f64,
        end_length: f64,
        tol: Tolerance,
    ) -> Result<Self, CurveFitError> {
        let extends_start = start_length.abs() > tol.eps;
        let extends_end = end_length.abs() > tol.eps;
        if !extends_start && !extends_end {
            return Ok(self);
        }

        let length = self.length();
        let Some(dir) = self.direction().normalized() else {
            return Err(CurveFitError::DegenerateInput {
                reason: "cannot extend a zero-length line".to_string(),
            });
        };

        let added = (if extends_start { start_length } else { 0.0 })
            + (if extends_end { end_length } else { 0.0 });
        if length + added <= tol.eps {
            return Err(CurveFitError::DegenerateInput {
                reason: format!("extension of {added} collapses a line of length {length}"),
            });
        }

        let start = if extends_start {
            self.start.add_vec(dir.mul_scalar(-start_length))
        } else {
            self.start
        };
        let end = if extends_end {
            self.end.add_vec(dir.mul_scalar(end_length))
        } else {
            self.end
        };
        Ok(Self { start, end })
    }
}

/// Non-rational B-spline (or rational, when `P` is homogeneous [`Point4`](super::core::Point4))
/// defined by degree, clamped knots and control points.
///
/// Fitting functions return curves by value; the engine keeps no reference.
#[derive(Debug, Clone, PartialEq)]
pub struct NurbsCurve<P: ControlPoint> {
    degree: usize,
    control_points: Vec<P>,
    knots: Vec<f64>,
}

impl<P: ControlPoint> NurbsCurve<P> {
    /// # Errors
    /// [`CurveFitError::InvalidCurve`] when the degree, control point count
    /// and knot vector are inconsistent or the knots are not finite and sorted.
    pub fn new(
        degree: usize,
        control_points: Vec<P>,
        knots: Vec<f64>,
    ) -> Result<Self, CurveFitError> {
        if degree == 0 {
            return Err(invalid_curve("degree must be >= 1"));
        }
        if control_points.len() <= degree {
            return Err(invalid_curve(format!(
                "{} control points cannot carry degree {degree}",
                control_points.len()
            )));
        }
        if knots.len() != control_points.len() + degree + 1 {
            return Err(invalid_curve(format!(
                "expected {} knots for {} control points of degree {degree}, got {}",
                control_points.len() + degree + 1,
                control_points.len(),
                knots.len()
            )));
        }
        if knots.iter().any(|k| !k.is_finite()) || !knot_vector::is_non_decreasing(&knots) {
            return Err(invalid_curve("knots must be finite and non-decreasing"));
        }
        if knots[degree] >= knots[control_points.len()] {
            return Err(invalid_curve("knot vector has an empty domain"));
        }

        Ok(Self {
            degree,
            control_points,
            knots,
        })
    }

    #[must_use]
    pub const fn degree(&self) -> usize {
        self.degree
    }

    #[must_use]
    pub fn control_points(&self) -> &[P] {
        &self.control_points
    }

    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    #[must_use]
    pub fn into_parts(self) -> (usize, Vec<f64>, Vec<P>) {
        (self.degree, self.knots, self.control_points)
    }

    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[self.degree], self.knots[self.control_points.len()])
    }

    #[must_use]
    pub fn knot_multiplicities(&self, tol: Tolerance) -> Vec<(f64, usize)> {
        knot_vector::knot_multiplicities(&self.knots, tol)
    }

    /// Evaluates the curve with de Boor's algorithm.
    ///
    /// # Errors
    /// [`CurveFitError::OutOfDomain`] if `t` lies outside the domain by more
    /// than [`Tolerance::DEFAULT`].
    pub fn point_at(&self, t: f64) -> Result<P, CurveFitError> {
        let u = self.clamp_to_domain(t)?;
        let p = self.degree;
        let span = find_span(self.control_points.len(), p, u, &self.knots);

        let mut d = self.control_points[span - p..=span].to_vec();
        de_boor(&mut d, span, p, u, &self.knots);
        Ok(d[p])
    }

    /// First derivative with respect to `t`, evaluated on the hodograph.
    ///
    /// For homogeneous control points this is the derivative of the weighted
    /// curve, not of its projection.
    ///
    /// # Errors
    /// [`CurveFitError::OutOfDomain`] as for [`point_at`](Self::point_at).
    pub fn derivative_at(&self, t: f64) -> Result<P, CurveFitError> {
        let u = self.clamp_to_domain(t)?;
        let p = self.degree;
        let span = find_span(self.control_points.len(), p, u, &self.knots);

        let mut d_prime = Vec::with_capacity(p);
        for j in 0..p {
            let i = span - p + j;
            let denom = self.knots[i + p + 1] - self.knots[i + 1];
            let factor = if denom == 0.0 { 0.0 } else { p as f64 / denom };
            d_prime.push(self.control_points[i + 1].minus(self.control_points[i]).scaled(factor));
        }

        if p == 1 {
            return Ok(d_prime[0]);
        }
        de_boor(&mut d_prime, span, p - 1, u, &self.knots);
        Ok(d_prime[p - 1])
    }

    fn clamp_to_domain(&self, t: f64) -> Result<f64, CurveFitError> {
        let (start, end) = self.domain();
        let eps = Tolerance::DEFAULT.eps;
        if !t.is_finite() || t < start - eps || t > end + eps {
            return Err(CurveFitError::OutOfDomain { t, start, end });
        }
        Ok(t.clamp(start, end))
    }
}

fn invalid_curve(reason: impl Into<String>) -> CurveFitError {
    CurveFitError::InvalidCurve {
        reason: reason.into(),
    }
}

/// In-place de Boor recursion over the `p + 1` points affecting `span`.
fn de_boor<P: ControlPoint>(d: &mut [P], span: usize, p: usize, u: f64, knots: &[f64]) {
    for r in 1..=p {
        for j in (r..=p).rev() {
            let i = span - p + j;
            let denom = knots[i + p + 1 - r] - knots[i];
            let alpha = if denom == 0.0 {
                0.0
            } else {
                (u - knots[i]) / denom
            };
            d[j] = d[j - 1].lerp_to(d[j], alpha);
        }
    }
}

/// Cubic Bézier segment over `t in [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier<P: ControlPoint> {
    pub p0: P,
    pub p1: P,
    pub p2: P,
    pub p3: P,
}

impl<P: ControlPoint> CubicBezier<P> {
    #[must_use]
    pub const fn new(p0: P, p1: P, p2: P, p3: P) -> Self {
        Self { p0, p1, p2, p3 }
    }

    #[must_use]
    pub const fn start(&self) -> P {
        self.p0
    }

    #[must_use]
    pub const fn end(&self) -> P {
        self.p3
    }

    #[must_use]
    pub const fn control_points(&self) -> [P; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }

    /// de Casteljau evaluation; `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> P {
        let t = t.clamp(0.0, 1.0);
        let a = self.p0.lerp_to(self.p1, t);
        let b = self.p1.lerp_to(self.p2, t);
        let c = self.p2.lerp_to(self.p3, t);
        let ab = a.lerp_to(b, t);
        let bc = b.lerp_to(c, t);
        ab.lerp_to(bc, t)
    }

    #[must_use]
    pub fn derivative_at(&self, t: f64) -> P {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let a = self.p1.minus(self.p0);
        let b = self.p2.minus(self.p1);
        let c = self.p3.minus(self.p2);
        a.scaled(3.0 * u * u)
            .plus(b.scaled(6.0 * u * t))
            .plus(c.scaled(3.0 * t * t))
    }
}
