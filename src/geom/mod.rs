mod basis;
mod bezier_fit;
mod core;
mod curve;
mod curve_fit;
mod fit_system;
mod knot_vector;
mod linalg;
mod metrics;
mod parameterization;

pub use basis::{basis_functions, find_span, one_basis_function};
pub use bezier_fit::interpolate_bezier;
pub use core::{ControlPoint, Point2, Point3, Point4, Tolerance, Vec3};
pub use curve::{CubicBezier, Line3, NurbsCurve};
pub use curve_fit::{
    CurveFitDiagnostics, CurveFitError, CurveFitOptions, FitMode, approximate_curve, fit_curve,
    fit_curve_with_tangents, interpolate_curve, interpolate_curve_with_tangents,
};
pub use fit_system::{
    FitSystem, assemble_interpolation, assemble_least_squares, assemble_tangent_interpolation,
    solve_per_dimension,
};
pub use knot_vector::{
    approximation_knots, interpolation_knots, is_clamped, is_non_decreasing, knot_multiplicities,
};
pub use linalg::{LinalgError, LuDecomposition, Matrix};
pub use metrics::{FitMetrics, FitTimingReport, TimingBucket};
pub use parameterization::{Parameterization, parameterize};

#[cfg(test)]
mod tests;
