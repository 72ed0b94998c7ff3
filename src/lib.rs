#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::many_single_char_names
)]

//! Fit NURBS and piecewise Bézier curves to ordered points.
//!
//! ```
//! use curve_fit_engine::geom::{CurveFitOptions, Point2, fit_curve};
//!
//! let points = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(2.0, 0.0),
//! ];
//! let (curve, diagnostics) =
//!     fit_curve(&points, CurveFitOptions::interpolating().with_degree(2)).unwrap();
//! assert_eq!(curve.control_points().len(), 3);
//! assert!(diagnostics.max_deviation < 1e-9);
//! ```
//!
//! # Features
//!
//! - `parallel`: solve the per-axis systems on the rayon thread pool.
//! - `fit_metrics`: collect per-phase timings into [`geom::FitTimingReport`].
//!
//! The crate logs through the `log` facade and installs no logger.

pub mod geom;
