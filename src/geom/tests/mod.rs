mod test_approximation;
mod test_bezier_fit;
