//TRAITS
pub trait Limiter {
    fn limit(&self, a: f64, b: f64) -> f64;
}

//STRUCTS
/// Monotonized central limiter.
pub struct McLimiter;

//IMPLEMENTATIONS
impl Limiter for McLimiter {
    fn limit(&self, a: f64, b: f64) -> f64 {
        let min1 = (0.5 * (a + b)).abs().min(2.0 * a.abs());
        0.5 * (a.signum() + b.signum()) * (2.0 * b.abs()).min(min1)
    }
}
