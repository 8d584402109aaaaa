///
/// probability calculation
/// implements logaddexp
///
use approx::AbsDiffEq;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::str::FromStr;

///
/// Wrapper of f64 that represents probability `0 <= p <= 1` in log space.
///
/// `p = 0` is stored as `-inf` and every operator special-cases it, so that
/// no combination of zeros (`0 * x`, `0 / 0`, `0 + 0`) produces NaN.
///
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, SerializeDisplay, DeserializeFromStr)]
pub struct Prob(f64);

///
/// short-hand of `Prob::from_prob`
///
pub fn p(p: f64) -> Prob {
    Prob::from_prob(p)
}

///
/// short-hand of `Prob::from_log_prob`
///
pub fn lp(lp: f64) -> Prob {
    Prob::from_log_prob(lp)
}

use once_cell::sync::Lazy;
const MAX_PRECALCULATED_X: usize = 10;
static LN_INTS: Lazy<[f64; MAX_PRECALCULATED_X]> = Lazy::new(|| {
    let mut v = [0f64; MAX_PRECALCULATED_X];
    for x in 0..MAX_PRECALCULATED_X {
        v[x] = (x as f64).ln();
    }
    v
});

///
/// Faster cached log function `(x as f64).ln()`
///
#[inline]
pub fn ln_int(x: usize) -> f64 {
    // if x is small, return the precalculated
    if x < MAX_PRECALCULATED_X {
        LN_INTS[x]
    } else {
        (x as f64).ln()
    }
}

impl Prob {
    ///
    /// `log(p)`. `p = 0` becomes the log-zero sentinel.
    ///
    pub fn from_prob(value: f64) -> Prob {
        if value == 0.0 {
            Prob::zero()
        } else {
            Prob(value.ln())
        }
    }
    ///
    ///
    pub fn from_log_prob(log_value: f64) -> Prob {
        Prob(log_value)
    }
    ///
    /// Get the probability (in `[0, 1]`), `exp(log p)`.
    /// The log-zero sentinel becomes exactly `0.0`.
    pub fn to_value(self) -> f64 {
        if self.is_zero() {
            0.0
        } else {
            self.0.exp()
        }
    }
    ///
    /// Get the log probability
    pub fn to_log_value(self) -> f64 {
        self.0
    }
    ///
    /// Is `p == 0` or not? (log p = -inf)
    ///
    pub fn is_zero(self) -> bool {
        self.0.is_infinite() && self.0.is_sign_negative()
    }
    ///
    /// Is `p == 1`? (log p = 0)
    ///
    pub fn is_one(self) -> bool {
        self.0 == 0.0
    }
    ///
    /// prob=0.0
    ///
    pub fn zero() -> Prob {
        Prob(f64::NEG_INFINITY)
    }
    ///
    /// prob=1.0
    ///
    pub fn one() -> Prob {
        Prob(0.0)
    }
    ///
    /// Negated log probability `-log p`, used as a path cost.
    /// `p = 0` has infinite cost.
    ///
    pub fn to_cost(self) -> f64 {
        -self.0
    }
}

///
/// Accumulator of the log-sum-exp reduction.
///
/// Keeps the running maximum `m` and `s = \sum_i exp(x_i - m)`. When a
/// larger element arrives, `s` is rescaled to the new maximum, so all the
/// exponentiated terms stay in `[0, 1]`. The result is `m + ln(s)`.
///
#[derive(Clone, Copy, Debug)]
pub struct LogSumExp {
    max: f64,
    scaled: f64,
}

impl LogSumExp {
    pub fn new() -> Self {
        LogSumExp {
            max: f64::NEG_INFINITY,
            scaled: 0.0,
        }
    }
    pub fn add(&mut self, x: Prob) {
        if x.is_zero() {
            return;
        }
        let x = x.0;
        if self.scaled == 0.0 {
            self.max = x;
            self.scaled = 1.0;
        } else if x > self.max {
            self.scaled = self.scaled * (self.max - x).exp() + 1.0;
            self.max = x;
        } else {
            self.scaled += (x - self.max).exp();
        }
    }
    pub fn result(&self) -> Prob {
        if self.scaled == 0.0 {
            Prob::zero()
        } else {
            Prob(self.max + self.scaled.ln())
        }
    }
}

impl Default for LogSumExp {
    fn default() -> Self {
        LogSumExp::new()
    }
}

/// p=0 (Prob(-inf)) as a default value
impl Default for Prob {
    fn default() -> Self {
        Prob::zero()
    }
}

///
/// Prob has multiplicative identity element
/// `num_traits::One`
///
impl num_traits::One for Prob {
    fn one() -> Self {
        Prob::one()
    }
}

///
/// Prob has additive identity element
/// `num_traits::Zero`
///
impl num_traits::Zero for Prob {
    fn zero() -> Self {
        Prob::zero()
    }
    fn is_zero(&self) -> bool {
        Prob::is_zero(*self)
    }
}

// display
impl std::fmt::Display for Prob {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}({:.4})", self.0, self.to_value())
    }
}
impl FromStr for Prob {
    type Err = std::num::ParseFloatError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let front = match s.split_once('(') {
            Some((front, _)) => front,
            None => s,
        };
        front.trim().parse::<f64>().map(Prob)
    }
}

/// Addition of two probabilities `px + py` in log space
///
/// If `px > py`:
///
/// ```text
/// log(exp(x) + exp(y))
///  = log(exp(x) (1 + exp(y-x)))
///  = log(exp(x)) + log(1 + exp(y-x))
///  = x + log(1 + exp(y-x))
/// ```
impl std::ops::Add for Prob {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        let x = self.0;
        let y = other.0;
        let (x, y) = if x >= y { (x, y) } else { (y, x) };
        if y == f64::NEG_INFINITY {
            // x + 0 = x
            Prob(x)
        } else if x == y {
            // x + x = 2x
            Prob(x + 2f64.ln())
        } else {
            Prob(x + (y - x).exp().ln_1p())
        }
    }
}

/// Multiplication of two probabilities `px * py` in log space
///
/// ```text
/// log(px * py) = log(px) + log(py)
/// ```
///
/// `0 * py = 0` for any `py`.
impl std::ops::Mul for Prob {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        if self.is_zero() || other.is_zero() {
            Prob::zero()
        } else {
            Prob(self.0 + other.0)
        }
    }
}

/// Division of two probabilities `px / py` in log space
///
/// ```text
/// log(px / py) = log(px) - log(py)
/// ```
///
/// `0 / py = 0` for any `py`, including `py = 0`.
impl std::ops::Div for Prob {
    type Output = Self;
    fn div(self, other: Self) -> Self {
        if self.is_zero() {
            Prob::zero()
        } else {
            Prob(self.0 - other.0)
        }
    }
}

// assign
impl std::ops::AddAssign for Prob {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}
impl std::ops::MulAssign for Prob {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}
impl std::ops::DivAssign for Prob {
    fn div_assign(&mut self, other: Self) {
        *self = *self / other;
    }
}
// sum/prod
impl std::iter::Sum for Prob {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        let mut acc = LogSumExp::new();
        for x in iter {
            acc.add(x);
        }
        acc.result()
    }
}
impl<'a> std::iter::Sum<&'a Self> for Prob {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
impl std::iter::Product for Prob {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Prob::one(), |a, b| a * b)
    }
}
impl<'a> std::iter::Product<&'a Self> for Prob {
    fn product<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Prob::one(), |a, b| a * *b)
    }
}

//
// Prob div usize
//

/// Division of Prob and usize `p / c`
///
impl std::ops::Div<usize> for Prob {
    type Output = Self;
    fn div(self, rhs: usize) -> Self {
        if rhs == 0 {
            panic!("zero division error")
        } else {
            self / Prob(ln_int(rhs))
        }
    }
}

/// for approx `assert_abs_diff_eq`
impl AbsDiffEq for Prob {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        if self.is_zero() || other.is_zero() {
            self.is_zero() && other.is_zero()
        } else {
            f64::abs_diff_eq(&self.0, &other.0, epsilon)
        }
    }
}

impl Eq for Prob {}
impl Ord for Prob {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_id() {
        let x = Prob::from_prob(0.3);
        let e = Prob::from_prob(0.0);
        assert_relative_eq!((x + e).0, x.0);
        assert!((x * e).is_zero());
    }
    #[test]
    fn test_sum() {
        let xs = vec![
            Prob::from_prob(0.1),
            Prob::from_prob(0.1),
            Prob::from_prob(0.1),
        ];
        let x: Prob = xs.iter().sum();
        let y = Prob::from_prob(0.3);
        assert_relative_eq!(x.to_value(), y.to_value());
    }
    #[test]
    fn test_prod() {
        let xs = vec![
            Prob::from_prob(0.1),
            Prob::from_prob(0.1),
            Prob::from_prob(0.1),
        ];
        let x: Prob = xs.iter().product();
        let y = Prob::from_prob(0.001);
        assert_relative_eq!(x.to_value(), y.to_value());
    }
    #[test]
    fn prob_add_mul() {
        assert_eq!(p(0.0) + p(1.0), p(1.0));
        assert_eq!(p(0.0) * p(1.0), p(0.0));
        assert_abs_diff_eq!((p(0.3) + p(0.3)).0, p(0.6).0);
        assert_abs_diff_eq!((p(0.3) * p(0.3)).0, p(0.09).0);
        assert_abs_diff_eq!((p(0.5) + p(0.00001)).0, p(0.50001).0);
        assert_abs_diff_eq!((p(0.5) * p(0.00001)).0, p(0.000005).0);
    }
    #[test]
    fn prob_sum_prod() {
        // sum/prod of zero element vec
        let xs: Vec<Prob> = vec![];
        let sum: Prob = xs.iter().sum();
        let product: Prob = xs.iter().product();
        assert_eq!(sum, p(0.0));
        assert_eq!(product, p(1.0));

        // sum/prod of vec of p=0
        let xs: Vec<Prob> = vec![p(0.0), p(0.0)];
        let sum: Prob = xs.iter().sum();
        let product: Prob = xs.iter().product();
        assert_eq!(sum, p(0.0));
        assert_eq!(product, p(0.0));
    }
    #[test_case(0.0 ; "zero")]
    #[test_case(0.25 ; "quarter")]
    #[test_case(1.0 ; "one")]
    #[test_case(1e-300 ; "tiny")]
    fn zero_is_identity_of_sum_and_absorbing_in_product(y: f64) {
        let zero = Prob::zero();
        let y = p(y);
        assert_eq!(zero + y, y);
        assert_eq!(y + zero, y);
        assert!((zero * y).is_zero());
        assert!((y * zero).is_zero());
        assert!((zero / y).is_zero());
    }
    #[test]
    fn zero_never_produces_nan() {
        let zero = Prob::zero();
        let inf = Prob::from_log_prob(f64::INFINITY);
        assert!((zero * inf).is_zero());
        assert!((zero / zero).is_zero());
        assert!((zero + zero).is_zero());
        assert_eq!(zero.to_value(), 0.0);
        let s: Prob = vec![zero, zero, zero].into_iter().sum();
        assert!(s.is_zero());
    }
    #[test_case(-0.1 ; "near one")]
    #[test_case(-5.0 ; "small")]
    #[test_case(-700.0 ; "subnormal region")]
    fn log_exp_round_trip(v: f64) {
        let x = lp(v).to_value();
        assert_relative_eq!(p(x).to_value(), x, max_relative = 1e-12);
    }
    #[test]
    fn sum_of_many_tiny_terms_does_not_underflow() {
        // 1000 terms of exp(-1000) each; linear sum underflows to 0.
        let xs = vec![lp(-1000.0); 1000];
        let s: Prob = xs.iter().sum();
        assert_abs_diff_eq!(s.to_log_value(), -1000.0 + 1000f64.ln(), epsilon = 1e-9);
        // and the pairwise fold agrees
        let pairwise = xs.iter().fold(Prob::zero(), |a, &b| a + b);
        assert_abs_diff_eq!(s.to_log_value(), pairwise.to_log_value(), epsilon = 1e-9);
    }
    #[test]
    fn sum_is_order_independent() {
        let xs = vec![p(0.5), lp(-30.0), p(0.0), p(0.25), lp(-3.0)];
        let mut ys = xs.clone();
        ys.reverse();
        let a: Prob = xs.iter().sum();
        let b: Prob = ys.iter().sum();
        assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        assert_abs_diff_eq!(
            a.to_value(),
            0.5 + (-30f64).exp() + 0.25 + (-3f64).exp(),
            epsilon = 1e-12
        );
    }
    #[test]
    fn test_prob_assign() {
        let mut x = p(0.4);
        let y = p(0.2);
        x += y;
        assert_abs_diff_eq!(x, p(0.6), epsilon = 1e-12);
        let z = p(0.5);
        x *= z;
        assert_abs_diff_eq!(x, p(0.3), epsilon = 1e-12);
        x /= z;
        assert_abs_diff_eq!(x, p(0.6), epsilon = 1e-12);
        let o = p(1.0);
        x *= o;
        assert_abs_diff_eq!(x, p(0.6), epsilon = 1e-12);
        let z = p(0.0);
        x += z;
        assert_abs_diff_eq!(x, p(0.6), epsilon = 1e-12);
        x *= z;
        assert!(x.is_zero());
    }
    #[test]
    fn prob_sort() {
        let mut ps = vec![p(0.9), p(0.2), p(0.5), p(0.1), p(1.0), p(0.0)];
        ps.sort();
        assert_eq!(ps[0], p(0.0));
        assert_eq!(ps[1], p(0.1));
        assert_eq!(ps[2], p(0.2));
        assert_eq!(ps[3], p(0.5));
        assert_eq!(ps[4], p(0.9));
        assert_eq!(ps[5], p(1.0));
    }
    #[test]
    fn prob_assert_eq() {
        assert!(abs_diff_eq!(p(0.1), p(0.1)));
        assert!(!abs_diff_eq!(p(0.1), p(0.2)));
        assert!(abs_diff_eq!(p(0.1), p(0.11), epsilon = 0.1));
        assert!(abs_diff_eq!(p(0.0), p(0.0)));
        assert!(!abs_diff_eq!(p(0.0), p(0.1), epsilon = 100.0));
    }
    #[test]
    fn prob_serialize() {
        // Display and FromStr
        let p1 = Prob::one();
        let p05 = Prob::from_prob(0.5);
        let p0 = Prob::zero();
        assert_eq!(Prob::from_str(&p1.to_string()).unwrap(), p1);
        assert_eq!(Prob::from_str(&p05.to_string()).unwrap(), p05);
        assert_eq!(Prob::from_str(&p0.to_string()).unwrap(), p0);

        let f = |p: Prob| {
            let json = &serde_json::to_string(&p).unwrap();
            serde_json::from_str(&json).unwrap()
        };
        assert_eq!(p1, f(p1));
        assert_eq!(p05, f(p05));
        assert_eq!(p0, f(p0));
    }
    #[test]
    fn prob_div_usize() {
        assert_eq!(p(1.0), p(1.0) / 1);
        assert_eq!(p(0.5), p(1.0) / 2);
        assert_eq!(p(0.0), p(0.0) / 2);
    }
    #[test]
    fn const_log_int() {
        for x in 0..100 {
            assert_eq!(ln_int(x), (x as f64).ln());
        }
    }
    #[test]
    fn cost_of_zero_is_infinite() {
        assert_eq!(Prob::zero().to_cost(), f64::INFINITY);
        assert_eq!(Prob::one().to_cost(), 0.0);
    }
}
