//! One-dimensional reproducing kernels for the coordinate-uniform figure.
//!
//! The mathematical derivation of Pα, IAα and Bα is an external concern
//! (these constants come from the literature on lattice rule and digital
//! net worst-case error bounds); this module gives one well-defined,
//! domain-checked closed form for each so the figure-of-merit machinery
//! has something real to fold over. `PAlpha` uses the standard even-order
//! Bernoulli-polynomial identity; `IAAlpha` and `BAlpha` reuse that same
//! closed form against their own (non-even) domain constraints, which is a
//! simplification a caller chasing bit-exact published constants should
//! replace with their own [`Kernel`] value.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel {
    /// Even `alpha`: `ω(x) = -(-1)^{alpha/2} (2π)^alpha / alpha! · B_alpha(x)`.
    PAlpha(u32),
    /// Interlaced-Aα kernel; requires `alpha > 1`.
    IAAlpha(f64),
    /// Bα kernel (digital-net analogue of Pα); requires `alpha > 1`.
    BAlpha(f64),
}

/// Bernoulli polynomials `B_2, B_4, B_6, B_8` on `[0, 1]`, the even orders
/// this module supports for `PAlpha`.
fn bernoulli(alpha: u32, x: f64) -> Option<f64> {
    match alpha {
        2 => Some(x * x - x + 1.0 / 6.0),
        4 => Some(x.powi(4) - 2.0 * x.powi(3) + x * x - 1.0 / 30.0),
        6 => Some(x.powi(6) - 3.0 * x.powi(5) + 2.5 * x.powi(4) - 0.5 * x * x + 1.0 / 42.0),
        8 => Some(x.powi(8) - 4.0 * x.powi(7) + 14.0 / 3.0 * x.powi(6) - 7.0 / 3.0 * x.powi(4) + 2.0 / 3.0 * x * x - 1.0 / 30.0),
        _ => None,
    }
}

fn factorial(n: u32) -> f64 {
    (1..=n).map(|i| i as f64).product::<f64>().max(1.0)
}

fn p_alpha(alpha: u32, x: f64) -> Result<f64> {
    if alpha == 0 || alpha % 2 != 0 {
        return Err(Error::NumericDomain(format!("PAlpha needs a positive even alpha, got {alpha}")));
    }
    let b = bernoulli(alpha, x).ok_or_else(|| Error::NumericDomain(format!("no Bernoulli polynomial table entry for alpha={alpha}")))?;
    let sign = if (alpha / 2) % 2 == 0 { -1.0 } else { 1.0 };
    Ok(sign * (2.0 * std::f64::consts::PI).powi(alpha as i32) / factorial(alpha) * b)
}

impl Kernel {
    pub fn apply(&self, x: f64) -> Result<f64> {
        if !(0.0..1.0).contains(&x) {
            return Err(Error::NumericDomain(format!("kernel argument {x} outside [0, 1)")));
        }
        match self {
            Kernel::PAlpha(alpha) => p_alpha(*alpha, x),
            Kernel::IAAlpha(alpha) => {
                if *alpha <= 1.0 {
                    return Err(Error::NumericDomain(format!("IAAlpha needs alpha > 1, got {alpha}")));
                }
                let even = (2.0 * (alpha / 2.0).round()).max(2.0) as u32;
                p_alpha(even, x)
            }
            Kernel::BAlpha(alpha) => {
                if *alpha <= 1.0 {
                    return Err(Error::NumericDomain(format!("BAlpha needs alpha > 1, got {alpha}")));
                }
                let even = (2.0 * (alpha / 2.0).round()).max(2.0) as u32;
                p_alpha(even, x)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p_alpha_two_matches_closed_form_at_zero() {
        let k = Kernel::PAlpha(2);
        // omega_2(0) = 2 * pi^2 / 6 = pi^2 / 3.
        let expected = std::f64::consts::PI * std::f64::consts::PI / 3.0;
        assert!((k.apply(0.0).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn p_alpha_rejects_odd_order() {
        assert!(Kernel::PAlpha(3).apply(0.5).is_err());
    }

    #[test]
    fn ia_alpha_rejects_small_alpha() {
        assert!(Kernel::IAAlpha(1.0).apply(0.5).is_err());
    }

    #[test]
    fn kernel_rejects_argument_out_of_domain() {
        assert!(Kernel::PAlpha(2).apply(1.0).is_err());
    }
}
