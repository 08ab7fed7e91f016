//! ARIMA(p, d, q) estimation and forecasting
//!
//! The series is differenced `d` times and an ARMA(p, q) without constant is fitted to the
//! result by conditional sum of squares (CSS). Starting values come from the Hannan-Rissanen
//! two step regression, which are then refined with Levenberg-Marquardt using the analytic
//! gradient of the CSS residuals.

use std::f64::consts::PI;
use std::fmt;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use crate::errors::ModelError;

/// Refinement iterations before settling for the best estimate so far
const MAX_ITERATIONS: usize = 200;

/// Relative change in sum of squares counted as converged
const COST_TOLERANCE: f64 = 1e-10;

/// Gradient magnitude counted as converged
const GRADIENT_TOLERANCE: f64 = 1e-9;

const MAX_LAMBDA: f64 = 1e10;

/// Minimum variance of the differenced series
const MIN_VARIANCE: f64 = 1e-12;

/// Model order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> ArimaOrder {
        ArimaOrder { p, d, q }
    }

    /// Fewest observations accepted by fit
    pub fn min_observations(&self) -> usize {
        self.p + self.d + self.q + 10
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// A fitted ARIMA model
#[derive(Debug, Clone)]
pub struct Arima {
    order: ArimaOrder,
    ar_coeffs: Vec<f64>,
    ma_coeffs: Vec<f64>,
    /// The training data differenced d times
    differenced: Vec<f64>,
    /// CSS residuals aligned with `differenced`, zero for the first p entries
    residuals: Vec<f64>,
    /// Last value at each differencing level 0..d, used to undo differencing
    last_levels: Vec<f64>,
    sigma2: f64,
    log_likelihood: f64,
    iterations: usize,
    converged: bool,
}

impl Arima {
    /// Fits a model of the given order to the data
    ///
    /// # Arguments
    ///
    /// * 'data' - observations in time order
    /// * 'order' - the (p, d, q) order
    pub fn fit(data: &[f64], order: ArimaOrder) -> Result<Arima, ModelError> {
        let required = order.min_observations();
        if data.len() < required {
            return Err(ModelError::InsufficientData { required, actual: data.len() });
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(ModelError::InvalidData("data contains NaN or infinite values".to_string()));
        }

        let last_levels = (0..order.d)
            .map(|k| difference(data, k).last().copied().unwrap_or(0.0))
            .collect::<Vec<f64>>();
        let differenced = difference(data, order.d);

        let n = differenced.len();
        let mean = differenced.iter().sum::<f64>() / n as f64;
        let variance = differenced.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        if variance < MIN_VARIANCE {
            return Err(ModelError::Degenerate(
                format!("series is constant after {} difference(s)", order.d)));
        }

        let initial = hannan_rissanen(&differenced, order.p, order.q)?;
        debug!("{} initial estimates {:?}", order, initial);
        let estimate = refine(&differenced, order.p, order.q, initial)?;
        if !estimate.converged {
            warn!("{} fit stopped after {} iterations without converging", order, estimate.iterations);
        }

        let residuals = css_residuals(&differenced, order.p, &estimate.params);
        let m = (n - order.p) as f64;
        let sigma2 = sum_of_squares(&residuals[order.p..]) / m;
        if !sigma2.is_finite() || estimate.params.iter().any(|b| !b.is_finite()) {
            return Err(ModelError::NotConverged("estimates are not finite".to_string()));
        }
        let log_likelihood = -0.5 * m * ((2.0 * PI * sigma2).ln() + 1.0);

        let (ar, ma) = estimate.params.split_at(order.p);
        Ok(Arima {
            order,
            ar_coeffs: ar.to_vec(),
            ma_coeffs: ma.to_vec(),
            differenced,
            residuals,
            last_levels,
            sigma2,
            log_likelihood,
            iterations: estimate.iterations,
            converged: estimate.converged,
        })
    }

    /// Forecasts the given number of steps after the end of the training data.
    /// Future innovations are taken as zero.
    ///
    /// # Arguments
    ///
    /// * 'steps' - number of values to forecast
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let n = self.differenced.len();
        let mut w = self.differenced.clone();
        let mut e = self.residuals.clone();

        for _ in 0..steps {
            let t = w.len();
            let mut next = 0.0;
            for (i, phi) in self.ar_coeffs.iter().enumerate() {
                next += phi * w[t - 1 - i];
            }
            for (j, theta) in self.ma_coeffs.iter().enumerate() {
                if t > j {
                    next += theta * e[t - 1 - j];
                }
            }
            w.push(next);
            e.push(0.0);
        }

        let mut result = w[n..].to_vec();
        for level in (0..self.order.d).rev() {
            result = integrate(&result, self.last_levels[level]);
        }

        result
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coeffs
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coeffs
    }

    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Akaike information criterion, counting the innovation variance as a parameter
    pub fn aic(&self) -> f64 {
        let k = (self.order.p + self.order.q + 1) as f64;
        -2.0 * self.log_likelihood + 2.0 * k
    }

    /// One line description of the fitted model
    pub fn summary(&self) -> String {
        let ar = self.ar_coefficients().iter().map(|c| format!("{:.4}", c)).collect::<Vec<String>>().join(", ");
        let ma = self.ma_coefficients().iter().map(|c| format!("{:.4}", c)).collect::<Vec<String>>().join(", ");
        format!("{}: ar [{}], ma [{}], sigma2 {:.4}, loglik {:.2}, aic {:.2}, {} iterations{}",
                self.order, ar, ma, self.sigma2(), self.log_likelihood, self.aic(), self.iterations,
                if self.converged { "" } else { " (not converged)" })
    }
}

/// Differences the data `d` times
pub fn difference(data: &[f64], d: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..d {
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Reverses one level of differencing
fn integrate(diff: &[f64], start: f64) -> Vec<f64> {
    let mut level = start;
    diff.iter()
        .map(|d| {
            level += d;
            level
        })
        .collect()
}

fn sum_of_squares(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

/// Ordinary least squares through the normal equations
fn least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>, ModelError> {
    if x.nrows() <= x.ncols() {
        return Err(ModelError::InsufficientData { required: x.ncols() + 1, actual: x.nrows() });
    }
    let xtx = x.tr_mul(x);
    let xty = x.tr_mul(y);
    let chol = xtx
        .cholesky()
        .ok_or_else(|| ModelError::Degenerate("singular regression matrix".to_string()))?;

    Ok(chol.solve(&xty))
}

/// Regresses w[t] on w[t-1..=p] for t >= p, returns coefficients and residuals aligned with w
fn fit_long_ar(w: &[f64], p: usize) -> Result<(Vec<f64>, Vec<f64>), ModelError> {
    let n = w.len();
    let rows = n.saturating_sub(p);
    let x = DMatrix::from_fn(rows, p, |r, c| w[r + p - c - 1]);
    let y = DVector::from_fn(rows, |r, _| w[r + p]);
    let coeffs = least_squares(&x, &y)?;

    let mut residuals = vec![0.0; n];
    for t in p..n {
        residuals[t] = w[t] - (0..p).map(|i| coeffs[i] * w[t - i - 1]).sum::<f64>();
    }

    Ok((coeffs.iter().copied().collect(), residuals))
}

/// Hannan-Rissanen starting values: a long autoregression estimates the innovations, which
/// then serve as regressors for the MA part
fn hannan_rissanen(w: &[f64], p: usize, q: usize) -> Result<Vec<f64>, ModelError> {
    if p + q == 0 {
        return Ok(Vec::new());
    }
    if q == 0 {
        return fit_long_ar(w, p).map(|(coeffs, _)| coeffs);
    }

    let n = w.len();
    let m = (p + q).max(10).min(n / 4).max(p + q);
    let (_, innovations) = fit_long_ar(w, m)?;

    let start = (m + q).max(p);
    let rows = n.saturating_sub(start);
    let x = DMatrix::from_fn(rows, p + q, |r, c| {
        let t = r + start;
        if c < p { w[t - c - 1] } else { innovations[t - (c - p) - 1] }
    });
    let y = DVector::from_fn(rows, |r, _| w[r + start]);
    let mut params = least_squares(&x, &y)?.iter().copied().collect::<Vec<f64>>();

    let ma_norm = params[p..].iter().map(|t| t.abs()).sum::<f64>();
    if ma_norm >= 1.0 {
        let scale = 0.9 / ma_norm;
        params[p..].iter_mut().for_each(|t| *t *= scale);
    }

    Ok(params)
}

/// MA polynomial with absolute coefficients summing below one has all roots outside the
/// unit circle
fn invertible(ma: &[f64]) -> bool {
    ma.iter().map(|t| t.abs()).sum::<f64>() < 1.0
}

/// Conditional residuals e[t] = w[t] - sum(phi_i * w[t-i]) - sum(theta_j * e[t-j]) for t >= p,
/// with e[t] = 0 before that
fn css_residuals(w: &[f64], p: usize, params: &[f64]) -> Vec<f64> {
    let (phi, theta) = params.split_at(p);
    let mut e = vec![0.0; w.len()];

    for t in p..w.len() {
        let mut v = w[t];
        for (i, c) in phi.iter().enumerate() {
            v -= c * w[t - i - 1];
        }
        for (j, c) in theta.iter().enumerate() {
            if t > j {
                v -= c * e[t - j - 1];
            }
        }
        e[t] = v;
    }

    e
}

/// Derivatives of the residuals e[p..] with respect to each parameter, by the same
/// recursion that produces the residuals
fn css_jacobian(w: &[f64], p: usize, params: &[f64], e: &[f64]) -> DMatrix<f64> {
    let n = w.len();
    let k = params.len();
    let theta = &params[p..];
    let mut de = vec![vec![0.0; k]; n];

    for t in p..n {
        for c in 0..k {
            let mut v = if c < p {
                -w[t - c - 1]
            } else {
                let lag = c - p + 1;
                if t >= lag { -e[t - lag] } else { 0.0 }
            };
            for (j, th) in theta.iter().enumerate() {
                if t >= p + j + 1 {
                    v -= th * de[t - j - 1][c];
                }
            }
            de[t][c] = v;
        }
    }

    DMatrix::from_fn(n - p, k, |r, c| de[r + p][c])
}

struct Estimate {
    params: Vec<f64>,
    iterations: usize,
    converged: bool,
}

/// Levenberg-Marquardt minimisation of the conditional sum of squares
fn refine(w: &[f64], p: usize, q: usize, initial: Vec<f64>) -> Result<Estimate, ModelError> {
    let k = p + q;
    let mut params = initial;
    if k == 0 {
        return Ok(Estimate { params, iterations: 0, converged: true });
    }

    let mut e = css_residuals(w, p, &params);
    let mut cost = sum_of_squares(&e[p..]);
    if !cost.is_finite() {
        return Err(ModelError::NotConverged("initial estimates give non-finite residuals".to_string()));
    }
    let mut lambda = 1e-3;

    for iteration in 1..=MAX_ITERATIONS {
        let jac = css_jacobian(w, p, &params, &e);
        let r = DVector::from_column_slice(&e[p..]);
        let jtj = jac.tr_mul(&jac);
        let gradient = jac.tr_mul(&r);
        if gradient.amax() < GRADIENT_TOLERANCE {
            return Ok(Estimate { params, iterations: iteration, converged: true });
        }

        let mut improved = false;
        while lambda <= MAX_LAMBDA {
            let mut a = jtj.clone();
            for i in 0..k {
                a[(i, i)] += lambda * jtj[(i, i)].max(MIN_VARIANCE);
            }
            let Some(chol) = a.cholesky() else {
                lambda *= 10.0;
                continue;
            };
            let step = chol.solve(&(-&gradient));
            let candidate = params.iter().zip(step.iter()).map(|(b, s)| b + s).collect::<Vec<f64>>();
            if !invertible(&candidate[p..]) {
                lambda *= 10.0;
                continue;
            }

            let cand_e = css_residuals(w, p, &candidate);
            let cand_cost = sum_of_squares(&cand_e[p..]);
            if cand_cost.is_finite() && cand_cost < cost {
                let relative = (cost - cand_cost) / cost.max(f64::MIN_POSITIVE);
                params = candidate;
                e = cand_e;
                cost = cand_cost;
                lambda = (lambda / 10.0).max(1e-12);
                improved = true;
                if relative < COST_TOLERANCE {
                    return Ok(Estimate { params, iterations: iteration, converged: true });
                }
                break;
            }
            lambda *= 10.0;
        }

        // No descent direction left at any damping, so this is a minimum
        if !improved {
            return Ok(Estimate { params, iterations: iteration, converged: true });
        }
    }

    Ok(Estimate { params, iterations: MAX_ITERATIONS, converged: false })
}
