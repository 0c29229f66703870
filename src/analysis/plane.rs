//! Least-squares plane fit `z = a*x + b*y + c` over scattered samples.

/// Result of a local plane fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneFit {
    /// dz/dx.
    pub a: f64,
    /// dz/dy.
    pub b: f64,
    /// Root-mean-square residual about the plane.
    pub residual_rms: f64,
    /// Number of samples used.
    pub count: usize,
}

impl PlaneFit {
    /// Magnitude of the plane gradient.
    #[inline]
    pub fn gradient_norm(&self) -> f64 {
        self.a.hypot(self.b)
    }

    /// Inclination of the plane in degrees.
    #[inline]
    pub fn slope_deg(&self) -> f64 {
        self.gradient_norm().atan().to_degrees()
    }
}

/// Fit a plane to `(x, y, z)` samples.
///
/// Returns `None` with fewer than three samples or when the samples are
/// (numerically) collinear in the xy plane.
pub fn fit_plane(samples: &[(f64, f64, f64)]) -> Option<PlaneFit> {
    let n = samples.len();
    if n < 3 {
        return None;
    }
    let nf = n as f64;
    let (mut mx, mut my, mut mz) = (0.0, 0.0, 0.0);
    for &(x, y, z) in samples {
        mx += x;
        my += y;
        mz += z;
    }
    mx /= nf;
    my /= nf;
    mz /= nf;

    let (mut sxx, mut syy, mut sxy, mut sxz, mut syz) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for &(x, y, z) in samples {
        let (dx, dy, dz) = (x - mx, y - my, z - mz);
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
        sxz += dx * dz;
        syz += dy * dz;
    }

    let det = sxx * syy - sxy * sxy;
    if det <= 1e-9 * (sxx * syy) || det <= f64::MIN_POSITIVE {
        return None;
    }
    let a = (sxz * syy - syz * sxy) / det;
    let b = (syz * sxx - sxz * sxy) / det;

    let mut ss = 0.0;
    for &(x, y, z) in samples {
        let r = (z - mz) - a * (x - mx) - b * (y - my);
        ss += r * r;
    }

    Some(PlaneFit {
        a,
        b,
        residual_rms: (ss / nf).sqrt(),
        count: n,
    })
}
