//! 三次样条曲线.

use ndarray::{s, Array2, ArrayView1};

// ref: https://zhuanlan.zhihu.com/p/628508199

/// 自然三次样条. 系数矩阵每行为 `(b, c, d)`,
/// 第 `i` 段曲线为 `y_i + b·dx + c·dx² + d·dx³`.
pub(crate) struct CubicSplineImp<'a> {
    x: ArrayView1<'a, f64>,
    y: ArrayView1<'a, f64>,
    coe: Array2<f64>,
}

impl<'a> CubicSplineImp<'a> {
    /// `x` 必须严格递增, 且至少有三个点. 否则返回 `None`.
    pub fn new(x: ArrayView1<'a, f64>, y: ArrayView1<'a, f64>) -> Option<Self> {
        if x.len() != y.len() || x.len() < 3 {
            return None;
        }
        if !x.windows(2).into_iter().all(|v| v[0] < v[1]) {
            return None;
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return None;
        }
        let coe = Self::spline_coefficient(x, y);
        Some(Self { x, y, coe })
    }

    /// 在 `xq` 处求值. 超出端点时沿首末段外推.
    pub fn eval(&self, xq: f64) -> f64 {
        let len = self.x.len();
        let inner = self.x.slice(s![1..len - 1]);
        let i = inner.iter().take_while(|&&v| v <= xq).count();
        let dx = xq - self.x[i];
        let (b, c, d) = (self.coe[(i, 0)], self.coe[(i, 1)], self.coe[(i, 2)]);
        self.y[i] + dx * (b + dx * (c + dx * d))
    }

    fn spline_coefficient(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Array2<f64> {
        let len = x.len();
        let dx: Vec<f64> = x.windows(2).into_iter().map(|v| v[1] - v[0]).collect();
        let dy: Vec<f64> = y.windows(2).into_iter().map(|v| v[1] - v[0]).collect();

        // 自然边界: 首末二阶导为 0, 其余行为三对角.
        let mut sub = vec![0.0; len];
        let mut diag = vec![1.0; len];
        let mut sup = vec![0.0; len];
        let mut r = vec![0.0; len];
        for i in 1..(len - 1) {
            sub[i] = dx[i - 1];
            diag[i] = 2.0 * (dx[i - 1] + dx[i]);
            sup[i] = dx[i];
            r[i] = 3.0 * (dy[i] / dx[i] - dy[i - 1] / dx[i - 1]);
        }
        let c = Self::solve_tridiagonal(&sub, &diag, &sup, &r);

        let mut coe: Array2<f64> = Array2::zeros((len - 1, 3));
        for i in 0..(len - 1) {
            coe[(i, 1)] = c[i];
            coe[(i, 2)] = (c[i + 1] - c[i]) / (3.0 * dx[i]);
            coe[(i, 0)] = dy[i] / dx[i] - dx[i] * (2.0 * c[i] + c[i + 1]) / 3.0;
        }
        coe
    }

    /// Thomas 算法. `sub[0]` 与 `sup[n - 1]` 不参与计算.
    fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Vec<f64> {
        let n = diag.len();
        let mut cp = vec![0.0; n];
        let mut dp = vec![0.0; n];
        cp[0] = sup[0] / diag[0];
        dp[0] = rhs[0] / diag[0];
        for i in 1..n {
            let m = diag[i] - sub[i] * cp[i - 1];
            cp[i] = sup[i] / m;
            dp[i] = (rhs[i] - sub[i] * dp[i - 1]) / m;
        }
        let mut out = dp;
        for i in (0..n - 1).rev() {
            out[i] -= cp[i] * out[i + 1];
        }
        out
    }
}
