//! 曲线拟合.
//!
//! 给定一系列点 `(x, y)`, 该模块可以拟合出一条自然三次样条曲线.
//! 样条工具用它把控制点渲染成边界线.

use ndarray::ArrayView1;

mod cubic_spline;

/// 拟合三次样条曲线并在 `queries` 处求值.
///
/// `x` 是严格递增的数组 (至少三个点), `y` 是对应函数值.
/// 输入不满足要求时返回 `None`.
pub fn cubic_spline_eval_f64<'a>(
    x: ArrayView1<'a, f64>,
    y: ArrayView1<'a, f64>,
    queries: impl IntoIterator<Item = f64>,
) -> Option<Vec<f64>> {
    let s = cubic_spline::CubicSplineImp::new(x, y)?;
    Some(queries.into_iter().map(|q| s.eval(q)).collect())
}

#[cfg(test)]
mod tests {
    use super::cubic_spline_eval_f64;
    use ndarray::array;

    #[test]
    fn test_eval_at_integer_columns() {
        let x = array![10.0, 20.0, 30.0];
        let y = array![5.0, 5.0, 5.0];
        let v = cubic_spline_eval_f64(x.view(), y.view(), (10..=30).map(f64::from)).unwrap();
        assert_eq!(v.len(), 21);
        assert!(v.iter().all(|s| (s - 5.0).abs() < 1e-9));
    }

    #[test]
    fn test_unsorted_knots_rejected() {
        let x = array![10.0, 30.0, 20.0];
        let y = array![1.0, 2.0, 3.0];
        assert!(cubic_spline_eval_f64(x.view(), y.view(), [15.0]).is_none());
    }
}
