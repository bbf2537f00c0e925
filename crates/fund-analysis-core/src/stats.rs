use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

/// Arithmetic mean of a slice; zero for an empty slice.
pub fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = values.iter().sum();
    sum / Decimal::from(values.len() as i64)
}

/// Sample variance (n-1 denominator)
pub fn sample_variance(values: &[Decimal], mean: Decimal) -> Decimal {
    let n = values.len();
    if n < 2 {
        return Decimal::ZERO;
    }
    let sum_sq: Decimal = values.iter().map(|x| (x - mean) * (x - mean)).sum();
    sum_sq / Decimal::from((n - 1) as i64)
}

/// Sample covariance between two equally long series (n-1 denominator)
pub fn covariance(x: &[Decimal], y: &[Decimal], x_mean: Decimal, y_mean: Decimal) -> Decimal {
    let n = x.len().min(y.len());
    if n < 2 {
        return Decimal::ZERO;
    }
    let sum: Decimal = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
        .sum();
    sum / Decimal::from((n - 1) as i64)
}

/// Square root via Decimal::sqrt(); zero for non-positive input.
pub fn sqrt_decimal(val: Decimal) -> Decimal {
    if val <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    val.sqrt().unwrap_or(Decimal::ZERO)
}

/// Annualised sample standard deviation of periodic returns.
pub fn annualized_volatility(returns: &[Decimal], periods_per_year: Decimal) -> Decimal {
    let std_dev = sqrt_decimal(sample_variance(returns, mean(returns)));
    std_dev * sqrt_decimal(periods_per_year)
}

/// Arithmetic annualisation of the mean periodic return.
pub fn annualized_mean_return(returns: &[Decimal], periods_per_year: Decimal) -> Decimal {
    mean(returns) * periods_per_year
}

/// Sharpe ratio with a zero-volatility guard.
pub fn sharpe_ratio(annual_return: Decimal, risk_free_rate: Decimal, volatility: Decimal) -> Decimal {
    if volatility.is_zero() {
        Decimal::ZERO
    } else {
        (annual_return - risk_free_rate) / volatility
    }
}

/// NAV path compounded from 1.0; the result holds `returns.len() + 1` points
/// with the initial 1.0 at index 0.
pub fn nav_path(returns: &[Decimal]) -> Vec<Decimal> {
    let mut path = Vec::with_capacity(returns.len() + 1);
    let mut nav = Decimal::ONE;
    path.push(nav);
    for r in returns {
        nav *= Decimal::ONE + r;
        path.push(nav);
    }
    path
}

/// Maximum drawdown along the compounded NAV path, as a non-positive fraction:
/// min over t of (nav_t / running_peak_t - 1).
pub fn max_drawdown(returns: &[Decimal]) -> Decimal {
    let mut nav = Decimal::ONE;
    let mut peak = Decimal::ONE;
    let mut max_dd = Decimal::ZERO;

    for r in returns {
        nav *= Decimal::ONE + r;
        if nav > peak {
            peak = nav;
        }
        if peak > Decimal::ZERO {
            let dd = nav / peak - Decimal::ONE;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Geometric annualisation of a total return over `periods` observations.
pub fn annualize_total_return(total_return: Decimal, periods: usize, periods_per_year: Decimal) -> Decimal {
    if periods == 0 {
        return Decimal::ZERO;
    }
    let growth = Decimal::ONE + total_return;
    if growth <= Decimal::ZERO {
        return dec!(-1);
    }
    let exponent = periods_per_year / Decimal::from(periods as i64);
    growth
        .checked_powd(exponent)
        .map(|g| g - Decimal::ONE)
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[dec!(1), dec!(2), dec!(3)]), dec!(2));
        assert_eq!(mean(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_sample_variance() {
        let data = [dec!(2), dec!(4), dec!(4), dec!(4), dec!(5), dec!(5), dec!(7), dec!(9)];
        let v = sample_variance(&data, mean(&data));
        // Known population variance 4, sample variance 32/7
        assert!((v - dec!(32) / dec!(7)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(sqrt_decimal(dec!(0)), Decimal::ZERO);
        assert_eq!(sqrt_decimal(dec!(-4)), Decimal::ZERO);
        assert!((sqrt_decimal(dec!(9)) - dec!(3)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_nav_path_starts_at_one() {
        let path = nav_path(&[dec!(0.10), dec!(-0.05)]);
        assert_eq!(path[0], Decimal::ONE);
        assert_eq!(path.len(), 3);
        assert!((path[1] - dec!(1.10)).abs() < dec!(0.0000001));
        assert!((path[2] - dec!(1.045)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_max_drawdown_non_positive() {
        assert_eq!(max_drawdown(&[dec!(0.01), dec!(0.02)]), Decimal::ZERO);
        let dd = max_drawdown(&[dec!(0.10), dec!(-0.20), dec!(0.05)]);
        assert!(dd < Decimal::ZERO);
        assert!((dd - dec!(-0.20)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_max_drawdown_worked_example() {
        // NAV path [1.01, 1.0302, 1.019898, 1.0351965...]; the only drawdown
        // is the -1% period against the 1.0302 peak.
        let dd = max_drawdown(&[dec!(0.01), dec!(0.02), dec!(-0.01), dec!(0.015)]);
        assert!((dd - dec!(-0.01)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_annualize_total_return() {
        // 10% over half a year of daily periods compounds to ~21% annualised
        let annual = annualize_total_return(dec!(0.10), 126, dec!(252));
        assert!(annual > dec!(0.20));
        assert!(annual < dec!(0.22));
        // A full year is the identity
        let flat = annualize_total_return(dec!(0.10), 252, dec!(252));
        assert!((flat - dec!(0.10)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_annualize_wipeout() {
        assert_eq!(annualize_total_return(dec!(-1), 10, dec!(252)), dec!(-1));
    }

    #[test]
    fn test_sharpe_zero_volatility() {
        assert_eq!(sharpe_ratio(dec!(0.08), dec!(0.02), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_covariance_of_identical_series_is_variance() {
        let data = [dec!(0.01), dec!(-0.02), dec!(0.03), dec!(0.01)];
        let m = mean(&data);
        let var = sample_variance(&data, m);
        let cov = covariance(&data, &data, m, m);
        assert!((var - cov).abs() < dec!(0.0000000001));
    }
}
