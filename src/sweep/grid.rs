//! Sweep value grids.
//!
//! A sweep evaluates the model at evenly spaced values of one field, holding
//! the other eight fixed. The grid is deterministic given the range.

use crate::domain::{Field, Parameters, SweepRange};
use crate::error::AppError;

/// Default ranges span `RANGE_MULT` times a reference value.
pub const RANGE_MULT: f64 = 4.0;

/// Refuse grids larger than this (a typo in `--step` should not eat the machine).
pub const MAX_POINTS: usize = 1_000_000;

/// Rough point count of a default range over a field other than `Wp`.
pub const DEFAULT_POINTS: f64 = 1000.0;

/// Default sweep for `field`.
///
/// - `Wp`: `0, 1, ..., RANGE_MULT*Wc - 2`, always containing `Wp = 0`
/// - any other field: from its smallest valid value (`1` for `L`, `0`
///   otherwise) up to `RANGE_MULT` times its current value, in whole steps
///   chosen so the grid stays around `DEFAULT_POINTS` long
pub fn default_range(p: &Parameters, field: Field) -> SweepRange {
    if field == Field::Wp {
        return SweepRange {
            field,
            start: 0.0,
            end: (RANGE_MULT * p.wc() - 1.0).max(1.0),
            step: 1.0,
        };
    }

    let start = if field == Field::L { 1.0 } else { 0.0 };
    let end = (RANGE_MULT * p.get(field)).max(start + 1.0);
    SweepRange {
        field,
        start,
        end,
        step: ((end - start) / DEFAULT_POINTS).ceil().max(1.0),
    }
}

/// Expand a range into its values (`start`, `start+step`, ... `< end`).
pub fn sweep_values(range: &SweepRange) -> Result<Vec<f64>, AppError> {
    let SweepRange { start, end, step, .. } = *range;
    if !(start.is_finite() && end.is_finite() && step.is_finite()) {
        return Err(AppError::new(
            2,
            format!("Invalid sweep range: start={start}, end={end}, step={step} (must be finite)."),
        ));
    }
    if step <= 0.0 {
        return Err(AppError::new(2, format!("Sweep step must be > 0 (got {step}).")));
    }
    if end <= start {
        return Err(AppError::new(
            2,
            format!("Empty sweep range: end={end} must be greater than start={start}."),
        ));
    }

    let n = ((end - start) / step).ceil() as usize;
    if n > MAX_POINTS {
        return Err(AppError::new(
            2,
            format!("Sweep has {n} points (limit {MAX_POINTS}); increase --step."),
        ));
    }

    // Multiply instead of accumulating to avoid drift on long grids.
    Ok((0..n)
        .map(|i| start + step * i as f64)
        .filter(|&x| x < end)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_params as params;

    #[test]
    fn default_range_matches_chart_domain() {
        let p = params(5.0, 10.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 20.0);
        let range = default_range(&p, Field::Wp);
        let values = sweep_values(&range).unwrap();
        assert_eq!(values.len(), 39);
        assert_eq!(values.first(), Some(&0.0));
        assert_eq!(values.last(), Some(&38.0));
    }

    #[test]
    fn default_range_never_empty() {
        let p = params(5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 20.0);
        let values = sweep_values(&default_range(&p, Field::Wp)).unwrap();
        assert_eq!(values, vec![0.0]);
    }

    #[test]
    fn default_range_per_field_is_valid() {
        let p = params(80.0, 100.0, 400.0, 400.0, 200.0, 200.0, 1.0, 1.0, 100.0);

        let l = default_range(&p, Field::L);
        assert_eq!((l.start, l.end, l.step), (1.0, 400.0, 1.0));
        let values = sweep_values(&l).unwrap();
        assert_eq!(values.len(), 399);
        for x in values {
            assert!(p.with(Field::L, x).is_ok());
        }

        let kp = default_range(&p, Field::Kp);
        assert_eq!(sweep_values(&kp).unwrap(), vec![0.0, 1.0, 2.0, 3.0]);

        // Large values get a coarser step instead of a huge grid.
        let q = p.with(Field::Sc, 1e6).unwrap();
        let sc = default_range(&q, Field::Sc);
        assert_eq!(sc.step, 4000.0);
        assert_eq!(sweep_values(&sc).unwrap().len(), 1000);

        // Zero-valued fields still give one point.
        let z = p.with(Field::Np, 0.0).unwrap();
        assert_eq!(sweep_values(&default_range(&z, Field::Np)).unwrap(), vec![0.0]);
    }

    #[test]
    fn fractional_step() {
        let range = SweepRange { field: Field::Sc, start: 1.0, end: 2.0, step: 0.25 };
        assert_eq!(sweep_values(&range).unwrap(), vec![1.0, 1.25, 1.5, 1.75]);
    }

    #[test]
    fn rejects_bad_ranges() {
        let bad_step = SweepRange { field: Field::Wp, start: 0.0, end: 10.0, step: 0.0 };
        assert_eq!(sweep_values(&bad_step).unwrap_err().exit_code(), 2);
        let empty = SweepRange { field: Field::Wp, start: 5.0, end: 5.0, step: 1.0 };
        assert!(sweep_values(&empty).is_err());
        let huge = SweepRange { field: Field::Wp, start: 0.0, end: 1e9, step: 1.0 };
        assert!(sweep_values(&huge).is_err());
    }
}
