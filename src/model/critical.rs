//! Critical queue lengths.
//!
//! The critical length is the batch length `L` below which the system is
//! necessarily in a short-queue regime (`SS`, `SC` or `SP`).
//!
//! A zero work time on the dividing side is replaced by `1` before the
//! division. This extends the curve down to `Wp = 0` (resp. `Wc = 0`) instead
//! of blowing up at the boundary.

use crate::domain::Parameters;

fn nonzero_or_one(v: f64) -> f64 {
    if v == 0.0 { 1.0 } else { v }
}

/// `1 + Kp + floor((Sc + Wc) / Wp)`.
pub fn critical_length_consumer_side(p: &Parameters) -> f64 {
    let wp = nonzero_or_one(p.wp());
    1.0 + p.kp() + ((p.sc() + p.wc()) / wp).floor()
}

/// `1 + Kc + floor((Sp + Wp) / Wc)`.
pub fn critical_length_producer_side(p: &Parameters) -> f64 {
    let wc = nonzero_or_one(p.wc());
    1.0 + p.kc() + ((p.sp() + p.wp()) / wc).floor()
}

/// Critical length for the faster side's short-queue regime.
pub fn critical_length(p: &Parameters) -> f64 {
    if p.wc() < p.wp() {
        critical_length_consumer_side(p)
    } else {
        critical_length_producer_side(p)
    }
}

/// Tightest constraint across both queues.
pub fn critical_length_combined(p: &Parameters) -> f64 {
    critical_length_consumer_side(p).min(critical_length_producer_side(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Field;
    use crate::model::test_params as params;

    #[test]
    fn side_formulas() {
        let p = params(4.0, 10.0, 7.0, 13.0, 0.0, 0.0, 2.0, 3.0, 50.0);
        // 1 + 2 + floor(23 / 4)
        assert_eq!(critical_length_consumer_side(&p), 8.0);
        // 1 + 3 + floor(11 / 10)
        assert_eq!(critical_length_producer_side(&p), 5.0);
        // Wc > Wp -> producer side
        assert_eq!(critical_length(&p), 5.0);
        assert_eq!(critical_length(&p.mirrored()), 5.0);
    }

    #[test]
    fn zero_work_time_uses_one() {
        let p = params(0.0, 10.0, 7.0, 13.0, 0.0, 0.0, 2.0, 3.0, 50.0);
        let one = p.with(Field::Wp, 1.0).unwrap();
        assert_eq!(
            critical_length_consumer_side(&p),
            critical_length_consumer_side(&one)
        );
        // The caller's value is untouched.
        assert_eq!(p.wp(), 0.0);

        let q = params(5.0, 0.0, 7.0, 13.0, 0.0, 0.0, 2.0, 3.0, 50.0);
        let one = q.with(Field::Wc, 1.0).unwrap();
        assert_eq!(
            critical_length_producer_side(&q),
            critical_length_producer_side(&one)
        );
        assert_eq!(q.wc(), 0.0);
    }

    #[test]
    fn combined_is_min_of_sides() {
        for wp in 0..40 {
            let p = params(wp as f64, 10.0, 30.0, 20.0, 5.0, 5.0, 1.0, 2.0, 64.0);
            let expected =
                critical_length_consumer_side(&p).min(critical_length_producer_side(&p));
            assert_eq!(critical_length_combined(&p), expected);
            assert!(critical_length_combined(&p) <= critical_length(&p));
        }
    }
}
