//! Platinum RTD resistance to temperature conversion
//!
//! Above 0°C the Callendar-Van Dusen equation reduces to a quadratic in
//! temperature that can be solved directly. Below 0°C the cubic C term
//! matters, so a 5th-order polynomial fit in resistance (normalized to a
//! 100 Ω element) is used instead. See Analog Devices AN709.

use rtdview_core::traits::SensorError;

/// Callendar-Van Dusen A coefficient (IEC 60751)
pub const RTD_A: f32 = 3.9083e-3;

/// Callendar-Van Dusen B coefficient (IEC 60751)
pub const RTD_B: f32 = -5.775e-7;

/// Full-scale count of the 15-bit ratiometric ADC code
pub const ADC_FULL_SCALE: f32 = 32768.0;

/// Sub-zero polynomial coefficients, lowest order first
const SUBZERO_POLY: [f32; 6] = [-242.02, 2.2228, 2.5859e-3, -4.8260e-6, -2.8183e-8, 1.5243e-10];

/// Convert a 15-bit ADC code to the measured resistance in ohms
pub fn code_to_resistance(raw: u16, reference_ohms: f32) -> f32 {
    raw as f32 / ADC_FULL_SCALE * reference_ohms
}

/// Radicand of the quadratic solution; negative means no real root
fn radicand(resistance: f32, nominal_ohms: f32) -> f32 {
    let z2 = RTD_A * RTD_A - 4.0 * RTD_B;
    let z3 = (4.0 * RTD_B) / nominal_ohms;
    z2 + z3 * resistance
}

/// Solve the Callendar-Van Dusen quadratic for temperature (valid for T >= 0°C)
///
/// Returns NaN when the resistance is beyond the quadratic's real domain.
pub fn quadratic_temperature(resistance: f32, nominal_ohms: f32) -> f32 {
    let z1 = -RTD_A;
    let z4 = 2.0 * RTD_B;
    (libm::sqrtf(radicand(resistance, nominal_ohms)) + z1) / z4
}

/// Evaluate the sub-zero polynomial at a resistance normalized to 100 Ω
pub fn polynomial_temperature(normalized_ohms: f32) -> f32 {
    let mut temp = SUBZERO_POLY[0];
    let mut power = 1.0;
    for coeff in &SUBZERO_POLY[1..] {
        power *= normalized_ohms;
        temp += coeff * power;
    }
    temp
}

/// Convert a raw 15-bit code to degrees Celsius
///
/// Pure function. Takes the quadratic result when it is non-negative and
/// the polynomial otherwise. Nothing is validated: a code outside the
/// quadratic's domain compares false against zero and so lands in the
/// polynomial branch, producing a finite but meaningless value. Use
/// [`try_solve_temperature`] when the result has to be trusted.
pub fn solve_temperature(raw: u16, nominal_ohms: f32, reference_ohms: f32) -> f32 {
    let resistance = code_to_resistance(raw, reference_ohms);

    let temp = quadratic_temperature(resistance, nominal_ohms);
    if temp >= 0.0 {
        return temp;
    }

    polynomial_temperature(resistance / nominal_ohms * 100.0)
}

/// Checked variant of [`solve_temperature`]
///
/// Rejects non-positive resistor values, codes beyond the quadratic's real
/// domain, and any non-finite result.
pub fn try_solve_temperature(
    raw: u16,
    nominal_ohms: f32,
    reference_ohms: f32,
) -> Result<f32, SensorError> {
    if !(nominal_ohms > 0.0 && reference_ohms > 0.0) {
        return Err(SensorError::OutOfRange);
    }

    let resistance = code_to_resistance(raw, reference_ohms);
    if radicand(resistance, nominal_ohms) < 0.0 {
        return Err(SensorError::OutOfRange);
    }

    let temp = solve_temperature(raw, nominal_ohms, reference_ohms);
    if !temp.is_finite() {
        return Err(SensorError::OutOfRange);
    }
    Ok(temp)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PT100: f32 = 100.0;
    const REF_430: f32 = 430.0;

    fn assert_close(actual: f32, expected: f32, tolerance: f32) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} ± {tolerance}, got {actual}"
        );
    }

    #[test]
    fn test_zero_code_golden() {
        // Quadratic gives about -246.9°C here, so the polynomial constant term wins
        assert!(quadratic_temperature(0.0, PT100) < 0.0);
        assert_close(solve_temperature(0, PT100, REF_430), -242.02, 1e-3);
    }

    #[test]
    fn test_positive_range_golden() {
        // 8192 / 32768 * 430 = 107.5 Ω
        assert_close(code_to_resistance(8192, REF_430), 107.5, 1e-4);
        assert_close(solve_temperature(8192, PT100, REF_430), 19.2447, 0.01);
        // 215 Ω
        assert_close(solve_temperature(16384, PT100, REF_430), 308.289, 0.05);
    }

    #[test]
    fn test_branch_switches_below_zero() {
        // 7620 counts is just under 100 Ω, 7621 just over
        let below = code_to_resistance(7620, REF_430);
        assert!(quadratic_temperature(below, PT100) < 0.0);
        assert_eq!(
            solve_temperature(7620, PT100, REF_430),
            polynomial_temperature(below / PT100 * 100.0)
        );

        let above = code_to_resistance(7621, REF_430);
        assert!(quadratic_temperature(above, PT100) >= 0.0);
        assert_eq!(
            solve_temperature(7621, PT100, REF_430),
            quadratic_temperature(above, PT100)
        );
    }

    #[test]
    fn test_branches_agree_at_crossover() {
        // The quadratic root is 0°C exactly at the nominal resistance
        assert_close(quadratic_temperature(PT100, PT100), 0.0, 5e-3);
        assert_close(polynomial_temperature(100.0), 0.0, 5e-3);

        let below = code_to_resistance(7620, REF_430);
        let quadratic = quadratic_temperature(below, PT100);
        let polynomial = polynomial_temperature(below / PT100 * 100.0);
        assert_close(quadratic, polynomial, 5e-3);
    }

    #[test]
    fn test_pt1000_matches_pt100_at_same_ratio() {
        let pt100 = solve_temperature(9000, PT100, REF_430);
        let pt1000 = solve_temperature(9000, 1000.0, 4300.0);
        assert_close(pt100, pt1000, 1e-3);
    }

    #[test]
    fn test_unchecked_solver_falls_through_out_of_domain() {
        // 6000 counts against a 4300 Ω reference is ~787 Ω on a PT100,
        // past the quadratic's real domain
        let resistance = code_to_resistance(6000, 4300.0);
        assert!(quadratic_temperature(resistance, PT100).is_nan());

        let temp = solve_temperature(6000, PT100, 4300.0);
        assert_eq!(temp, polynomial_temperature(resistance / PT100 * 100.0));
    }

    #[test]
    fn test_checked_solver_rejects_out_of_domain() {
        assert_eq!(
            try_solve_temperature(6000, PT100, 4300.0),
            Err(SensorError::OutOfRange)
        );
        assert_eq!(try_solve_temperature(8192, 0.0, REF_430), Err(SensorError::OutOfRange));
        assert_eq!(
            try_solve_temperature(8192, PT100, f32::NAN),
            Err(SensorError::OutOfRange)
        );
    }

    #[test]
    fn test_checked_solver_agrees_in_domain() {
        for raw in [0u16, 7620, 7621, 8192, 16384, 32767] {
            assert_eq!(
                try_solve_temperature(raw, PT100, REF_430),
                Ok(solve_temperature(raw, PT100, REF_430))
            );
        }
    }

    proptest::proptest! {
        #[test]
        fn prop_solver_is_deterministic(raw in 0u16..0x8000) {
            let first = solve_temperature(raw, PT100, REF_430);
            let second = solve_temperature(raw, PT100, REF_430);
            proptest::prop_assert_eq!(first.to_bits(), second.to_bits());
        }

        #[test]
        fn prop_temperature_rises_with_code(raw in 7621u16..0x7FFF) {
            let lower = solve_temperature(raw, PT100, REF_430);
            let upper = solve_temperature(raw + 1, PT100, REF_430);
            proptest::prop_assert!(upper >= lower);
        }
    }
}
