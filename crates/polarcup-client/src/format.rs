// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Display formatting for snapshot values.
//!
//! Rounding follows Rust's fixed-precision float formatting: the exact binary
//! value is rounded, and exact ties go to the even digit. The sign is kept for
//! negative zero and for small negatives that round to zero, so `-0.0` and
//! `-0.04` both render as `-0.0°C`. Non-finite input is passed through as
//! `NaN` / `inf`.

/// Format a temperature as one decimal place in Celsius, e.g. `21.4°C`.
#[must_use]
pub fn format_temperature(temp: f64) -> String {
    format!("{temp:.1}°C")
}

/// Format a quantity as whole milliliters, e.g. `250 ml`.
#[must_use]
pub fn format_quantity(qty: f64) -> String {
    format!("{qty:.0} ml")
}

/// Format the remaining cooling time line shown while the cup is cooling.
#[must_use]
pub fn format_time_remaining(minutes: f64) -> String {
    format!("Tiempo restante: {minutes} minutos")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_one_decimal() {
        assert_eq!(format_temperature(21.36), "21.4°C");
        assert_eq!(format_temperature(0.0), "0.0°C");
        assert_eq!(format_temperature(4.0), "4.0°C");
        assert_eq!(format_temperature(100.04), "100.0°C");
    }

    #[test]
    fn test_temperature_negative_rounding() {
        // -5.05 is stored as -5.04999..., so it rounds toward zero
        assert_eq!(format_temperature(-5.05), "-5.0°C");
        assert_eq!(format_temperature(-5.06), "-5.1°C");
    }

    #[test]
    fn test_temperature_keeps_negative_zero_sign() {
        assert_eq!(format_temperature(-0.0), "-0.0°C");
        assert_eq!(format_temperature(-0.04), "-0.0°C");
        assert_eq!(format_temperature(0.04), "0.0°C");
    }

    #[test]
    fn test_temperature_non_finite() {
        assert_eq!(format_temperature(f64::NAN), "NaN°C");
        assert_eq!(format_temperature(f64::INFINITY), "inf°C");
        assert_eq!(format_temperature(f64::NEG_INFINITY), "-inf°C");
    }

    #[test]
    fn test_quantity_whole_ml() {
        assert_eq!(format_quantity(250.4), "250 ml");
        assert_eq!(format_quantity(250.6), "251 ml");
        assert_eq!(format_quantity(500.0), "500 ml");
        assert_eq!(format_quantity(0.0), "0 ml");
    }

    #[test]
    fn test_quantity_ties_to_even() {
        assert_eq!(format_quantity(0.5), "0 ml");
        assert_eq!(format_quantity(1.5), "2 ml");
        assert_eq!(format_quantity(2.5), "2 ml");
    }

    #[test]
    fn test_time_remaining_shortest_form() {
        assert_eq!(format_time_remaining(15.0), "Tiempo restante: 15 minutos");
        assert_eq!(format_time_remaining(7.5), "Tiempo restante: 7.5 minutos");
    }
}
