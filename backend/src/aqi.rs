//! PM2.5 concentration (µg/m³) to Air Quality Index conversion.

/// One row of the PM2.5 breakpoint table:
/// `(concentration_low, concentration_high, index_low, index_high)`.
type Breakpoint = (f64, f64, u32, u32);

const PM25_BREAKPOINTS: [Breakpoint; 6] = [
    (0.0, 12.0, 0, 50),
    (12.1, 35.4, 51, 100),
    (35.5, 55.4, 101, 150),
    (55.5, 150.4, 151, 200),
    (150.5, 250.4, 201, 300),
    (250.5, 500.4, 301, 500),
];

/// Convert a PM2.5 concentration into an AQI value.
///
/// Interpolates linearly inside the matching band and rounds half to even.
/// Returns `None` for a missing reading and for concentrations outside every
/// band: negative values, anything above 500.4, and the gaps between bands
/// (e.g. 12.05).
pub fn pm25_to_aqi(concentration: Option<f64>) -> Option<u32> {
    let c = concentration?;
    PM25_BREAKPOINTS
        .iter()
        .find(|(c_lo, c_hi, _, _)| *c_lo <= c && c <= *c_hi)
        .map(|&(c_lo, c_hi, i_lo, i_hi)| {
            let slope = f64::from(i_hi - i_lo) / (c_hi - c_lo);
            (slope * (c - c_lo) + f64::from(i_lo)).round_ties_even() as u32
        })
}
