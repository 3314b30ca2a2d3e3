//! Voltage-to-percentage lookup table and its interpolating walk.

/// One entry per percentage point, 0 through 100 inclusive.
const TABLE_LEN: usize = 101;

/// Linear ramp from the empty-cell voltage (index 0) to the full-cell
/// voltage (index 100).
///
/// The gauge builds one of these the first time a table-mode estimate is
/// asked for and keeps it for the rest of its life.
pub struct ConversionTable {
    volts: [f64; TABLE_LEN],
}

impl ConversionTable {
    /// Builds the ramp for the given bounds. Each entry is interpolated
    /// from the endpoints directly so that index 0 and index 100 land
    /// exactly on `min_voltage` and `max_voltage` instead of accumulating
    /// rounding over a hundred additions.
    pub fn new(min_voltage: f64, max_voltage: f64) -> Self {
        let span = max_voltage - min_voltage;
        let mut volts = [0.0; TABLE_LEN];
        for (i, entry) in volts.iter_mut().enumerate() {
            *entry = min_voltage + span * i as f64 / 100.0;
        }
        ConversionTable { volts }
    }

    /// Percentage point for `volts`, which the caller has already clamped
    /// strictly inside the table's bounds.
    ///
    /// This is a halving walk seeded at mid-table, not a textbook binary
    /// search: the step shrinks against the previous position instead of a
    /// bracketing interval, so it settles on an index near the true
    /// nearest entry rather than exactly on it. Deployed firmware has been
    /// calibrated against these outputs, so the walk stays as-is; an exact
    /// search would be a behavior change, not a cleanup.
    pub fn charge_percent(&self, volts: f64) -> u8 {
        let mut index: i32 = 50;
        let mut previous: i32 = 0;

        while previous != index {
            let half = (index - previous).abs() / 2;
            previous = index;
            if self.volts[index as usize] == volts {
                return index as u8;
            }
            index = if volts >= self.volts[index as usize] {
                index + half
            } else {
                index - half
            };
        }

        // The walk never strays past index 50 +/- (25+12+6+3+1), so the
        // indexing above stays in bounds and the cast here fits.
        index as u8
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &[f64] {
        &self.volts
    }
}
