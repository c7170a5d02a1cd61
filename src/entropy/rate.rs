//! Entropy throughput monitoring over fixed, counted windows.

/// Rate monitor registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateState {
    /// Ticks elapsed in the current window.
    ticks_in_window: u64,
    /// Bits delivered in the current window.
    bits_in_window: u64,
    /// Rate published at the end of the last completed window.
    rate_kbps: u32,
    /// Windows completed since reset.
    windows_completed: u64,
}

impl RateState {
    /// Returns the last published rate.
    #[inline]
    pub fn rate_kbps(&self) -> u32 {
        self.rate_kbps
    }

    /// Returns the bits counted so far in the open window.
    #[inline]
    pub fn bits_in_window(&self) -> u64 {
        self.bits_in_window
    }

    /// Returns the number of completed windows.
    #[inline]
    pub fn windows_completed(&self) -> u64 {
        self.windows_completed
    }

    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.ticks_in_window.to_le_bytes());
        out.extend_from_slice(&self.bits_in_window.to_le_bytes());
        out.extend_from_slice(&self.rate_kbps.to_le_bytes());
        out.extend_from_slice(&self.windows_completed.to_le_bytes());
    }
}

/// Computes delivered-bit throughput in Kbps.
///
/// The window is a fixed number of ticks of a reference clock, never
/// wall-clock time. The rate register is zero until the first window
/// closes and only changes at window boundaries.
#[derive(Debug, Clone)]
pub struct RateMonitor {
    clock_hz: u64,
    window_ticks: u64,
}

impl RateMonitor {
    /// Creates a monitor. Zero values are clamped to one.
    pub fn new(clock_hz: u64, window_ticks: u64) -> Self {
        Self {
            clock_hz: clock_hz.max(1),
            window_ticks: window_ticks.max(1),
        }
    }

    /// Returns the window length in ticks.
    pub fn window_ticks(&self) -> u64 {
        self.window_ticks
    }

    /// Window duration in seconds.
    pub fn window_seconds(&self) -> f64 {
        self.window_ticks as f64 / self.clock_hz as f64
    }

    /// Converts a window's bit count to Kbps:
    /// `bits / window_seconds / 1000`, truncated.
    pub fn rate_kbps(&self, bits: u64) -> u32 {
        let numerator = bits as u128 * self.clock_hz as u128;
        let denominator = self.window_ticks as u128 * 1000;
        u32::try_from(numerator / denominator).unwrap_or(u32::MAX)
    }

    /// Advances one tick, counting `bits_delivered` this tick.
    pub fn step(&self, prev: &RateState, bits_delivered: u32) -> RateState {
        let ticks = prev.ticks_in_window + 1;
        let bits = prev.bits_in_window + u64::from(bits_delivered);

        if ticks >= self.window_ticks {
            let rate_kbps = self.rate_kbps(bits);
            tracing::debug!(
                bits,
                rate_kbps,
                window = prev.windows_completed + 1,
                "Entropy rate window closed"
            );
            RateState {
                ticks_in_window: 0,
                bits_in_window: 0,
                rate_kbps,
                windows_completed: prev.windows_completed + 1,
            }
        } else {
            RateState {
                ticks_in_window: ticks,
                bits_in_window: bits,
                ..*prev
            }
        }
    }
}
