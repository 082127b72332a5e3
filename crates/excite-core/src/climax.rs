//! Edge detector for saturation


/// Fires once per rise into saturation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClimaxGate {
    saturated_last_tick: bool,
}

impl ClimaxGate {
    /// Create a gate that has not seen saturation
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this tick's saturation; true only on the rising edge
    pub fn observe(&mut self, saturated: bool) -> bool {
        let rising = saturated && !self.saturated_last_tick;
        self.saturated_last_tick = saturated;
        rising
    }

    /// Whether the last observation was saturated
    pub fn is_latched(&self) -> bool {
        self.saturated_last_tick
    }

    /// Forget the last observation
    pub fn clear(&mut self) {
        self.saturated_last_tick = false;
    }
}
