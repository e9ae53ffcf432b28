use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Knob ranges, matching the options surface exposed to the player
// ---------------------------------------------------------------------------
const DIFFICULTY_MIN: f64 = 0.5;
const DIFFICULTY_MAX: f64 = 2.0;
const XP_MULT_MIN: f64 = 0.5;
const XP_MULT_MAX: f64 = 5.0;

/// Player-facing tuning knobs, read fresh every tick.
///
/// The struct is plain data so the host's options screen can own it; the
/// engine never writes it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSettings {
    /// Scales capture risk. 1.0 is the intended experience.
    #[serde(default = "default_difficulty")]
    pub difficulty_factor: f64,
    /// Scales the roguery XP paid out when an operation wraps up.
    #[serde(default = "default_xp_mult")]
    pub xp_gain_multiplier: f64,
    /// Presentation only: whether the host shows result popups or plain
    /// log lines. Never read by mission logic.
    #[serde(default = "default_show_popups")]
    pub show_popups: bool,
}

fn default_difficulty() -> f64 {
    1.0
}

fn default_xp_mult() -> f64 {
    1.0
}

fn default_show_popups() -> bool {
    true
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            difficulty_factor: default_difficulty(),
            xp_gain_multiplier: default_xp_mult(),
            show_popups: default_show_popups(),
        }
    }
}

impl CampaignSettings {
    /// Snap both multipliers into the ranges the options screen offers.
    /// Out-of-range values can only come from hand-edited save files.
    pub fn clamped(mut self) -> Self {
        self.difficulty_factor = self.difficulty_factor.clamp(DIFFICULTY_MIN, DIFFICULTY_MAX);
        self.xp_gain_multiplier = self.xp_gain_multiplier.clamp(XP_MULT_MIN, XP_MULT_MAX);
        self
    }
}
