//! Presence flag and cooldown window for the masking pipeline.
//!
//! Pure state, no timers inside: the worker owns the tick cadence and calls
//! in from its single task, which is what keeps these transitions free of
//! interior locking.

/// Where the cooldown window stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownState {
    /// No window active.
    Idle,
    /// Window active with `remaining` decrement ticks left.
    Active { remaining: u32 },
}

/// What one timer tick did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Window still open; keep ticking.
    StillActive { remaining: u32 },
    /// Window finished: presence cleared, detection re-armed, timer stops.
    Expired,
    /// Tick arrived while idle; nothing changed.
    Ignored,
}

/// Combined presence flag and cooldown tracking for one stream.
///
/// A positive detection flags presence and opens a window of
/// `cooldown_length` decrement ticks. The window never refreshes: while
/// presence is flagged, detection is disarmed, so further positives cannot
/// extend it. Frames are masked exactly while presence is flagged.
#[derive(Debug)]
pub struct MaskingState {
    cooldown_length: u32,
    state: CooldownState,
    person_present: bool,
}

impl MaskingState {
    /// Idle state with the given window length in ticks.
    pub fn new(cooldown_length: u32) -> Self {
        Self { cooldown_length, state: CooldownState::Idle, person_present: false }
    }

    /// Current window state.
    pub fn state(&self) -> CooldownState {
        self.state
    }

    /// Whether frames must be blank-substituted right now.
    pub fn should_mask(&self) -> bool {
        self.person_present
    }

    /// Whether the pipeline should run detection on the next frame.
    pub fn detection_armed(&self) -> bool {
        !self.person_present && self.state == CooldownState::Idle
    }

    /// Record a positive detection.
    ///
    /// Returns `true` when this opened a new window and the tick timer must
    /// start. While presence is already flagged the call changes nothing.
    pub fn flag_presence(&mut self) -> bool {
        if self.person_present {
            return false;
        }
        self.person_present = true;
        self.state = CooldownState::Active { remaining: self.cooldown_length };
        true
    }

    /// Apply one timer tick.
    ///
    /// The window counts `cooldown_length` decrements and expires on the
    /// tick that finds the counter at zero.
    pub fn tick(&mut self) -> TickOutcome {
        match self.state {
            CooldownState::Idle => TickOutcome::Ignored,
            CooldownState::Active { remaining } if remaining > 0 => {
                let remaining = remaining - 1;
                self.state = CooldownState::Active { remaining };
                TickOutcome::StillActive { remaining }
            }
            CooldownState::Active { .. } => {
                self.state = CooldownState::Idle;
                self.person_present = false;
                TickOutcome::Expired
            }
        }
    }
}
