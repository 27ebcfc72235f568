//! # State Synchronizer
//!
//! Change detection for the delta transport mode: compares the live control
//! snapshot against the last transmitted one and emits only what changed.
//!
//! Commands (arm, disarm, emergency stop) are edge-triggered: a request is
//! emitted by the next [`Synchronizer::diff_and_send`] and then cleared.

use crate::packet::protocol::ControlState;

/// One-shot command sent as a short string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Arm,
    Disarm,
    EmergencyStop,
}

impl Command {
    /// Command string on the air
    pub fn tag(self) -> &'static str {
        match self {
            Command::Arm => "a",
            Command::Disarm => "d",
            Command::EmergencyStop => "e",
        }
    }
}

/// A single field the synchronizer decided to send
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldAction {
    Command(Command),
    Throttle(f32),
    Pitch(f32),
    Roll(f32),
    Yaw(f32),
}

impl FieldAction {
    /// `true` for one-shot commands, `false` for channel values
    pub fn is_command(&self) -> bool {
        matches!(self, FieldAction::Command(_))
    }

    /// Value tag for channel actions (`t`, `p`, `r`, `y`)
    pub fn value_tag(&self) -> Option<char> {
        match self {
            FieldAction::Command(_) => None,
            FieldAction::Throttle(_) => Some('t'),
            FieldAction::Pitch(_) => Some('p'),
            FieldAction::Roll(_) => Some('r'),
            FieldAction::Yaw(_) => Some('y'),
        }
    }
}

/// One-shot commands waiting for the next send
///
/// Arm and disarm cancel each other; the latest request wins.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PendingCommands {
    arm: bool,
    disarm: bool,
    estop: bool,
}

impl PendingCommands {
    pub fn request(&mut self, command: Command) {
        match command {
            Command::Arm => {
                self.arm = true;
                self.disarm = false;
            }
            Command::Disarm => {
                self.disarm = true;
                self.arm = false;
            }
            Command::EmergencyStop => self.estop = true,
        }
    }

    /// Append queued commands (emergency stop first) and clear the queue
    pub fn drain_into(&mut self, actions: &mut Vec<FieldAction>) {
        let pending = std::mem::take(self);

        if pending.estop {
            actions.push(FieldAction::Command(Command::EmergencyStop));
        }
        if pending.arm {
            actions.push(FieldAction::Command(Command::Arm));
        }
        if pending.disarm {
            actions.push(FieldAction::Command(Command::Disarm));
        }
    }
}

/// Delta-mode change detector
#[derive(Debug, Default)]
pub struct Synchronizer {
    last: ControlState,
    pending: PendingCommands,
}

impl Synchronizer {
    /// Create a synchronizer whose last-sent snapshot is all zeros
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a one-shot command for the next send
    ///
    /// Arm and disarm cancel each other; the latest request wins.
    pub fn request(&mut self, command: Command) {
        self.pending.request(command);
    }

    /// Snapshot the next comparison is made against
    pub fn last_sent(&self) -> &ControlState {
        &self.last
    }

    /// Compute the actions to send for `current`
    ///
    /// Pending commands come first (emergency stop, then arm/disarm) and are
    /// cleared. Each channel is emitted only if it differs from the last
    /// snapshot; the snapshot is then updated whether or not it was sent.
    ///
    /// # Examples
    ///
    /// ```
    /// use airbit_remote::packet::protocol::ControlState;
    /// use airbit_remote::remote::sync::{FieldAction, Synchronizer};
    ///
    /// let mut sync = Synchronizer::new();
    /// let mut state = ControlState::default();
    /// assert!(sync.diff_and_send(&state).is_empty());
    ///
    /// state.throttle = 10.0;
    /// assert_eq!(sync.diff_and_send(&state), vec![FieldAction::Throttle(10.0)]);
    /// assert!(sync.diff_and_send(&state).is_empty());
    /// ```
    pub fn diff_and_send(&mut self, current: &ControlState) -> Vec<FieldAction> {
        let mut actions = Vec::new();
        self.pending.drain_into(&mut actions);

        diff_field(&mut self.last.throttle, current.throttle, FieldAction::Throttle, &mut actions);
        diff_field(&mut self.last.pitch, current.pitch, FieldAction::Pitch, &mut actions);
        diff_field(&mut self.last.roll, current.roll, FieldAction::Roll, &mut actions);
        diff_field(&mut self.last.yaw, current.yaw, FieldAction::Yaw, &mut actions);

        self.last.armed = current.armed;
        self.last.estop = current.estop;

        actions
    }
}

fn diff_field(
    last: &mut f32,
    current: f32,
    action: fn(f32) -> FieldAction,
    actions: &mut Vec<FieldAction>,
) {
    if *last != current {
        actions.push(action(current));
    }
    *last = current;
}
