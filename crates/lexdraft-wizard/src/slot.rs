/// Lifecycle of one stage's processing output.
///
/// `Completed` is terminal: once a value is stored it is never replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum StageSlot<T> {
    #[default]
    Pending,
    InFlight,
    Completed(T),
    Failed(String),
}

/// Value-free view of a [`StageSlot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    Pending,
    InFlight,
    Completed,
    Failed(String),
}

impl<T> StageSlot<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Completed(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    pub fn status(&self) -> SlotStatus {
        match self {
            Self::Pending => SlotStatus::Pending,
            Self::InFlight => SlotStatus::InFlight,
            Self::Completed(_) => SlotStatus::Completed,
            Self::Failed(cause) => SlotStatus::Failed(cause.clone()),
        }
    }

    /// Pending or Failed may start; InFlight and Completed may not.
    pub(crate) fn begin(&mut self) -> bool {
        match self {
            Self::Pending | Self::Failed(_) => {
                *self = Self::InFlight;
                true
            }
            Self::InFlight | Self::Completed(_) => false,
        }
    }

    pub(crate) fn complete(&mut self, value: T) {
        if self.is_in_flight() {
            *self = Self::Completed(value);
        }
    }

    pub(crate) fn fail(&mut self, cause: String) {
        if self.is_in_flight() {
            *self = Self::Failed(cause);
        }
    }

    /// Drop an in-flight attempt without recording anything.
    pub(crate) fn abandon(&mut self) {
        if self.is_in_flight() {
            *self = Self::Pending;
        }
    }
}
