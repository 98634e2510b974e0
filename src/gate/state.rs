// Gate states. The gate is in exactly one of these at a time; the
// suspended states only exist while a classification, generation, or
// submission future is in flight.

/// Where the gate is in the listing flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// The user can edit the draft
    Editing,
    /// An image is being classified
    Classifying,
    /// Listing copy is being generated
    GeneratingText,
    /// Uploads and the record write are in flight
    Submitting,
    /// Terminal: the listing was stored
    Accepted { record_id: String },
}

impl GateState {
    /// True for the states that only exist across an await.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            GateState::Classifying | GateState::GeneratingText | GateState::Submitting
        )
    }
}

impl std::fmt::Display for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateState::Editing => write!(f, "editing"),
            GateState::Classifying => write!(f, "classifying an image"),
            GateState::GeneratingText => write!(f, "generating text"),
            GateState::Submitting => write!(f, "submitting"),
            GateState::Accepted { record_id } => write!(f, "accepted as {record_id}"),
        }
    }
}
