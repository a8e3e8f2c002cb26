/// One of the two ends of the loaded window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Edge {
    /// The start of the window; growing it walks `previous_token`s.
    Top,
    /// The end of the window; growing it walks `next_token`s.
    Bottom,
}

impl Edge {
    pub const ALL: [Edge; 2] = [Edge::Top, Edge::Bottom];

    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }
}

/// Per-edge fetch state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeState {
    #[default]
    Idle,
    /// A fetch for this edge is outstanding.
    Loading,
    /// The dataset has no further page in this direction.
    Exhausted,
}

impl EdgeState {
    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }

    pub fn is_loading(self) -> bool {
        self == Self::Loading
    }

    pub fn is_exhausted(self) -> bool {
        self == Self::Exhausted
    }
}
