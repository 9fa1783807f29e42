/// Identifies one issued request within a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// Per-stream generation counter. Issuing a ticket supersedes every
/// earlier one; only the latest ticket is current.
#[derive(Debug, Default)]
pub struct FetchSeq {
    latest: u64,
}

impl FetchSeq {
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    /// Supersedes whatever is in flight without issuing a new request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

/// Idle -> Loading -> Loaded | Failed, per async stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl LoadPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadPhase::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadPhase::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// What happened when a response was handed back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Commit {
    Applied,
    Failed,
    /// A newer request (or a close) superseded this one; nothing changed.
    Stale,
}
