use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discrete stage of transaction processing, in delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    RequestLine,
    RequestHeader,
    RequestBody,
    ResponseLine,
    ResponseHeader,
    ResponseBody,
    Postprocess,
    Logging,
}

impl Phase {
    pub const ALL: [Phase; 8] = [
        Phase::RequestLine,
        Phase::RequestHeader,
        Phase::RequestBody,
        Phase::ResponseLine,
        Phase::ResponseHeader,
        Phase::ResponseBody,
        Phase::Postprocess,
        Phase::Logging,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::RequestLine => "REQUEST_LINE",
            Phase::RequestHeader => "REQUEST_HEADER",
            Phase::RequestBody => "REQUEST_BODY",
            Phase::ResponseLine => "RESPONSE_LINE",
            Phase::ResponseHeader => "RESPONSE_HEADER",
            Phase::ResponseBody => "RESPONSE_BODY",
            Phase::Postprocess => "POSTPROCESS",
            Phase::Logging => "LOGGING",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown phase '{0}'")]
pub struct UnknownPhase(pub String);

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

/// Inclusive range of phases during which a var may receive new values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WindowRepr", into = "WindowRepr")]
pub struct PhaseWindow {
    first: Phase,
    last: Phase,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("phase window starts at {first} after it ends at {last}")]
pub struct InvertedWindow {
    pub first: Phase,
    pub last: Phase,
}

impl PhaseWindow {
    pub fn new(first: Phase, last: Phase) -> Result<Self, InvertedWindow> {
        if first > last {
            return Err(InvertedWindow { first, last });
        }
        Ok(Self { first, last })
    }

    /// Window covering a single phase.
    pub fn single(phase: Phase) -> Self {
        Self {
            first: phase,
            last: phase,
        }
    }

    pub fn first(&self) -> Phase {
        self.first
    }

    pub fn last(&self) -> Phase {
        self.last
    }

    pub fn contains(&self, phase: Phase) -> bool {
        self.first <= phase && phase <= self.last
    }

    /// True once `phase` has reached the start of the window.
    pub fn is_open_at(&self, phase: Phase) -> bool {
        phase >= self.first
    }

    /// True once no further values may arrive at or after `phase`.
    pub fn is_closed_at(&self, phase: Phase) -> bool {
        phase >= self.last
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WindowRepr {
    first: Phase,
    last: Phase,
}

impl TryFrom<WindowRepr> for PhaseWindow {
    type Error = InvertedWindow;

    fn try_from(repr: WindowRepr) -> Result<Self, Self::Error> {
        PhaseWindow::new(repr.first, repr.last)
    }
}

impl From<PhaseWindow> for WindowRepr {
    fn from(window: PhaseWindow) -> Self {
        WindowRepr {
            first: window.first,
            last: window.last,
        }
    }
}
