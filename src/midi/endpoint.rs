// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Endpoint identifiers and endpoint sets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque unique id of a MIDI destination or virtual output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(pub i32);

impl EndpointId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

impl From<i32> for EndpointId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EndpointId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i32>()
            .map(EndpointId)
            .map_err(|_| Error::MidiPort(format!("invalid endpoint id '{}'", s)))
    }
}

/// A named endpoint as reported by the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub id: EndpointId,
    pub name: String,
}

impl EndpointInfo {
    pub fn new(id: impl Into<EndpointId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for EndpointInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.id)
    }
}

/// Where an event should go.
///
/// `All` is the "no explicit endpoints" sentinel: the transport writes to
/// every endpoint that is currently open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Endpoints {
    #[default]
    All,
    Only(Vec<EndpointId>),
}

impl Endpoints {
    /// A single-endpoint set
    pub fn single(id: EndpointId) -> Self {
        Endpoints::Only(vec![id])
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Endpoints::All)
    }

    /// The id if this is exactly a one-element set
    pub fn as_single(&self) -> Option<EndpointId> {
        match self {
            Endpoints::Only(ids) if ids.len() == 1 => Some(ids[0]),
            _ => None,
        }
    }

    /// Whether an open endpoint with `id` is addressed by this set
    pub fn includes(&self, id: EndpointId) -> bool {
        match self {
            Endpoints::All => true,
            Endpoints::Only(ids) => ids.contains(&id),
        }
    }
}

impl From<Option<EndpointId>> for Endpoints {
    fn from(target: Option<EndpointId>) -> Self {
        match target {
            Some(id) => Endpoints::single(id),
            None => Endpoints::All,
        }
    }
}

impl fmt::Display for Endpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoints::All => write!(f, "all"),
            Endpoints::Only(ids) => {
                let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                write!(f, "[{}]", ids.join(", "))
            }
        }
    }
}

impl FromStr for Endpoints {
    type Err = Error;

    /// `all` or a comma-separated list of ids
    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Endpoints::All);
        }
        let ids = s
            .split(',')
            .map(str::parse::<EndpointId>)
            .collect::<Result<Vec<_>>>()?;
        Ok(Endpoints::Only(ids))
    }
}

/// Input/output id pair for one environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointPair {
    pub input: EndpointId,
    pub output: EndpointId,
}

impl EndpointPair {
    pub const fn new(input: i32, output: i32) -> Self {
        Self {
            input: EndpointId(input),
            output: EndpointId(output),
        }
    }
}

/// The two logical endpoint pairs used by port swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSwap {
    #[serde(default = "default_develop")]
    pub develop: EndpointPair,
    #[serde(default = "default_main")]
    pub main: EndpointPair,
}

pub const DEVELOP_PAIR: EndpointPair = EndpointPair::new(1_200_000, 1_500_000);
pub const MAIN_PAIR: EndpointPair = EndpointPair::new(2_200_000, 2_500_000);

fn default_develop() -> EndpointPair {
    DEVELOP_PAIR
}

fn default_main() -> EndpointPair {
    MAIN_PAIR
}

impl Default for PortSwap {
    fn default() -> Self {
        Self {
            develop: DEVELOP_PAIR,
            main: MAIN_PAIR,
        }
    }
}

impl PortSwap {
    /// Input substituted for an exact single-output match, if any
    pub fn substitute(&self, id: EndpointId) -> Option<EndpointId> {
        if id == self.main.output {
            Some(self.main.input)
        } else if id == self.develop.output {
            Some(self.develop.input)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_detection() {
        let id = EndpointId(7);
        assert_eq!(Endpoints::single(id).as_single(), Some(id));
        assert_eq!(Endpoints::All.as_single(), None);
        assert_eq!(
            Endpoints::Only(vec![EndpointId(1), EndpointId(2)]).as_single(),
            None
        );
        assert_eq!(Endpoints::Only(vec![]).as_single(), None);
    }

    #[test]
    fn test_includes() {
        let set = Endpoints::Only(vec![EndpointId(1), EndpointId(2)]);
        assert!(set.includes(EndpointId(2)));
        assert!(!set.includes(EndpointId(3)));
        assert!(Endpoints::All.includes(EndpointId(3)));
    }

    #[test]
    fn test_parse_endpoints() {
        assert_eq!("all".parse::<Endpoints>().unwrap(), Endpoints::All);
        assert_eq!(
            "2500000".parse::<Endpoints>().unwrap(),
            Endpoints::single(EndpointId(2_500_000))
        );
        assert_eq!(
            "1, 2".parse::<Endpoints>().unwrap(),
            Endpoints::Only(vec![EndpointId(1), EndpointId(2)])
        );
        assert!("bus".parse::<Endpoints>().is_err());
    }

    #[test]
    fn test_substitute() {
        let swap = PortSwap::default();
        assert_eq!(
            swap.substitute(EndpointId(2_500_000)),
            Some(EndpointId(2_200_000))
        );
        assert_eq!(
            swap.substitute(EndpointId(1_500_000)),
            Some(EndpointId(1_200_000))
        );
        assert_eq!(swap.substitute(EndpointId(2_200_000)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Endpoints::All.to_string(), "all");
        assert_eq!(
            Endpoints::Only(vec![EndpointId(1), EndpointId(2)]).to_string(),
            "[1, 2]"
        );
        assert_eq!(
            EndpointInfo::new(5, "IAC Bus").to_string(),
            "IAC Bus [5]"
        );
    }
}
