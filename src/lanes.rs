//! Lane overview classification for road segments
//!
//! A segment's lane overview lists lane codes such as `1`, `2`, `3K`, `4R`:
//! the lane number followed by an optional letter giving the lane kind.
//! [`filter_lanes`] picks out lane numbers of selected kinds and
//! [`is_four_lane`] decides whether a segment is a four-lane road.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::errors::{JoinError, Result};
use crate::table::Row;

lazy_static! {
    static ref LANE_CODE: Regex = Regex::new(r"^(?P<number>\d+)").expect("valid lane regex");
    static ref LANE_LETTER: Regex = Regex::new(r"[A-Za-z]").expect("valid letter regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LaneKind {
    Ordinary,
    /// `K`
    PublicTransport,
    /// `R`
    Reversible,
    /// `S`
    Cycle,
    /// `H`
    RightTurn,
    /// `V`
    LeftTurn,
    /// `B`
    Toll,
    Other(char),
}

impl LaneKind {
    fn from_letter(letter: Option<char>) -> Self {
        match letter {
            None => LaneKind::Ordinary,
            Some('K') => LaneKind::PublicTransport,
            Some('R') => LaneKind::Reversible,
            Some('S') => LaneKind::Cycle,
            Some('H') => LaneKind::RightTurn,
            Some('V') => LaneKind::LeftTurn,
            Some('B') => LaneKind::Toll,
            Some(c) => LaneKind::Other(c),
        }
    }
}

/// Lanes that carry ordinary motor traffic
pub const DRIVING_LANE_KINDS: [LaneKind; 3] = [
    LaneKind::Ordinary,
    LaneKind::PublicTransport,
    LaneKind::Reversible,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneCode {
    pub number: u32,
    pub kind: LaneKind,
}

impl LaneCode {
    pub fn parse(code: &str) -> Result<LaneCode> {
        Ok(LaneCode {
            number: lane_number(code)?,
            kind: lane_kind(code),
        })
    }
}

fn lane_kind(code: &str) -> LaneKind {
    let letter = LANE_LETTER
        .find(code)
        .and_then(|m| m.as_str().chars().next());
    LaneKind::from_letter(letter)
}

fn lane_number(code: &str) -> Result<u32> {
    LANE_CODE
        .captures(code.trim())
        .and_then(|c| c.name("number"))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .ok_or_else(|| JoinError::malformed(format!("lane code '{}' has no lane number", code)))
}

/// Lane numbers of the lanes whose kind is in `kinds`, in input order.
///
/// Only kept lanes need a lane number; codes filtered out by kind are never
/// parsed further.
pub fn filter_lanes<S: AsRef<str>>(codes: &[S], kinds: &[LaneKind]) -> Result<Vec<u32>> {
    let mut numbers = Vec::new();
    for code in codes {
        let code = code.as_ref();
        if kinds.contains(&lane_kind(code)) {
            numbers.push(lane_number(code)?);
        }
    }
    Ok(numbers)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SeparateCarriageways {
    #[serde(alias = "Nei", alias = "no")]
    No,
    #[serde(alias = "Med", alias = "with")]
    With,
    #[serde(alias = "Mot", alias = "against")]
    Against,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Section {
    #[serde(default, alias = "adskilte_løp")]
    separate_carriageways: Option<SeparateCarriageways>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoadSystemReference {
    #[serde(default, alias = "strekning")]
    section: Option<Section>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentLanes {
    #[serde(default, alias = "feltoversikt")]
    lane_overview: Option<Vec<String>>,
    #[serde(default, alias = "detaljnivå")]
    detail_level: Option<String>,
    #[serde(default, alias = "vegsystemreferanse")]
    road_system_reference: Option<RoadSystemReference>,
}

fn is_road_trace(detail_level: &str) -> bool {
    detail_level.contains("Vegtrase") || detail_level.to_ascii_uppercase().starts_with("VT")
}

/// True if the segment is a four-lane road.
///
/// Only segments at road-trace detail level with a lane overview qualify.
/// Without separate carriageways all of lanes 1-4 must be driving lanes.
/// With separate carriageways (each direction its own segment) at least two
/// driving lanes are needed, and lanes 1 and 2 must not both be present, which
/// would mean traffic in both directions on one carriageway.
pub fn is_four_lane(segment: &Row) -> Result<bool> {
    let parsed: SegmentLanes = serde_json::from_value(serde_json::Value::Object(segment.clone()))
        .map_err(|e| JoinError::malformed(format!("invalid road segment: {}", e)))?;

    let (Some(lanes), Some(detail)) = (parsed.lane_overview, parsed.detail_level) else {
        return Ok(false);
    };
    if !is_road_trace(&detail) {
        return Ok(false);
    }

    let separation = parsed
        .road_system_reference
        .and_then(|r| r.section)
        .and_then(|s| s.separate_carriageways);

    let driving: BTreeSet<u32> = filter_lanes(&lanes, &DRIVING_LANE_KINDS)?
        .into_iter()
        .collect();

    Ok(match separation {
        Some(SeparateCarriageways::No) => contains_all(&driving, &[1, 2, 3, 4]),
        Some(SeparateCarriageways::With) => driving.len() >= 2 && !contains_all(&driving, &[1, 2]),
        _ => false,
    })
}

fn contains_all(lanes: &BTreeSet<u32>, wanted: &[u32]) -> bool {
    wanted.iter().all(|n| lanes.contains(n))
}
