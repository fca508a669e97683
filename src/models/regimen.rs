//! The regimen data model: one treatment plan, two fixed phases.
//!
//! `Phases` is a struct rather than a map so the "exactly Phase 1 and
//! Phase 2, always present" invariant holds by construction; the two
//! fields serialize under the display keys `"Phase 1"` / `"Phase 2"`.
//! Row records are fixed shapes: unknown columns are a deserialization
//! error, absent cells default to the empty string.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One complete chemotherapy treatment plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Regimen {
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub regimen_name: String,
    #[serde(default)]
    pub phases: Phases,
}

/// The two treatment phases, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Phases {
    #[serde(rename = "Phase 1", default)]
    pub phase1: Phase,
    #[serde(rename = "Phase 2", default)]
    pub phase2: Phase,
}

/// Addresses one of the two phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseId {
    Phase1,
    Phase2,
}

impl PhaseId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phase1 => "phase1",
            Self::Phase2 => "phase2",
        }
    }

    /// Display key used in the serialized `phases` mapping.
    pub fn display_key(&self) -> &'static str {
        match self {
            Self::Phase1 => "Phase 1",
            Self::Phase2 => "Phase 2",
        }
    }

    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "phase1" => Some(Self::Phase1),
            "phase2" => Some(Self::Phase2),
            _ => None,
        }
    }
}

impl Phases {
    pub fn get(&self, id: PhaseId) -> &Phase {
        match id {
            PhaseId::Phase1 => &self.phase1,
            PhaseId::Phase2 => &self.phase2,
        }
    }

    pub fn get_mut(&mut self, id: PhaseId) -> &mut Phase {
        match id {
            PhaseId::Phase1 => &mut self.phase1,
            PhaseId::Phase2 => &mut self.phase2,
        }
    }
}

/// One stage of treatment. All four sub-fields are always present;
/// absent extracted data leaves them empty, never null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Phase {
    #[serde(default)]
    pub pretreatment: Vec<PretreatmentMedication>,
    #[serde(default)]
    pub chemotherapy: Vec<ChemotherapyMedication>,
    #[serde(default)]
    pub targeted_therapy: Vec<TargetedTherapy>,
    #[serde(default)]
    pub cycle_details: BTreeMap<String, String>,
}

impl Phase {
    pub fn is_empty(&self) -> bool {
        self.pretreatment.is_empty()
            && self.chemotherapy.is_empty()
            && self.targeted_therapy.is_empty()
            && self.cycle_details.is_empty()
    }
}

/// Supportive medication given before chemotherapy. Free text throughout;
/// no numeric or unit validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PretreatmentMedication {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dose: String,
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub timing: String,
}

/// A chemotherapy agent with its infusion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ChemotherapyMedication {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dose: String,
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub infusion_time: String,
}

/// A targeted agent with a per-week dosing schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetedTherapy {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dosing: Vec<DosingEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DosingEntry {
    #[serde(default)]
    pub week: String,
    #[serde(default)]
    pub dose: String,
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub infusion_time: String,
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
