//! Merge of an extraction result into the regimen store.
//!
//! The fragment envelope is lenient: unknown top-level keys (including a
//! stray `phase2`) are ignored, matching the one-phase-at-a-time workflow
//! where only Phase 1 is ever written. Row records inside the fragment are
//! the strict model types, so a wrong column or type anywhere rejects the
//! whole merge and the store keeps its pre-merge state.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::models::{
    ChemotherapyMedication, PretreatmentMedication, Regimen, TargetedTherapy,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("extraction result does not fit the regimen shape: {0}")]
    InvalidShape(#[from] serde_json::Error),
}

/// Top-level extraction fragment. Headers default to empty on merge when
/// absent; `phase1` absent means Phase 1 is left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegimenFragment {
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub regimen_name: Option<String>,
    #[serde(default)]
    pub phase1: Option<PhaseFragment>,
}

/// Phase 1 portion of a fragment. Each sub-field that is absent defaults
/// to empty on merge, never to the prior value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhaseFragment {
    #[serde(default)]
    pub pretreatment: Option<Vec<PretreatmentMedication>>,
    #[serde(default)]
    pub chemotherapy: Option<Vec<ChemotherapyMedication>>,
    #[serde(default)]
    pub targeted_therapy: Option<Vec<TargetedTherapy>>,
    #[serde(default)]
    pub cycle_details: Option<BTreeMap<String, String>>,
}

/// Merge an extraction result into `current`.
///
/// Headers are overwritten unconditionally (absent keys become the empty
/// string, not the prior value). When `phase1` is present its four
/// sub-fields are each overwritten, absent ones to empty. Phase 2 is never
/// touched. The merge is atomic: it is computed on a working copy and
/// swapped in only on success, so a shape error leaves `current` exactly
/// as it was.
pub fn merge_fragment(current: &mut Regimen, extracted: serde_json::Value) -> Result<(), StoreError> {
    let fragment: RegimenFragment = serde_json::from_value(extracted)?;

    let mut next = current.clone();
    next.diagnosis = fragment.diagnosis.unwrap_or_default();
    next.regimen_name = fragment.regimen_name.unwrap_or_default();

    if let Some(phase1) = fragment.phase1 {
        let target = &mut next.phases.phase1;
        target.pretreatment = phase1.pretreatment.unwrap_or_default();
        target.chemotherapy = phase1.chemotherapy.unwrap_or_default();
        target.targeted_therapy = phase1.targeted_therapy.unwrap_or_default();
        target.cycle_details = phase1.cycle_details.unwrap_or_default();
    }

    *current = next;
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn populated_regimen() -> Regimen {
        let mut regimen = Regimen {
            diagnosis: "CLL".into(),
            regimen_name: "FCR".into(),
            ..Default::default()
        };
        regimen.phases.phase1.pretreatment.push(PretreatmentMedication {
            name: "Ondansetron".into(),
            dose: "8mg".into(),
            route: "PO".into(),
            timing: "30min before".into(),
        });
        regimen.phases.phase2.chemotherapy.push(ChemotherapyMedication {
            name: "Fludarabine".into(),
            dose: "25mg/m2".into(),
            route: "IV".into(),
            infusion_time: "30min".into(),
        });
        regimen
            .phases
            .phase2
            .cycle_details
            .insert("cycles".into(), "6".into());
        regimen
    }

    #[test]
    fn aml_scenario_into_empty_regimen() {
        let mut regimen = Regimen::default();
        merge_fragment(
            &mut regimen,
            json!({
                "diagnosis": "AML",
                "phase1": {
                    "chemotherapy": [
                        {"name": "Cytarabine", "dose": "100mg/m2", "route": "IV", "infusion_time": "1h"}
                    ]
                }
            }),
        )
        .unwrap();

        assert_eq!(regimen.diagnosis, "AML");
        assert_eq!(regimen.regimen_name, "");
        assert_eq!(regimen.phases.phase1.chemotherapy.len(), 1);
        assert_eq!(regimen.phases.phase1.chemotherapy[0].name, "Cytarabine");
        assert_eq!(regimen.phases.phase1.chemotherapy[0].dose, "100mg/m2");
        assert!(regimen.phases.phase1.pretreatment.is_empty());
        assert!(regimen.phases.phase1.targeted_therapy.is_empty());
        assert!(regimen.phases.phase2.is_empty());
    }

    #[test]
    fn phase1_only_fragment_leaves_phase2_identical() {
        let mut regimen = populated_regimen();
        let phase2_before = regimen.phases.phase2.clone();

        merge_fragment(
            &mut regimen,
            json!({
                "phase1": {
                    "pretreatment": [
                        {"name": "Dexamethasone", "dose": "20mg", "route": "IV", "timing": "day 1"}
                    ]
                }
            }),
        )
        .unwrap();

        assert_eq!(regimen.phases.phase2, phase2_before);
        assert_eq!(regimen.phases.phase1.pretreatment[0].name, "Dexamethasone");
    }

    #[test]
    fn stray_phase2_key_is_ignored() {
        let mut regimen = populated_regimen();
        let phase2_before = regimen.phases.phase2.clone();

        merge_fragment(
            &mut regimen,
            json!({
                "diagnosis": "DLBCL",
                "phase2": {
                    "chemotherapy": [{"name": "Doxorubicin", "dose": "50mg/m2", "route": "IV", "infusion_time": "15min"}]
                }
            }),
        )
        .unwrap();

        assert_eq!(regimen.diagnosis, "DLBCL");
        assert_eq!(regimen.phases.phase2, phase2_before);
    }

    #[test]
    fn omitted_diagnosis_overwrites_to_empty() {
        let mut regimen = populated_regimen();
        merge_fragment(&mut regimen, json!({"regimen_name": "R-CHOP"})).unwrap();
        assert_eq!(regimen.diagnosis, "");
        assert_eq!(regimen.regimen_name, "R-CHOP");
    }

    #[test]
    fn null_headers_treated_as_absent() {
        let mut regimen = populated_regimen();
        merge_fragment(&mut regimen, json!({"diagnosis": null, "regimen_name": null})).unwrap();
        assert_eq!(regimen.diagnosis, "");
        assert_eq!(regimen.regimen_name, "");
    }

    #[test]
    fn absent_phase1_leaves_phase1_untouched() {
        let mut regimen = populated_regimen();
        let phase1_before = regimen.phases.phase1.clone();

        merge_fragment(&mut regimen, json!({"diagnosis": "AML"})).unwrap();
        assert_eq!(regimen.phases.phase1, phase1_before);
    }

    #[test]
    fn present_phase1_clears_omitted_sub_fields() {
        let mut regimen = populated_regimen();
        assert!(!regimen.phases.phase1.pretreatment.is_empty());

        merge_fragment(&mut regimen, json!({"phase1": {}})).unwrap();
        assert!(regimen.phases.phase1.is_empty());
    }

    #[test]
    fn merge_is_idempotent() {
        let fragment = json!({
            "diagnosis": "AML",
            "regimen_name": "7+3",
            "phase1": {
                "chemotherapy": [
                    {"name": "Cytarabine", "dose": "100mg/m2", "route": "IV", "infusion_time": "24h"},
                    {"name": "Daunorubicin", "dose": "60mg/m2", "route": "IV", "infusion_time": "15min"}
                ],
                "cycle_details": {"length": "7 days"}
            }
        });

        let mut once = populated_regimen();
        merge_fragment(&mut once, fragment.clone()).unwrap();

        let mut twice = populated_regimen();
        merge_fragment(&mut twice, fragment.clone()).unwrap();
        merge_fragment(&mut twice, fragment).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_row_column_rolls_back_whole_merge() {
        let mut regimen = populated_regimen();
        let before = regimen.clone();

        let err = merge_fragment(
            &mut regimen,
            json!({
                "diagnosis": "AML",
                "phase1": {
                    "chemotherapy": [
                        {"name": "Cytarabine", "dose": "100mg/m2", "schedule": "q12h"}
                    ]
                }
            }),
        )
        .unwrap_err();

        assert!(matches!(err, StoreError::InvalidShape(_)));
        assert_eq!(regimen, before, "failed merge must not touch the store");
    }

    #[test]
    fn wrong_typed_header_rolls_back_whole_merge() {
        let mut regimen = populated_regimen();
        let before = regimen.clone();

        let result = merge_fragment(&mut regimen, json!({"diagnosis": 42}));
        assert!(result.is_err());
        assert_eq!(regimen, before);
    }

    #[test]
    fn non_string_cycle_details_rejected() {
        let mut regimen = Regimen::default();
        let result = merge_fragment(
            &mut regimen,
            json!({"phase1": {"cycle_details": {"length": 28}}}),
        );
        assert!(result.is_err());
        assert_eq!(regimen, Regimen::default());
    }

    #[test]
    fn targeted_therapy_dosing_merges() {
        let mut regimen = Regimen::default();
        merge_fragment(
            &mut regimen,
            json!({
                "regimen_name": "Trastuzumab maintenance",
                "phase1": {
                    "targeted_therapy": [{
                        "name": "Trastuzumab",
                        "dosing": [
                            {"week": "1", "dose": "8mg/kg", "route": "IV", "infusion_time": "90min"},
                            {"week": "4", "dose": "6mg/kg", "route": "IV", "infusion_time": "30min"}
                        ]
                    }]
                }
            }),
        )
        .unwrap();

        let therapy = &regimen.phases.phase1.targeted_therapy[0];
        assert_eq!(therapy.name, "Trastuzumab");
        assert_eq!(therapy.dosing.len(), 2);
        assert_eq!(therapy.dosing[1].week, "4");
    }
}
