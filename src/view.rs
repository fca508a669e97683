//! Presentation-adapter state for one session.
//!
//! The editable tables work on a render/submit cycle: a render pass
//! returns the current rows and records them as the last-rendered
//! snapshot; a submit carries the full edited contents back. Submitted
//! rows identical to the snapshot are a no-op; anything else replaces the
//! stored sequence wholly. Cell-level patching never happens at the data
//! model.
//!
//! The embedded sub-view gets a side-channel snapshot of the header
//! fields plus Phase 1, re-pushed through a watch channel on every
//! header/Phase-1 change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use crate::models::{
    ChemotherapyMedication, DosingEntry, Phase, PhaseId, PretreatmentMedication, Regimen,
    TargetedTherapy,
};

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("no targeted therapy named '{0}' in this phase")]
    TherapyNotFound(String),
}

// ═══════════════════════════════════════════════════════════
// View mode
// ═══════════════════════════════════════════════════════════

/// The two mutually exclusive view modes. Switching modes never touches
/// the regimen or the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Chat,
    Data,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Data => "data",
        }
    }
}

/// Addresses one of the two editable medication tables of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Pretreatment,
    Chemotherapy,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pretreatment => "pretreatment",
            Self::Chemotherapy => "chemotherapy",
        }
    }

    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "pretreatment" => Some(Self::Pretreatment),
            "chemotherapy" => Some(Self::Chemotherapy),
            _ => None,
        }
    }
}

/// Whether a submit changed the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    Unchanged,
    Replaced,
}

impl SubmitOutcome {
    pub fn replaced(&self) -> bool {
        matches!(self, Self::Replaced)
    }
}

// ═══════════════════════════════════════════════════════════
// Embedded-view snapshot
// ═══════════════════════════════════════════════════════════

/// Header fields plus Phase 1, as exposed to the embedded sub-view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EmbedSnapshot {
    pub diagnosis: String,
    pub regimen_name: String,
    pub phase1: Phase,
}

impl EmbedSnapshot {
    pub fn capture(regimen: &Regimen) -> Self {
        Self {
            diagnosis: regimen.diagnosis.clone(),
            regimen_name: regimen.regimen_name.clone(),
            phase1: regimen.phases.phase1.clone(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Session view state
// ═══════════════════════════════════════════════════════════

/// Per-session view state: mode, last-rendered table snapshots, and the
/// embed-snapshot channel. Lives behind the session lock, so renders and
/// submits are serialized with every other interaction of that session.
pub struct SessionView {
    mode: ViewMode,
    pretreatment_snapshots: HashMap<PhaseId, Vec<PretreatmentMedication>>,
    chemotherapy_snapshots: HashMap<PhaseId, Vec<ChemotherapyMedication>>,
    dosing_snapshots: HashMap<(PhaseId, String), Vec<DosingEntry>>,
    embed_tx: watch::Sender<EmbedSnapshot>,
}

impl SessionView {
    pub fn new(regimen: &Regimen) -> Self {
        let (embed_tx, _) = watch::channel(EmbedSnapshot::capture(regimen));
        Self {
            mode: ViewMode::default(),
            pretreatment_snapshots: HashMap::new(),
            chemotherapy_snapshots: HashMap::new(),
            dosing_snapshots: HashMap::new(),
            embed_tx,
        }
    }

    // ── Mode ────────────────────────────────────────────────

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    // ── Embedded-view channel ───────────────────────────────

    /// Subscribe to embed-snapshot pushes. The receiver sees the current
    /// snapshot immediately and every push after that.
    pub fn subscribe_embed(&self) -> watch::Receiver<EmbedSnapshot> {
        self.embed_tx.subscribe()
    }

    /// Recompute the snapshot from the store and push it to subscribers.
    pub fn push_embed(&self, regimen: &Regimen) {
        self.embed_tx.send_replace(EmbedSnapshot::capture(regimen));
    }

    /// A successful document merge rewrote the headers and Phase 1:
    /// drop the now-stale Phase 1 render snapshots and re-push the embed
    /// snapshot. Phase 2 snapshots stay valid — merge never touches it.
    pub fn merge_applied(&mut self, regimen: &Regimen) {
        self.pretreatment_snapshots.remove(&PhaseId::Phase1);
        self.chemotherapy_snapshots.remove(&PhaseId::Phase1);
        self.dosing_snapshots
            .retain(|(phase, _), _| *phase != PhaseId::Phase1);
        self.push_embed(regimen);
    }

    // ── Render passes ───────────────────────────────────────

    pub fn render_pretreatment(
        &mut self,
        phase: PhaseId,
        regimen: &Regimen,
    ) -> Vec<PretreatmentMedication> {
        let rows = regimen.phases.get(phase).pretreatment.clone();
        self.pretreatment_snapshots.insert(phase, rows.clone());
        rows
    }

    pub fn render_chemotherapy(
        &mut self,
        phase: PhaseId,
        regimen: &Regimen,
    ) -> Vec<ChemotherapyMedication> {
        let rows = regimen.phases.get(phase).chemotherapy.clone();
        self.chemotherapy_snapshots.insert(phase, rows.clone());
        rows
    }

    /// Render the targeted-therapy sub-tables, one per therapy, recording
    /// each therapy's dosing snapshot independently.
    pub fn render_therapies(&mut self, phase: PhaseId, regimen: &Regimen) -> Vec<TargetedTherapy> {
        let therapies = regimen.phases.get(phase).targeted_therapy.clone();
        for therapy in &therapies {
            self.dosing_snapshots
                .insert((phase, therapy.name.clone()), therapy.dosing.clone());
        }
        therapies
    }

    // ── Submits ─────────────────────────────────────────────

    /// Write back an edited pretreatment table. Identical to the last
    /// render is a no-op; otherwise the whole sequence is replaced.
    pub fn submit_pretreatment(
        &mut self,
        phase: PhaseId,
        regimen: &mut Regimen,
        rows: Vec<PretreatmentMedication>,
    ) -> SubmitOutcome {
        if self.pretreatment_snapshots.get(&phase) == Some(&rows) {
            return SubmitOutcome::Unchanged;
        }
        regimen.phases.get_mut(phase).pretreatment = rows.clone();
        self.pretreatment_snapshots.insert(phase, rows);
        self.after_table_change(phase, regimen);
        SubmitOutcome::Replaced
    }

    pub fn submit_chemotherapy(
        &mut self,
        phase: PhaseId,
        regimen: &mut Regimen,
        rows: Vec<ChemotherapyMedication>,
    ) -> SubmitOutcome {
        if self.chemotherapy_snapshots.get(&phase) == Some(&rows) {
            return SubmitOutcome::Unchanged;
        }
        regimen.phases.get_mut(phase).chemotherapy = rows.clone();
        self.chemotherapy_snapshots.insert(phase, rows);
        self.after_table_change(phase, regimen);
        SubmitOutcome::Replaced
    }

    /// Write back one therapy's edited dosing sub-table.
    pub fn submit_dosing(
        &mut self,
        phase: PhaseId,
        regimen: &mut Regimen,
        therapy_name: &str,
        rows: Vec<DosingEntry>,
    ) -> Result<SubmitOutcome, ViewError> {
        let key = (phase, therapy_name.to_string());
        if self.dosing_snapshots.get(&key) == Some(&rows) {
            return Ok(SubmitOutcome::Unchanged);
        }

        let therapy = regimen
            .phases
            .get_mut(phase)
            .targeted_therapy
            .iter_mut()
            .find(|t| t.name == therapy_name)
            .ok_or_else(|| ViewError::TherapyNotFound(therapy_name.to_string()))?;

        therapy.dosing = rows.clone();
        self.dosing_snapshots.insert(key, rows);
        self.after_table_change(phase, regimen);
        Ok(SubmitOutcome::Replaced)
    }

    /// Phase 1 table changes feed the embedded sub-view; Phase 2 edits
    /// do not.
    fn after_table_change(&self, phase: PhaseId, regimen: &Regimen) {
        if phase == PhaseId::Phase1 {
            self.push_embed(regimen);
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn chemo_row(name: &str) -> ChemotherapyMedication {
        ChemotherapyMedication {
            name: name.into(),
            dose: "100mg/m2".into(),
            route: "IV".into(),
            infusion_time: "1h".into(),
        }
    }

    fn regimen_with_chemo() -> Regimen {
        let mut regimen = Regimen::default();
        regimen.phases.phase1.chemotherapy.push(chemo_row("Cytarabine"));
        regimen
    }

    #[test]
    fn default_mode_is_chat() {
        let view = SessionView::new(&Regimen::default());
        assert_eq!(view.mode(), ViewMode::Chat);
    }

    #[test]
    fn mode_switch_does_not_touch_store() {
        let regimen = regimen_with_chemo();
        let before = regimen.clone();
        let mut view = SessionView::new(&regimen);

        view.set_mode(ViewMode::Data);
        view.set_mode(ViewMode::Chat);

        assert_eq!(view.mode(), ViewMode::Chat);
        assert_eq!(regimen, before);
    }

    #[test]
    fn identical_resubmit_is_no_op() {
        let mut regimen = regimen_with_chemo();
        let mut view = SessionView::new(&regimen);

        let rendered = view.render_chemotherapy(PhaseId::Phase1, &regimen);
        let outcome = view.submit_chemotherapy(PhaseId::Phase1, &mut regimen, rendered);

        assert_eq!(outcome, SubmitOutcome::Unchanged);
        assert_eq!(regimen.phases.phase1.chemotherapy, vec![chemo_row("Cytarabine")]);
    }

    #[test]
    fn identical_resubmit_pushes_no_embed() {
        let mut regimen = regimen_with_chemo();
        let mut view = SessionView::new(&regimen);
        let mut rx = view.subscribe_embed();
        rx.borrow_and_update();

        let rendered = view.render_chemotherapy(PhaseId::Phase1, &regimen);
        view.submit_chemotherapy(PhaseId::Phase1, &mut regimen, rendered);

        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn edited_submit_replaces_wholly() {
        let mut regimen = regimen_with_chemo();
        let mut view = SessionView::new(&regimen);

        view.render_chemotherapy(PhaseId::Phase1, &regimen);
        let edited = vec![chemo_row("Cytarabine"), chemo_row("Daunorubicin")];
        let outcome = view.submit_chemotherapy(PhaseId::Phase1, &mut regimen, edited.clone());

        assert_eq!(outcome, SubmitOutcome::Replaced);
        assert_eq!(regimen.phases.phase1.chemotherapy, edited);
    }

    #[test]
    fn row_deletion_submits_as_replace() {
        let mut regimen = regimen_with_chemo();
        let mut view = SessionView::new(&regimen);

        view.render_chemotherapy(PhaseId::Phase1, &regimen);
        let outcome = view.submit_chemotherapy(PhaseId::Phase1, &mut regimen, vec![]);

        assert_eq!(outcome, SubmitOutcome::Replaced);
        assert!(regimen.phases.phase1.chemotherapy.is_empty());
    }

    #[test]
    fn unseen_submit_is_taken_at_face_value() {
        let mut regimen = Regimen::default();
        let mut view = SessionView::new(&regimen);

        // No render pass first: the submit still replaces.
        let outcome =
            view.submit_chemotherapy(PhaseId::Phase2, &mut regimen, vec![chemo_row("Fludarabine")]);
        assert_eq!(outcome, SubmitOutcome::Replaced);
        assert_eq!(regimen.phases.phase2.chemotherapy.len(), 1);
    }

    #[test]
    fn phase1_change_pushes_embed_snapshot() {
        let mut regimen = Regimen::default();
        let mut view = SessionView::new(&regimen);
        let mut rx = view.subscribe_embed();
        rx.borrow_and_update();

        view.submit_chemotherapy(PhaseId::Phase1, &mut regimen, vec![chemo_row("Cytarabine")]);

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.phase1.chemotherapy[0].name, "Cytarabine");
    }

    #[test]
    fn phase2_change_pushes_no_embed_snapshot() {
        let mut regimen = Regimen::default();
        let mut view = SessionView::new(&regimen);
        let mut rx = view.subscribe_embed();
        rx.borrow_and_update();

        view.submit_chemotherapy(PhaseId::Phase2, &mut regimen, vec![chemo_row("Fludarabine")]);

        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn dosing_submit_targets_one_therapy() {
        let mut regimen = Regimen::default();
        regimen.phases.phase1.targeted_therapy = vec![
            TargetedTherapy {
                name: "Trastuzumab".into(),
                dosing: vec![DosingEntry {
                    week: "1".into(),
                    dose: "8mg/kg".into(),
                    route: "IV".into(),
                    infusion_time: "90min".into(),
                }],
            },
            TargetedTherapy {
                name: "Pertuzumab".into(),
                dosing: vec![],
            },
        ];
        let mut view = SessionView::new(&regimen);
        view.render_therapies(PhaseId::Phase1, &regimen);

        let edited = vec![DosingEntry {
            week: "1".into(),
            dose: "6mg/kg".into(),
            route: "IV".into(),
            infusion_time: "30min".into(),
        }];
        let outcome = view
            .submit_dosing(PhaseId::Phase1, &mut regimen, "Trastuzumab", edited.clone())
            .unwrap();

        assert_eq!(outcome, SubmitOutcome::Replaced);
        assert_eq!(regimen.phases.phase1.targeted_therapy[0].dosing, edited);
        assert!(regimen.phases.phase1.targeted_therapy[1].dosing.is_empty());
    }

    #[test]
    fn dosing_resubmit_of_rendered_rows_is_no_op() {
        let mut regimen = Regimen::default();
        regimen.phases.phase1.targeted_therapy = vec![TargetedTherapy {
            name: "Rituximab".into(),
            dosing: vec![DosingEntry {
                week: "1".into(),
                dose: "375mg/m2".into(),
                route: "IV".into(),
                infusion_time: "4h".into(),
            }],
        }];
        let mut view = SessionView::new(&regimen);

        let rendered = view.render_therapies(PhaseId::Phase1, &regimen);
        let outcome = view
            .submit_dosing(
                PhaseId::Phase1,
                &mut regimen,
                "Rituximab",
                rendered[0].dosing.clone(),
            )
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Unchanged);
    }

    #[test]
    fn dosing_submit_unknown_therapy_errors() {
        let mut regimen = Regimen::default();
        let mut view = SessionView::new(&regimen);

        let result = view.submit_dosing(PhaseId::Phase1, &mut regimen, "Imatinib", vec![]);
        assert!(matches!(result, Err(ViewError::TherapyNotFound(_))));
    }

    #[test]
    fn merge_applied_pushes_and_invalidates_phase1_snapshots() {
        let mut regimen = regimen_with_chemo();
        let mut view = SessionView::new(&regimen);
        let mut rx = view.subscribe_embed();
        rx.borrow_and_update();

        view.render_chemotherapy(PhaseId::Phase1, &regimen);
        regimen.diagnosis = "AML".into();
        view.merge_applied(&regimen);

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().diagnosis, "AML");

        // Snapshot was dropped: re-submitting the previously rendered rows
        // now counts as a change.
        let rows = regimen.phases.phase1.chemotherapy.clone();
        let outcome = view.submit_chemotherapy(PhaseId::Phase1, &mut regimen, rows);
        assert_eq!(outcome, SubmitOutcome::Replaced);
    }

    #[test]
    fn embed_snapshot_excludes_phase2() {
        let mut regimen = regimen_with_chemo();
        regimen.phases.phase2.chemotherapy.push(chemo_row("Fludarabine"));

        let snapshot = EmbedSnapshot::capture(&regimen);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("phase1").is_some());
        assert!(json.get("phase2").is_none());
        assert!(json.get("phases").is_none());
    }
}
