pub mod regimen;
pub mod transcript;

pub use regimen::{
    ChemotherapyMedication, DosingEntry, Phase, PhaseId, Phases, PretreatmentMedication, Regimen,
    TargetedTherapy,
};
pub use transcript::{ChatEntry, ChatRole, Transcript};
