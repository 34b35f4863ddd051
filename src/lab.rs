//! Virtual chemistry lab: a toy beaker-mixing simulation.
//!
//! Everything is client-local and deterministic apart from a bounded
//! random temperature bump when an experiment is conducted. Colors and
//! reactions come from small literal tables; this is a teaching toy, not
//! a physics engine.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Maximum beaker volume in milliliters; additions are clamped here.
pub const BEAKER_CAPACITY: u32 = 250;

/// Resting temperature of a clean beaker, in °C.
pub const ROOM_TEMPERATURE: f64 = 25.0;

const TRANSPARENT: &str = "transparent";
const FALLBACK_MIX_COLOR: &str = "#dda0dd";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReagentKind {
    Acid,
    Base,
    Salt,
    Water,
    Indicator,
    Metal,
    Gas,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Reagent {
    pub id: &'static str,
    pub name: &'static str,
    pub formula: &'static str,
    pub color: &'static str,
    pub kind: ReagentKind,
    pub volume: u32,
}

/// The fixed reagent shelf available in every lab.
pub fn reagent_catalog() -> &'static [Reagent] {
    use ReagentKind::*;
    &[
        Reagent { id: "hcl", name: "Hydrochloric Acid", formula: "HCl", color: "#ff6b6b", kind: Acid, volume: 50 },
        Reagent { id: "naoh", name: "Sodium Hydroxide", formula: "NaOH", color: "#4ecdc4", kind: Base, volume: 50 },
        Reagent { id: "h2so4", name: "Sulfuric Acid", formula: "H2SO4", color: "#ff8c42", kind: Acid, volume: 50 },
        Reagent { id: "ca_oh_2", name: "Calcium Hydroxide", formula: "Ca(OH)2", color: "#95e1d3", kind: Base, volume: 50 },
        Reagent { id: "phenol", name: "Phenolphthalein", formula: "C20H14O4", color: "#c44569", kind: Indicator, volume: 10 },
        Reagent { id: "h2o", name: "Distilled Water", formula: "H2O", color: "#74b9ff", kind: Water, volume: 100 },
        Reagent { id: "zn", name: "Zinc Metal", formula: "Zn", color: "#a4b0be", kind: Metal, volume: 25 },
        Reagent { id: "cu", name: "Copper Sulfate", formula: "CuSO4", color: "#3742fa", kind: Salt, volume: 30 },
    ]
}

/// Looks up a shelf reagent by id.
pub fn reagent_by_id(id: &str) -> Option<&'static Reagent> {
    reagent_catalog().iter().find(|r| r.id == id)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabError {
    #[error("{0} is already in the beaker")]
    DuplicateReagent(String),

    #[error("at least 2 reagents are required to conduct an experiment")]
    NotEnoughReagents,
}

/// Outcome of conducting an experiment on a beaker's contents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReactionOutcome {
    pub name: String,
    pub product: String,
    pub color: String,
}

/// A single reaction vessel.
#[derive(Debug, Clone)]
pub struct Beaker {
    reagents: Vec<Reagent>,
    temperature: f64,
    volume: u32,
    color: String,
    bubbling: bool,
}

impl Default for Beaker {
    fn default() -> Self {
        Beaker {
            reagents: Vec::new(),
            temperature: ROOM_TEMPERATURE,
            volume: 0,
            color: TRANSPARENT.to_string(),
            bubbling: false,
        }
    }
}

impl Beaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reagents(&self) -> &[Reagent] {
        &self.reagents
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn volume(&self) -> u32 {
        self.volume
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn bubbling(&self) -> bool {
        self.bubbling
    }

    /// Pours one reagent in. Duplicates are rejected; volume accumulates
    /// but is clamped at `BEAKER_CAPACITY` on every addition; color and
    /// bubbling are re-derived from the new contents.
    pub fn add(&mut self, reagent: Reagent) -> Result<(), LabError> {
        if self.reagents.iter().any(|r| r.id == reagent.id) {
            return Err(LabError::DuplicateReagent(reagent.name.to_string()));
        }

        self.color = mix_colors(&self.color, reagent.color);
        self.volume = (self.volume + reagent.volume).min(BEAKER_CAPACITY);
        self.reagents.push(reagent);
        self.bubbling = self.reagents.len() > 1 && has_reaction(&self.reagents);

        debug!(
            "Beaker now holds {} reagents at {}ml",
            self.reagents.len(),
            self.volume
        );
        Ok(())
    }

    /// Runs the reaction lookup over the current contents. Requires at
    /// least two reagents; unmatched combinations fall back to a generic
    /// mixed-solution result. Temperature rises by a bounded random
    /// amount as a cosmetic effect.
    pub fn conduct_experiment(&mut self) -> Result<ReactionOutcome, LabError> {
        if self.reagents.len() < 2 {
            return Err(LabError::NotEnoughReagents);
        }

        let outcome = reaction_for(&self.reagents);
        self.temperature += rand::thread_rng().gen_range(10.0..40.0);
        self.bubbling = true;
        self.color = outcome.color.clone();

        Ok(outcome)
    }

    /// Returns the beaker to its clean, empty state.
    pub fn reset(&mut self) {
        *self = Beaker::default();
    }
}

/// Order-independent pairwise color mix over a small literal table.
pub fn mix_colors(current: &str, added: &str) -> String {
    if current == TRANSPARENT {
        return added.to_string();
    }
    if added == TRANSPARENT {
        return current.to_string();
    }

    let pair = [current, added];
    let has = |color: &str| pair.contains(&color);

    if has("#ff6b6b") && has("#4ecdc4") {
        "#98fb98".to_string() // acid + base neutralizes to green
    } else if has("#ff8c42") && has("#95e1d3") {
        "#ffd93d".to_string()
    } else if has("#c44569") {
        "#ff69b4".to_string() // indicator shift
    } else if has("#a4b0be") {
        "#87ceeb".to_string() // metal tint
    } else {
        FALLBACK_MIX_COLOR.to_string()
    }
}

/// True when the kind multiset contains one of the reacting pairs.
fn has_reaction(reagents: &[Reagent]) -> bool {
    let has_kind = |kind: ReagentKind| reagents.iter().any(|r| r.kind == kind);

    (has_kind(ReagentKind::Acid) && has_kind(ReagentKind::Base))
        || (has_kind(ReagentKind::Acid) && has_kind(ReagentKind::Metal))
        || (has_kind(ReagentKind::Salt) && has_kind(ReagentKind::Water))
}

/// Reaction lookup keyed by the sorted formula list.
fn reaction_for(reagents: &[Reagent]) -> ReactionOutcome {
    let mut formulas: Vec<&str> = reagents.iter().map(|r| r.formula).collect();
    formulas.sort_unstable();
    let has = |formula: &str| formulas.binary_search(&formula).is_ok();

    if has("HCl") && has("NaOH") {
        ReactionOutcome {
            name: "Acid-Base Neutralization".to_string(),
            product: "NaCl + H2O".to_string(),
            color: "#98fb98".to_string(),
        }
    } else if has("HCl") && has("Zn") {
        ReactionOutcome {
            name: "Metal-Acid Reaction".to_string(),
            product: "ZnCl2 + H2".to_string(),
            color: "#87ceeb".to_string(),
        }
    } else if has("CuSO4") && has("H2O") {
        ReactionOutcome {
            name: "Salt Dissolution".to_string(),
            product: "Cu2+ + SO4(2-)".to_string(),
            color: "#4169e1".to_string(),
        }
    } else {
        ReactionOutcome {
            name: "Mixed Solution".to_string(),
            product: "Complex mixture".to_string(),
            color: FALLBACK_MIX_COLOR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reagent(id: &str) -> Reagent {
        reagent_by_id(id).expect("catalog reagent").clone()
    }

    #[test]
    fn duplicate_reagents_are_rejected() {
        let mut beaker = Beaker::new();
        beaker.add(reagent("hcl")).unwrap();
        let err = beaker.add(reagent("hcl")).unwrap_err();
        assert_eq!(
            err,
            LabError::DuplicateReagent("Hydrochloric Acid".to_string())
        );
        assert_eq!(beaker.reagents().len(), 1);
    }

    #[test]
    fn acid_plus_base_bubbles_and_sums_volume() {
        let mut beaker = Beaker::new();
        beaker.add(reagent("hcl")).unwrap();
        assert!(!beaker.bubbling());
        beaker.add(reagent("naoh")).unwrap();

        assert!(beaker.bubbling());
        assert_eq!(beaker.volume(), 100);
        assert_eq!(beaker.color(), "#98fb98");
    }

    #[test]
    fn non_reacting_pair_does_not_bubble() {
        let mut beaker = Beaker::new();
        beaker.add(reagent("naoh")).unwrap();
        beaker.add(reagent("phenol")).unwrap();
        assert!(!beaker.bubbling());
    }

    #[test]
    fn salt_plus_water_counts_as_a_reacting_pair() {
        let mut beaker = Beaker::new();
        beaker.add(reagent("cu")).unwrap();
        beaker.add(reagent("h2o")).unwrap();
        assert!(beaker.bubbling());
    }

    #[test]
    fn volume_is_clamped_after_every_addition() {
        let mut beaker = Beaker::new();
        for id in ["hcl", "naoh", "h2o", "cu", "zn"] {
            beaker.add(reagent(id)).unwrap();
            assert!(beaker.volume() <= BEAKER_CAPACITY);
        }
        // 50 + 50 + 100 + 30 + 25 = 255, clamped
        assert_eq!(beaker.volume(), BEAKER_CAPACITY);
    }

    #[test]
    fn color_mixing_is_order_independent() {
        assert_eq!(mix_colors("#ff6b6b", "#4ecdc4"), mix_colors("#4ecdc4", "#ff6b6b"));
        assert_eq!(mix_colors("#ff6b6b", "#4ecdc4"), "#98fb98");
    }

    #[test]
    fn transparent_mixes_to_the_other_color() {
        assert_eq!(mix_colors("transparent", "#74b9ff"), "#74b9ff");
        assert_eq!(mix_colors("#74b9ff", "transparent"), "#74b9ff");
    }

    #[test]
    fn unknown_pairs_fall_back_to_the_default_color() {
        assert_eq!(mix_colors("#74b9ff", "#3742fa"), "#dda0dd");
    }

    #[test]
    fn experiment_requires_two_reagents() {
        let mut beaker = Beaker::new();
        beaker.add(reagent("hcl")).unwrap();
        assert_eq!(
            beaker.conduct_experiment().unwrap_err(),
            LabError::NotEnoughReagents
        );
    }

    #[test]
    fn neutralization_is_found_by_formula_lookup() {
        let mut beaker = Beaker::new();
        beaker.add(reagent("naoh")).unwrap();
        beaker.add(reagent("hcl")).unwrap();

        let outcome = beaker.conduct_experiment().unwrap();
        assert_eq!(outcome.name, "Acid-Base Neutralization");
        assert_eq!(outcome.product, "NaCl + H2O");
        assert!(beaker.bubbling());
        // bounded cosmetic bump
        assert!(beaker.temperature() >= ROOM_TEMPERATURE + 10.0);
        assert!(beaker.temperature() < ROOM_TEMPERATURE + 40.0);
    }

    #[test]
    fn unmatched_combination_yields_the_generic_result() {
        let mut beaker = Beaker::new();
        beaker.add(reagent("phenol")).unwrap();
        beaker.add(reagent("h2o")).unwrap();

        let outcome = beaker.conduct_experiment().unwrap();
        assert_eq!(outcome.name, "Mixed Solution");
    }

    #[test]
    fn reset_restores_the_default_state() {
        let mut beaker = Beaker::new();
        beaker.add(reagent("hcl")).unwrap();
        beaker.add(reagent("zn")).unwrap();
        beaker.conduct_experiment().unwrap();

        beaker.reset();
        assert!(beaker.reagents().is_empty());
        assert_eq!(beaker.volume(), 0);
        assert_eq!(beaker.color(), "transparent");
        assert_eq!(beaker.temperature(), ROOM_TEMPERATURE);
        assert!(!beaker.bubbling());
    }
}
