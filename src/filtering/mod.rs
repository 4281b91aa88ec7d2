// DANS : src/filtering/mod.rs

// Filtres métier appliqués aux vues composites, après résolution.
pub mod eligibility;

pub use eligibility::EligibilityFilter;
