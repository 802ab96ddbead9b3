//! Client-side list filtering
//!
//! Three independent substring filters, ANDed. Matching ignores case and
//! diacritics, so `eletrica` finds `ELÉTRICA`.

use stockroom_common::text::contains_folded;
use stockroom_common::Material;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialFilter {
    pub code: String,
    pub description: String,
    pub category: String,
}

impl MaterialFilter {
    pub fn matches(&self, material: &Material) -> bool {
        contains_folded(&material.code, &self.code)
            && contains_folded(&material.description, &self.description)
            && contains_folded(&material.category, &self.category)
    }

    /// Materials passing every filter, order preserved
    pub fn apply<'a>(&self, materials: &'a [Material]) -> Vec<&'a Material> {
        materials.iter().filter(|m| self.matches(m)).collect()
    }
}
