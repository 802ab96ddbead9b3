//! Known material categories
//!
//! Offered by the client form. The server stores category as free text, so
//! imported legacy categories outside this list remain valid.

/// Categories offered when creating or editing a material
pub const KNOWN_CATEGORIES: [&str; 15] = [
    "CHAVEIRO",
    "CIVIL",
    "ELÉTRICA",
    "ELETRÔNICA",
    "EPI",
    "ESCRITÓRIO",
    "FERRAMENTA",
    "HIDRÁULICA",
    "LIMPEZA",
    "MECÂNICA",
    "MOBILIÁRIO",
    "PINTURA",
    "REFRIGERAÇÃO",
    "SDAI",
    "SERRALHERIA",
];

/// True if `category` (already normalized) is one of the known categories
pub fn is_known_category(category: &str) -> bool {
    KNOWN_CATEGORIES.contains(&category)
}
