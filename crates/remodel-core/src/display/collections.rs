//! Collection wrapper types for displaying groups of domain objects.

use std::fmt;

use crate::models::Material;

/// Newtype wrapper for displaying a shopping list.
///
/// # Examples
///
/// ```rust
/// use remodel_core::{display::Materials, models::Material};
///
/// let materials = vec![Material {
///     name: "Matte black handles".to_string(),
///     quantity: "8".to_string(),
///     estimated_cost: "$64".to_string(),
///     notes: None,
/// }];
///
/// let output = format!("{}", Materials(&materials));
/// assert!(output.contains("- **Matte black handles** × 8 ($64)"));
/// ```
pub struct Materials<'a>(pub &'a [Material]);

impl Materials<'_> {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Materials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No materials listed.");
        }
        for material in self.0 {
            writeln!(f, "- {material}")?;
        }
        writeln!(f)
    }
}
