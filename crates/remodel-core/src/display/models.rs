//! Display implementations for domain models.
//!
//! All output is Markdown so the CLI can render it with rich formatting.

use std::fmt;

use super::{collections::Materials, datetime::LocalDateTime};
use crate::models::{Difficulty, Material, Plan, Step};

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;
        writeln!(f)?;

        if !self.style_summary.is_empty() {
            writeln!(f, "- Style: {}", self.style_summary)?;
        }
        if !self.estimated_cost.is_empty() {
            writeln!(f, "- Estimated cost: {}", self.estimated_cost)?;
        }
        if !self.estimated_time.is_empty() {
            writeln!(f, "- Estimated time: {}", self.estimated_time)?;
        }
        writeln!(f, "- Created: {}", LocalDateTime::new(&self.created_at))?;

        if !self.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.description)?;
        }

        writeln!(f, "\n## Steps")?;
        writeln!(f)?;
        for step in &self.steps {
            write!(f, "{step}")?;
        }

        if !self.materials.is_empty() {
            writeln!(f, "## Materials")?;
            writeln!(f)?;
            write!(f, "{}", Materials(&self.materials))?;
        }

        Ok(())
    }
}

impl Step {
    /// Heading, body and notes, without the checklist.
    pub(crate) fn fmt_body(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "### {}. {} ({}", self.step_number, self.title, self.difficulty.with_icon())?;
        if !self.estimated_time.is_empty() {
            write!(f, ", {}", self.estimated_time)?;
        }
        writeln!(f, ")")?;
        writeln!(f)?;
        writeln!(f, "{}", self.instruction)?;
        writeln!(f)?;

        if let Some(warning) = &self.safety_warning {
            writeln!(f, "> **Safety:** {warning}")?;
            writeln!(f)?;
        }
        if let Some(tip) = &self.tip {
            writeln!(f, "> **Tip:** {tip}")?;
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_body(f)?;
        if !self.substeps.is_empty() {
            for substep in &self.substeps {
                writeln!(f, "- {substep}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "**{}**", self.name)?;
        if !self.quantity.is_empty() {
            write!(f, " × {}", self.quantity)?;
        }
        if !self.estimated_cost.is_empty() {
            write!(f, " ({})", self.estimated_cost)?;
        }
        if let Some(notes) = &self.notes {
            write!(f, ": {notes}")?;
        }
        Ok(())
    }
}
