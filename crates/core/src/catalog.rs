use std::collections::HashSet;
use types::TemplateSlot;

use crate::error::ValidationError;

/// Structural checks on a group's slot template. All problems are reported
/// together.
pub fn validate_catalog(slots: &[TemplateSlot]) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();
    let mut seen = HashSet::new();

    for s in slots {
        if !seen.insert(s.id.as_str()) {
            errors.push(format!("duplicate slot id: {}", s.id));
        }
        if s.day_of_week > 6 {
            errors.push(format!(
                "slot {} has invalid dayOfWeek {}",
                s.id, s.day_of_week
            ));
        }
        if s.end_time <= s.start_time {
            errors.push(format!("slot {} ends before it starts", s.id));
        }
        if s.max_passengers == 0 {
            errors.push(format!("slot {} has maxPassengers=0", s.id));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Catalog(errors.join("; ")))
    }
}
