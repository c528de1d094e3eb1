//! Tracks which catalog section is under the navigation bar.

/// Distance from the viewport top, in pixels, at which a section counts as
/// the current one.
pub const ACTIVE_OFFSET: f64 = 100.0;

/// A rendered section's vertical extent relative to the viewport top.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionBox {
    pub category_id: i64,
    pub top: f64,
    pub bottom: f64,
}

impl SectionBox {
    #[must_use]
    pub fn new(category_id: i64, top: f64, bottom: f64) -> Self {
        Self {
            category_id,
            top,
            bottom,
        }
    }

    fn straddles(&self, offset: f64) -> bool {
        self.top <= offset && self.bottom > offset
    }
}

/// Highlighted navigation entry. Lives only while catalog content is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollSpy {
    active: Option<i64>,
}

impl ScrollSpy {
    /// Starts with the first section highlighted.
    #[must_use]
    pub fn new(first_category: Option<i64>) -> Self {
        Self {
            active: first_category,
        }
    }

    #[must_use]
    pub fn active(&self) -> Option<i64> {
        self.active
    }

    /// Recomputes the active section after a scroll.
    ///
    /// When no section straddles the offset (e.g. in a gap between
    /// sections) the previous highlight is kept.
    pub fn update(&mut self, sections: &[SectionBox]) -> Option<i64> {
        if let Some(hit) = sections.iter().find(|s| s.straddles(ACTIVE_OFFSET)) {
            if self.active != Some(hit.category_id) {
                tracing::trace!(category_id = hit.category_id, "active section changed");
            }
            self.active = Some(hit.category_id);
        }
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Vec<SectionBox> {
        vec![
            SectionBox::new(5, -300.0, 90.0),
            SectionBox::new(6, 90.0, 600.0),
            SectionBox::new(7, 620.0, 900.0),
        ]
    }

    #[test]
    fn section_straddling_offset_wins() {
        let mut spy = ScrollSpy::new(Some(5));
        assert_eq!(spy.update(&layout()), Some(6));
    }

    #[test]
    fn boundary_belongs_to_lower_section() {
        let mut spy = ScrollSpy::new(None);
        let sections = vec![SectionBox::new(1, 0.0, 100.0), SectionBox::new(2, 100.0, 400.0)];
        assert_eq!(spy.update(&sections), Some(2));
    }

    #[test]
    fn gap_keeps_previous_highlight() {
        let mut spy = ScrollSpy::new(Some(5));
        let sections = vec![SectionBox::new(5, -500.0, 50.0), SectionBox::new(6, 150.0, 400.0)];
        assert_eq!(spy.update(&sections), Some(5));
    }

    #[test]
    fn no_sections_keeps_initial() {
        let mut spy = ScrollSpy::new(Some(9));
        assert_eq!(spy.update(&[]), Some(9));
    }
}
