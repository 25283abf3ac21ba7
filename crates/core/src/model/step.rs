use std::collections::BTreeSet;

use crate::model::Control;

/// One page of the form.
///
/// `is_loading` and `is_auto_advance` are derived once at construction and never
/// recomputed, even if markers change on the rendered step later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    index: usize,
    heading: Option<String>,
    markers: BTreeSet<String>,
    controls: Vec<Control>,
    is_loading: bool,
    is_auto_advance: bool,
}

impl Step {
    #[must_use]
    pub fn new(
        index: usize,
        heading: Option<String>,
        markers: BTreeSet<String>,
        controls: Vec<Control>,
        loading_marker: &str,
    ) -> Self {
        let is_loading = markers.contains(loading_marker);
        let is_auto_advance = radio_only(&controls);
        Self {
            index,
            heading,
            markers,
            controls,
            is_loading,
            is_auto_advance,
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn heading(&self) -> Option<&str> {
        self.heading.as_deref()
    }

    /// Heading used for announcements; falls back to the one-based step number.
    #[must_use]
    pub fn display_heading(&self) -> String {
        match self.heading.as_deref().map(str::trim) {
            Some(heading) if !heading.is_empty() => heading.to_owned(),
            _ => format!("Step {}", self.index + 1),
        }
    }

    #[must_use]
    pub fn markers(&self) -> &BTreeSet<String> {
        &self.markers
    }

    #[must_use]
    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub(crate) fn controls_mut(&mut self) -> &mut [Control] {
        &mut self.controls
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn is_auto_advance(&self) -> bool {
        self.is_auto_advance
    }

    /// First control that can take focus, if any.
    #[must_use]
    pub fn first_focusable(&self) -> Option<&Control> {
        self.controls.iter().find(|c| !c.kind().is_hidden())
    }
}

fn radio_only(controls: &[Control]) -> bool {
    let mut visible = controls.iter().filter(|c| !c.kind().is_hidden()).peekable();
    visible.peek().is_some() && visible.all(|c| c.kind().is_radio())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ControlId, ControlKind, FieldName};

    fn control(slot: usize, kind: ControlKind) -> Control {
        Control::new(
            ControlId::new(0, slot),
            FieldName::new(format!("f{slot}")).unwrap(),
            kind,
        )
    }

    fn radio(slot: usize) -> Control {
        control(
            slot,
            ControlKind::Radio {
                value: format!("v{slot}"),
            },
        )
    }

    #[test]
    fn radio_only_step_is_auto_advance() {
        let step = Step::new(0, None, BTreeSet::new(), vec![radio(0), radio(1)], "loading-step");
        assert!(step.is_auto_advance());
    }

    #[test]
    fn hidden_controls_do_not_block_auto_advance() {
        let step = Step::new(
            0,
            None,
            BTreeSet::new(),
            vec![radio(0), control(1, ControlKind::Hidden)],
            "loading-step",
        );
        assert!(step.is_auto_advance());
    }

    #[test]
    fn mixed_or_empty_steps_are_not_auto_advance() {
        let mixed = Step::new(
            0,
            None,
            BTreeSet::new(),
            vec![radio(0), control(1, ControlKind::Text)],
            "loading-step",
        );
        assert!(!mixed.is_auto_advance());

        let hidden_only = Step::new(
            0,
            None,
            BTreeSet::new(),
            vec![control(0, ControlKind::Hidden)],
            "loading-step",
        );
        assert!(!hidden_only.is_auto_advance());
    }

    #[test]
    fn loading_flag_follows_configured_marker() {
        let markers = BTreeSet::from(["spinner".to_owned()]);
        let step = Step::new(1, None, markers.clone(), Vec::new(), "spinner");
        assert!(step.is_loading());
        let step = Step::new(1, None, markers, Vec::new(), "loading-step");
        assert!(!step.is_loading());
    }

    #[test]
    fn display_heading_falls_back_to_step_number() {
        let step = Step::new(2, Some("  ".to_owned()), BTreeSet::new(), Vec::new(), "x");
        assert_eq!(step.display_heading(), "Step 3");
        let step = Step::new(2, Some("About you".to_owned()), BTreeSet::new(), Vec::new(), "x");
        assert_eq!(step.display_heading(), "About you");
    }
}
