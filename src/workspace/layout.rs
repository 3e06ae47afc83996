//! Workspace layouts and panel visibility.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How panels are arranged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Type picker, editor and queue side by side
    #[default]
    Sidebar,

    /// Editor next to the library
    Split,

    /// One panel at a time, stepping through the authoring flow
    Wizard,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sidebar => "sidebar",
            Self::Split => "split",
            Self::Wizard => "wizard",
        })
    }
}

impl std::str::FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sidebar" => Ok(Self::Sidebar),
            "split" => Ok(Self::Split),
            "wizard" => Ok(Self::Wizard),
            other => Err(format!("Unknown layout: {other}")),
        }
    }
}

/// A workspace panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Panel {
    TypePicker,
    Editor,
    Versions,
    Queue,
    Library,
    Visual,
}

impl Panel {
    pub const ALL: [Self; 6] =
        [Self::TypePicker, Self::Editor, Self::Versions, Self::Queue, Self::Library, Self::Visual];
}

/// Order in which the wizard layout walks through panels.
pub const WIZARD_STEPS: [Panel; 4] =
    [Panel::TypePicker, Panel::Editor, Panel::Versions, Panel::Library];

/// Which panels are showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    layout: Layout,
    visible: BTreeSet<Panel>,
}

impl PanelState {
    /// Initial visibility for a layout.
    pub fn new(layout: Layout) -> Self {
        let visible = match layout {
            Layout::Sidebar => [Panel::TypePicker, Panel::Editor, Panel::Queue].into(),
            Layout::Split => [Panel::Editor, Panel::Library].into(),
            Layout::Wizard => [WIZARD_STEPS[0]].into(),
        };
        Self { layout, visible }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        self.visible.contains(&panel)
    }

    /// Visible panels in display order.
    pub fn visible(&self) -> Vec<Panel> {
        self.visible.iter().copied().collect()
    }

    /// Flip a panel's visibility and return whether it is now visible.
    ///
    /// In the wizard layout this jumps to the panel instead, since exactly
    /// one panel is ever showing.
    pub fn toggle(&mut self, panel: Panel) -> bool {
        if self.layout == Layout::Wizard {
            self.show_only(panel);
            return true;
        }

        if !self.visible.remove(&panel) {
            self.visible.insert(panel);
        }
        self.is_visible(panel)
    }

    /// Bring a panel forward after the flow reaches it.
    ///
    /// Only the wizard reacts; the other layouts leave visibility to the user.
    pub fn focus(&mut self, panel: Panel) {
        if self.layout == Layout::Wizard {
            self.show_only(panel);
        }
    }

    /// Current wizard step, if the layout is the wizard.
    pub fn wizard_step(&self) -> Option<Panel> {
        match self.layout {
            Layout::Wizard => self.visible.iter().next().copied(),
            _ => None,
        }
    }

    /// Move the wizard forward one step. Stays put on the last step.
    pub fn next_step(&mut self) -> Option<Panel> {
        let current = self.wizard_step()?;
        let next = match WIZARD_STEPS.iter().position(|p| *p == current) {
            Some(i) => WIZARD_STEPS[(i + 1).min(WIZARD_STEPS.len() - 1)],
            None => WIZARD_STEPS[0],
        };
        self.show_only(next);
        Some(next)
    }

    /// Move the wizard back one step. Stays put on the first step.
    pub fn previous_step(&mut self) -> Option<Panel> {
        let current = self.wizard_step()?;
        let previous = match WIZARD_STEPS.iter().position(|p| *p == current) {
            Some(i) => WIZARD_STEPS[i.saturating_sub(1)],
            None => WIZARD_STEPS[0],
        };
        self.show_only(previous);
        Some(previous)
    }

    fn show_only(&mut self, panel: Panel) {
        self.visible.clear();
        self.visible.insert(panel);
    }
}

impl Default for PanelState {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_visibility() {
        let sidebar = PanelState::new(Layout::Sidebar);
        assert_eq!(sidebar.visible(), vec![Panel::TypePicker, Panel::Editor, Panel::Queue]);

        let split = PanelState::new(Layout::Split);
        assert_eq!(split.visible(), vec![Panel::Editor, Panel::Library]);

        let wizard = PanelState::new(Layout::Wizard);
        assert_eq!(wizard.visible(), vec![Panel::TypePicker]);
    }

    #[test]
    fn test_toggle() {
        let mut panels = PanelState::new(Layout::Sidebar);
        assert!(panels.toggle(Panel::Library));
        assert!(panels.is_visible(Panel::Library));
        assert!(!panels.toggle(Panel::Queue));
        assert!(!panels.is_visible(Panel::Queue));
    }

    #[test]
    fn test_wizard_shows_one_panel() {
        let mut panels = PanelState::new(Layout::Wizard);
        assert_eq!(panels.next_step(), Some(Panel::Editor));
        assert_eq!(panels.next_step(), Some(Panel::Versions));
        assert_eq!(panels.next_step(), Some(Panel::Library));
        assert_eq!(panels.next_step(), Some(Panel::Library));
        assert_eq!(panels.visible().len(), 1);

        panels.toggle(Panel::Visual);
        assert_eq!(panels.visible(), vec![Panel::Visual]);
        assert_eq!(panels.previous_step(), Some(Panel::TypePicker));
    }

    #[test]
    fn test_focus_only_moves_wizard() {
        let mut sidebar = PanelState::new(Layout::Sidebar);
        sidebar.focus(Panel::Versions);
        assert!(!sidebar.is_visible(Panel::Versions));
        assert_eq!(sidebar.next_step(), None);

        let mut wizard = PanelState::new(Layout::Wizard);
        wizard.focus(Panel::Versions);
        assert_eq!(wizard.wizard_step(), Some(Panel::Versions));
    }

    #[test]
    fn test_layout_parse() {
        assert_eq!("Wizard".parse::<Layout>().unwrap(), Layout::Wizard);
        assert!("grid".parse::<Layout>().is_err());
        assert_eq!(Layout::Split.to_string(), "split");
    }
}
