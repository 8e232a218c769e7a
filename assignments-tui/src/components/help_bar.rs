use assignments_core::{format_key_for_display, Action, Binding, Keybindings};
use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::Component;

pub struct HelpBarProps<'a> {
    pub keybindings: &'a Keybindings,
}

/// One line of bound keys, first key per binding
pub struct HelpBar;

impl HelpBar {
    pub fn entries(keybindings: &Keybindings) -> Vec<(String, &'static str)> {
        Binding::ALL
            .into_iter()
            .filter_map(|binding| {
                let key = keybindings.first_key(binding)?;
                Some((format_key_for_display(key), binding.description()))
            })
            .collect()
    }
}

impl Component<Action> for HelpBar {
    type Props<'a> = HelpBarProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let spans: Vec<Span> = Self::entries(props.keybindings)
            .into_iter()
            .flat_map(|(key, description)| {
                [
                    Span::styled(format!(" {key}"), Style::default().fg(Color::Cyan).bold()),
                    Span::styled(format!(" {description} "), Style::default().fg(Color::DarkGray)),
                ]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(spans).centered()), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RenderHarness;

    #[test]
    fn test_entries_follow_bindings() {
        let entries = HelpBar::entries(&Keybindings::defaults());

        assert_eq!(entries.len(), Binding::ALL.len());
        assert_eq!(entries[0], ("c".to_string(), Binding::ExcludeAssignment.description()));
        assert!(entries.iter().any(|(key, _)| key == "Space"));
    }

    #[test]
    fn test_entries_skip_unbound() {
        let mut keybindings = Keybindings::new();
        keybindings.add(Binding::Quit, vec!["esc".into()]);

        let entries = HelpBar::entries(&keybindings);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, Binding::Quit.description());
    }

    #[test]
    fn test_render_keys() {
        let mut render = RenderHarness::new(100, 1);
        let keybindings = Keybindings::defaults();

        let output = render.render_to_string_plain(|frame| {
            HelpBar.render(frame, frame.area(), HelpBarProps { keybindings: &keybindings });
        });

        assert!(output.contains("q quit"));
        assert!(output.contains("Space"));
    }
}
