pub mod app_view;
pub mod assignment_list;
pub mod help_bar;
pub mod status_bar;

use assignments_core::EventKind;
use ratatui::{layout::Rect, Frame};

pub use app_view::{AppView, AppViewProps, SPINNERS};
pub use assignment_list::{deadline_text, AssignmentList, AssignmentListProps, RowView};
pub use help_bar::{HelpBar, HelpBarProps};
pub use status_bar::{StatusBar, StatusBarProps};

/// A pure UI element
///
/// Props carry everything needed to render, borrowed from state. Input
/// comes in as an [`EventKind`] and leaves as actions; components never
/// touch state directly.
pub trait Component<A> {
    type Props<'a>;

    /// Default: render-only, no actions.
    #[allow(unused_variables)]
    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = A> {
        None::<A>
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>);
}
