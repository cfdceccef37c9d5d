/// Everything that can change what the graph view shows. Widgets push these
/// during a frame; the view model drains them once, after all panels ran.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewCommand {
    Search(String),
    ApplyFilters,
    ResetFilters,
    SelectNode(String),
    ClearSelection,
    ResetView,
    ZoomBy(f32),
    Reload,
    DismissError,
}

impl ViewCommand {
    /// Commands the view model cannot serve itself and hands to the app shell.
    pub fn is_app_level(&self) -> bool {
        matches!(self, Self::Reload | Self::DismissError)
    }

    /// Commands that invalidate the current query result and its layout.
    pub fn requeries(&self) -> bool {
        matches!(self, Self::Search(_) | Self::ApplyFilters | Self::ResetFilters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_reload_and_dismiss_escalate() {
        assert!(ViewCommand::Reload.is_app_level());
        assert!(ViewCommand::DismissError.is_app_level());
        assert!(!ViewCommand::Search("acme".to_owned()).is_app_level());
        assert!(!ViewCommand::SelectNode("c1".to_owned()).is_app_level());
    }

    #[test]
    fn selection_and_viewport_do_not_requery() {
        assert!(ViewCommand::ApplyFilters.requeries());
        assert!(ViewCommand::ResetFilters.requeries());
        assert!(!ViewCommand::ClearSelection.requeries());
        assert!(!ViewCommand::ZoomBy(1.2).requeries());
        assert!(!ViewCommand::ResetView.requeries());
    }
}
