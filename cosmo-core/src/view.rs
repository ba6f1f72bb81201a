//! View state: three independent toggles plus the status line.

use crate::record::Category;

pub const LANDING_TITLE: &str = "CosmoSorter — From Fragments to a Whole World";
pub const WORKSPACE_TITLE: &str = "CosmoSorter — Demo Workspace";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopView {
    #[default]
    Landing,
    Workspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Upload,
    Analysis,
}

/// Text of the workspace status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Waiting,
    Analyzing,
    Done,
    Failed,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Waiting => "Waiting for input",
            Status::Analyzing => "Analyzing…",
            Status::Done => "Analysis complete",
            Status::Failed => "Analysis failed",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    top: TopView,
    section: Section,
    tab: Category,
    status: Status,
    loading: bool,
    scroll_offset: u32,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top(&self) -> TopView {
        self.top
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn tab(&self) -> Category {
        self.tab
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether the loading overlay is up.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    pub fn title(&self) -> &'static str {
        match self.top {
            TopView::Landing => LANDING_TITLE,
            TopView::Workspace => WORKSPACE_TITLE,
        }
    }

    pub fn enter_workspace(&mut self) {
        self.top = TopView::Workspace;
        self.scroll_offset = 0;
    }

    pub fn leave_workspace(&mut self) {
        self.top = TopView::Landing;
        self.scroll_offset = 0;
    }

    #[cfg(test)]
    fn scroll_by(&mut self, lines: u32) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn show_upload(&mut self) {
        self.section = Section::Upload;
        self.status = Status::Waiting;
    }

    pub fn show_analysis(&mut self) {
        self.section = Section::Analysis;
        self.status = Status::Done;
    }

    pub fn begin_loading(&mut self) {
        self.loading = true;
        self.status = Status::Analyzing;
    }

    pub fn end_loading(&mut self) {
        self.loading = false;
    }

    pub fn mark_failed(&mut self) {
        self.loading = false;
        self.status = Status::Failed;
    }

    /// Activate a tab. Exactly one tab is active at a time.
    pub fn switch_tab(&mut self, tab: Category) {
        self.tab = tab;
    }

    pub fn is_tab_active(&self, tab: Category) -> bool {
        self.tab == tab
    }
}
