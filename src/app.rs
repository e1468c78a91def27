use std::path::PathBuf;

use ratatui::text::Line;
use tracing::{info, warn};

use crate::config::expand_pr_template;
use crate::diff::combine_file_diffs;
use crate::error::{GitguyError, Result};
use crate::generate::{CommitGenerator, LlModel, LlmResult, OpenRouterClient};
use crate::git::{DiffSelection, RefEntry, selection_between};
use crate::input::Action;
use crate::logging::LogHandle;
use crate::model::FileDiff;
use crate::output;
use crate::viewer::{Viewer, ViewerEvent, ViewerKey, ViewerOptions, ViewerOutcome, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    RefSelect,
    Diff,
    Result,
}

/// Which of the two refs a pick sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefSide {
    Current,
    Incoming,
}

impl RefSide {
    pub fn title(self) -> &'static str {
        match self {
            RefSide::Current => "Current Ref",
            RefSide::Incoming => "Incoming Ref",
        }
    }

    fn other(self) -> Self {
        match self {
            RefSide::Current => RefSide::Incoming,
            RefSide::Incoming => RefSide::Current,
        }
    }
}

/// Keys of the ref selection screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKey {
    Up,
    Down,
    Top,
    Bottom,
    SwitchSide,
    Select,
    Reset,
    ResetAll,
}

/// Two cursors over the same ref list, one per side, and what each side has
/// picked.
#[derive(Debug, Clone)]
pub struct RefPicker {
    pub entries: Vec<RefEntry>,
    pub side: RefSide,
    current_cursor: usize,
    incoming_cursor: usize,
    current: Option<usize>,
    incoming: Option<usize>,
}

impl RefPicker {
    pub fn new(entries: Vec<RefEntry>) -> Self {
        Self {
            entries,
            side: RefSide::Current,
            current_cursor: 0,
            incoming_cursor: 0,
            current: None,
            incoming: None,
        }
    }

    pub fn cursor(&self, side: RefSide) -> usize {
        match side {
            RefSide::Current => self.current_cursor,
            RefSide::Incoming => self.incoming_cursor,
        }
    }

    pub fn picked(&self, side: RefSide) -> Option<&RefEntry> {
        let idx = match side {
            RefSide::Current => self.current,
            RefSide::Incoming => self.incoming,
        };
        idx.and_then(|i| self.entries.get(i))
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match self.side {
            RefSide::Current => &mut self.current_cursor,
            RefSide::Incoming => &mut self.incoming_cursor,
        }
    }

    fn pick_mut(&mut self) -> &mut Option<usize> {
        match self.side {
            RefSide::Current => &mut self.current,
            RefSide::Incoming => &mut self.incoming,
        }
    }

    /// Apply `key`. Returns the current and incoming refs once a pick
    /// completes the pair.
    pub fn handle(&mut self, key: RefKey) -> Option<(RefEntry, RefEntry)> {
        let last = self.entries.len().saturating_sub(1);
        match key {
            RefKey::Up => {
                let cursor = self.cursor_mut();
                *cursor = cursor.saturating_sub(1);
            }
            RefKey::Down => {
                let cursor = self.cursor_mut();
                *cursor = (*cursor + 1).min(last);
            }
            RefKey::Top => *self.cursor_mut() = 0,
            RefKey::Bottom => *self.cursor_mut() = last,
            RefKey::SwitchSide => self.side = self.side.other(),
            RefKey::Select => {
                if self.entries.is_empty() {
                    return None;
                }
                let cursor = self.cursor(self.side);
                *self.pick_mut() = Some(cursor);
                return self.pair();
            }
            RefKey::Reset => *self.pick_mut() = None,
            RefKey::ResetAll => {
                self.current = None;
                self.incoming = None;
            }
        }
        None
    }

    fn pair(&self) -> Option<(RefEntry, RefEntry)> {
        let current = self.picked(RefSide::Current)?.clone();
        let incoming = self.picked(RefSide::Incoming)?.clone();
        Some((current, incoming))
    }

    /// What is still missing before the diff can load.
    pub fn status(&self) -> String {
        let missing: Vec<&str> = [
            (RefSide::Current, "current ref"),
            (RefSide::Incoming, "incoming ref"),
        ]
        .into_iter()
        .filter(|(side, _)| self.picked(*side).is_none())
        .map(|(_, name)| name)
        .collect();

        if missing.is_empty() {
            "Press Enter to load the diff".to_string()
        } else {
            format!("Select {} to continue", missing.join(" and "))
        }
    }
}

/// Loads the file diffs for a picked pair of refs.
pub type DiffLoader = Box<dyn Fn(&DiffSelection) -> Result<Vec<FileDiff>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
}

/// How to build the generator on first use.
#[derive(Debug, Clone, Default)]
pub struct GenerateSettings {
    pub api_key: Option<String>,
    pub model: LlModel,
    pub pr_template: Option<PathBuf>,
}

pub struct App {
    pub files: Vec<FileDiff>,
    /// Unified diff text the viewer was opened on, if not built from files.
    patch: Option<String>,
    pub viewer: Viewer,
    pub screen: Screen,

    pub base_label: String,
    pub head_label: String,
    pub out_pr: String,

    pub result: Option<LlmResult>,
    pub result_view: Viewport,

    settings: GenerateSettings,
    generator: Option<Box<dyn CommitGenerator>>,

    /// Present when the session started on the ref selection screen.
    pub refs: Option<RefPicker>,
    loader: Option<DiffLoader>,

    pub message: Option<StatusMessage>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        files: Vec<FileDiff>,
        (base_label, head_label): (String, String),
        options: ViewerOptions,
        log: LogHandle,
        settings: GenerateSettings,
        out_pr: String,
    ) -> Self {
        let viewer = Viewer::from_file_diffs(&files, options, log);
        Self::with_viewer(viewer, files, None, (base_label, head_label), settings, out_pr)
    }

    /// An app over unified diff text.
    pub fn from_patch(
        patch: String,
        labels: (String, String),
        options: ViewerOptions,
        log: LogHandle,
        settings: GenerateSettings,
        out_pr: String,
    ) -> Self {
        let viewer = Viewer::from_unified(&patch, options, log);
        Self::with_viewer(viewer, Vec::new(), Some(patch), labels, settings, out_pr)
    }

    /// An app that opens on the ref selection screen and loads the diff for
    /// the picked refs through `loader`.
    pub fn with_ref_picker(
        entries: Vec<RefEntry>,
        loader: DiffLoader,
        options: ViewerOptions,
        log: LogHandle,
        settings: GenerateSettings,
        out_pr: String,
    ) -> Self {
        let viewer = Viewer::from_file_diffs(&[], options, log);
        let mut app = Self::with_viewer(
            viewer,
            Vec::new(),
            None,
            (String::new(), String::new()),
            settings,
            out_pr,
        );
        app.screen = Screen::RefSelect;
        app.refs = Some(RefPicker::new(entries));
        app.loader = Some(loader);
        app
    }

    fn with_viewer(
        viewer: Viewer,
        files: Vec<FileDiff>,
        patch: Option<String>,
        (base_label, head_label): (String, String),
        settings: GenerateSettings,
        out_pr: String,
    ) -> Self {
        Self {
            files,
            patch,
            viewer,
            screen: Screen::Diff,
            base_label,
            head_label,
            out_pr,
            result: None,
            result_view: Viewport::default(),
            settings,
            generator: None,
            refs: None,
            loader: None,
            message: None,
            should_quit: false,
        }
    }

    /// Use `generator` instead of building an OpenRouter client.
    #[cfg(test)]
    pub fn with_generator(mut self, generator: Box<dyn CommitGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn model(&self) -> LlModel {
        self.settings.model
    }

    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            kind: MessageKind::Info,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: text.into(),
            kind: MessageKind::Error,
        });
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Terminal size, including the status bar row.
    pub fn resize(&mut self, width: u16, height: u16) {
        let content_height = height.saturating_sub(1);
        self.viewer.handle(ViewerEvent::Resize {
            width,
            height: content_height,
        });
        let len = self.result_lines().len();
        // Borders take two rows.
        self.result_view
            .resize(usize::from(content_height.saturating_sub(2)), len);
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Quit => self.should_quit = true,
            Action::Viewer(key) => {
                if key != ViewerKey::Quit {
                    self.clear_message();
                }
                if self.viewer.handle(ViewerEvent::Key(key)) == ViewerOutcome::Quit {
                    self.should_quit = true;
                }
            }
            Action::Generate => self.generate(),
            Action::CopyCommit => self.copy_commit(),
            Action::SavePr => self.save_pr(),
            Action::BackToDiff => {
                self.screen = Screen::Diff;
                self.clear_message();
            }
            Action::ScrollResult(motion) => self.result_view.apply(motion),
            Action::Refs(key) => self.handle_ref_key(key),
            Action::BackToRefs => {
                if self.refs.is_some() {
                    self.screen = Screen::RefSelect;
                    self.clear_message();
                }
            }
        }
    }

    fn handle_ref_key(&mut self, key: RefKey) {
        let Some(picker) = self.refs.as_mut() else {
            return;
        };
        if let Some((current, incoming)) = picker.handle(key) {
            self.open_refs(&current, &incoming);
        }
    }

    /// Load the diff between two picked refs and show it.
    fn open_refs(&mut self, current: &RefEntry, incoming: &RefEntry) {
        let Some(loader) = &self.loader else {
            return;
        };
        let selection = selection_between(current, incoming);
        info!(
            current = current.label(),
            incoming = incoming.label(),
            ?selection,
            "loading picked refs"
        );

        let loaded = loader(&selection);

        match loaded {
            Ok(files) if !files.is_empty() => {
                self.viewer.reload(&files);
                self.files = files;
                self.base_label = current.label().to_string();
                self.head_label = incoming.label().to_string();
                self.result = None;
                self.screen = Screen::Diff;
                self.set_message(format!(
                    "Comparing {} with {} | b: back to refs",
                    current.name, incoming.name
                ));
            }
            Ok(_) | Err(GitguyError::NoChanges) => self.set_error(format!(
                "No changes between {} and {}",
                current.name, incoming.name
            )),
            Err(e) => {
                warn!(error = %e, "failed to load picked refs");
                self.set_error(format!("Failed to load diff: {}", e));
            }
        }
    }

    /// Status shown while the blocking generation call runs.
    pub fn begin_generate(&mut self) {
        self.set_message(format!("Generating with {}...", self.settings.model.short_name()));
    }

    fn generator(&mut self) -> Result<&dyn CommitGenerator> {
        if self.generator.is_none() {
            let api_key = self
                .settings
                .api_key
                .clone()
                .ok_or(GitguyError::MissingApiKey)?;
            let mut client = OpenRouterClient::new(api_key, self.settings.model);
            if let Some(path) = &self.settings.pr_template {
                client = client.with_pr_template(path)?;
            }
            self.generator = Some(Box::new(client));
        }
        self.generator
            .as_deref()
            .ok_or(GitguyError::MissingApiKey)
    }

    fn diff_text(&self) -> Result<String> {
        match &self.patch {
            Some(patch) => Ok(patch.clone()),
            None => combine_file_diffs(&self.files),
        }
    }

    pub fn generate(&mut self) {
        let diff = match self.diff_text() {
            Ok(diff) if diff.trim().is_empty() => {
                self.set_error("No changes to describe");
                return;
            }
            Ok(diff) => diff,
            Err(e) => {
                self.set_error(format!("Failed to build diff: {}", e));
                return;
            }
        };

        let outcome = self.generator().and_then(|g| g.generate(&diff));
        match outcome {
            Ok(result) => {
                info!(
                    commit = %result.commit_message,
                    pr_bytes = result.pr_description.len(),
                    "generated description"
                );
                self.result = Some(result);
                self.screen = Screen::Result;
                self.result_view.set_offset(0);
                let len = self.result_lines().len();
                self.result_view.resize(self.result_view.height(), len);
                self.set_message("Generated. c: copy commit | p: save PR | d: back to diff | q: quit");
            }
            Err(e) => {
                warn!(error = %e, "generation failed");
                self.set_error(format!("Generation failed: {}", e));
            }
        }
    }

    fn copy_commit(&mut self) {
        let Some(result) = &self.result else {
            return;
        };
        let text = result.commit_message.clone();
        let copied = arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text));
        match copied {
            Ok(()) => self.set_message("Commit message copied to clipboard"),
            Err(e) => self.set_error(format!("Failed to copy to clipboard: {}", e)),
        }
    }

    fn save_pr(&mut self) {
        match self.write_pr_file() {
            Ok(Some(path)) => self.set_message(format!("PR description saved to {}", path.display())),
            Ok(None) => {}
            Err(e) => self.set_error(format!("Failed to save PR description: {}", e)),
        }
    }

    /// Write the PR file to `out_pr`, resolving `{{ID}}`.
    pub fn write_pr_file(&self) -> Result<Option<PathBuf>> {
        let Some(result) = &self.result else {
            return Ok(None);
        };
        let path = PathBuf::from(expand_pr_template(&self.out_pr));
        output::save_pr_file(
            &path,
            &result.commit_message,
            &self.base_label,
            &self.head_label,
            &result.pr_description,
        )?;
        Ok(Some(path))
    }

    pub fn result_lines(&self) -> Vec<Line<'static>> {
        let Some(result) = &self.result else {
            return Vec::new();
        };
        let mut lines = vec![
            Line::from("COMMIT MESSAGE:"),
            Line::from(result.commit_message.clone()),
            Line::from(""),
            Line::from("PR DESCRIPTION:"),
        ];
        lines.extend(
            result
                .pr_description
                .lines()
                .map(|l| Line::from(l.to_string())),
        );
        lines
    }
}
