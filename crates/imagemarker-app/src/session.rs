//! Session files: a page, its marks and a script of host actions.

use imagemarker_core::{
    EditorConfig, EditorError, ImageLoader, ImageMarker, Mark, MarkData, MarkerHost, PointerInput,
    Status,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shell errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid session file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Step {step}: {source}")]
    Step { step: usize, source: EditorError },
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("Usage: {0}")]
    Usage(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// One scripted host action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Step {
    Pointer { input: PointerInput },
    AddMark { mark: MarkData },
    UpdateMark { mark: MarkData },
    RemoveMark { key: String },
    SelectMark { key: Option<String> },
    SetDefaultShape { shape: String },
    SetDefaultColor { color: String },
    SetDefaultSelectedColor { color: String },
    SetZoomLevel { scale: f64 },
    FitToPage,
    DrawMode,
    ScrollMode,
}

/// A recorded editing session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Session {
    pub config: EditorConfig,
    /// Page number prefixed to labels.
    pub page: Option<u32>,
    /// Page image, relative to the session file.
    pub image: String,
    pub marks: Vec<MarkData>,
    pub steps: Vec<Step>,
}

impl Session {
    pub fn from_json(json: &str) -> AppResult<Self> {
        let session: Self = serde_json::from_str(json)?;
        session.config.validate()?;
        Ok(session)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Host that logs every callback and keeps them for the report.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub created: Vec<MarkData>,
    pub selections: Vec<Option<MarkData>>,
}

impl MarkerHost for RecordingHost {
    fn on_creation(&mut self, mark: &Mark) {
        log::info!("Created {} mark {}", mark.shape(), mark.key);
        self.created.push(mark.to_data());
    }

    fn on_selection(&mut self, mark: Option<&Mark>) {
        match mark {
            Some(mark) => log::info!("Selected {}", mark.key),
            None => log::info!("Selection cleared"),
        }
        self.selections.push(mark.map(Mark::to_data));
    }
}

/// What the host observed while replaying a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub created: Vec<MarkData>,
    pub selections: Vec<Option<MarkData>>,
    pub marks: Vec<MarkData>,
    pub status: Status,
    /// Node mutations a renderer would have applied.
    pub mutations: usize,
}

fn apply_step(editor: &mut ImageMarker<RecordingHost>, step: &Step) -> Result<(), EditorError> {
    match step {
        Step::Pointer { input } => editor.handle_pointer(input),
        Step::AddMark { mark } => editor.add_mark(Mark::from_data(mark.clone())?)?,
        Step::UpdateMark { mark } => {
            let changes = editor.update_mark(Mark::from_data(mark.clone())?)?;
            log::debug!("Update changed {} fields", changes.len());
        }
        Step::RemoveMark { key } => {
            editor.remove_mark(key)?;
        }
        Step::SelectMark { key } => editor.select_mark(key.as_deref())?,
        Step::SetDefaultShape { shape } => editor.set_default_shape(shape)?,
        Step::SetDefaultColor { color } => editor.set_default_color(color.as_str()),
        Step::SetDefaultSelectedColor { color } => editor.set_default_selected_color(color.as_str()),
        Step::SetZoomLevel { scale } => editor.set_zoom_level(*scale)?,
        Step::FitToPage => editor.fit_to_page(),
        Step::DrawMode => editor.draw_mode(),
        Step::ScrollMode => editor.scroll_mode(),
    }
    Ok(())
}

/// Show the session's page and run its steps.
///
/// A failing step aborts the replay.
pub async fn replay(session: Session, loader: &dyn ImageLoader) -> AppResult<Report> {
    let mut editor = ImageMarker::new(session.config, RecordingHost::default())?;
    let marks = session
        .marks
        .into_iter()
        .map(Mark::from_data)
        .collect::<Result<Vec<_>, _>>()?;
    editor
        .show_page(loader, session.page, &session.image, marks)
        .await?;
    let mut mutations = editor.take_journal().len();

    for (index, step) in session.steps.iter().enumerate() {
        log::debug!("Step {}: {:?}", index, step);
        apply_step(&mut editor, step).map_err(|source| AppError::Step {
            step: index,
            source,
        })?;
        let drained = editor.take_journal().len();
        log::trace!("Step {} produced {} node mutations", index, drained);
        mutations += drained;
    }

    let marks = editor.marks().map(Mark::to_data).collect();
    let status = editor.status().clone();
    let host = std::mem::take(editor.host_mut());
    Ok(Report {
        created: host.created,
        selections: host.selections,
        marks,
        status,
        mutations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagemarker_core::MemoryImageLoader;
    use kurbo::Size;
    use pollster::block_on;

    const SESSION: &str = r#"{
        "config": {"defaultShape": "rectangle"},
        "image": "page.png",
        "marks": [
            {"key": "a", "shape": "circle", "pos": {"x": 300.0, "y": 300.0}}
        ],
        "steps": [
            {"action": "pointer", "input": {"type": "mouseDown", "position": {"x": 10.0, "y": 10.0}, "button": "left"}},
            {"action": "pointer", "input": {"type": "mouseMove", "position": {"x": 30.0, "y": 40.0}}},
            {"action": "pointer", "input": {"type": "mouseUp", "position": {"x": 30.0, "y": 40.0}, "button": "left"}},
            {"action": "selectMark", "key": "a"}
        ]
    }"#;

    fn loader() -> MemoryImageLoader {
        MemoryImageLoader::new().with_image("page.png", Size::new(1000.0, 800.0))
    }

    #[test]
    fn test_replay_reports_callbacks() {
        let session = Session::from_json(SESSION).unwrap();
        let report = block_on(replay(session, &loader())).unwrap();

        assert_eq!(report.created.len(), 1);
        let created = &report.created[0];
        assert_eq!(created.shape.as_deref(), Some("rectangle"));
        assert_eq!(created.width, Some(20.0));
        assert_eq!(created.height, Some(30.0));

        assert_eq!(report.selections.len(), 2);
        assert_eq!(report.selections[1].as_ref().and_then(|m| m.key.as_deref()), Some("a"));
        assert_eq!(report.marks.len(), 2);
        assert_eq!(report.status, Status::Idle);
        assert!(report.mutations > 0);
    }

    #[test]
    fn test_replay_drains_journal_per_step() {
        let mut session = Session::from_json(SESSION).unwrap();
        session.steps.clear();
        let idle = block_on(replay(session.clone(), &loader())).unwrap();

        session.steps.push(Step::ScrollMode);
        let unchanged = block_on(replay(session, &loader())).unwrap();
        assert_eq!(unchanged.mutations, idle.mutations);
    }

    #[test]
    fn test_page_number_prefixes_labels() {
        let json = r#"{
            "page": 3,
            "image": "page.png",
            "marks": [{"key": "a", "shape": "circle", "label": "A1"}]
        }"#;
        let session = Session::from_json(json).unwrap();
        assert_eq!(session.page, Some(3));
        let report = block_on(replay(session, &loader())).unwrap();
        assert_eq!(report.marks[0].label.as_deref(), Some("A1"));
    }

    #[test]
    fn test_failing_step_names_index() {
        let mut session = Session::from_json(SESSION).unwrap();
        session.steps.push(Step::RemoveMark { key: "ghost".into() });
        let err = block_on(replay(session, &loader())).unwrap_err();
        assert!(matches!(err, AppError::Step { step: 4, .. }));
    }

    #[test]
    fn test_missing_image_fails() {
        let session = Session {
            image: "missing.png".into(),
            ..Session::default()
        };
        let err = block_on(replay(session, &loader())).unwrap_err();
        assert!(matches!(err, AppError::Editor(EditorError::ImageLoad { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Session::from_json(r#"{"config": {"closeRadius": -1}}"#).unwrap_err();
        assert!(matches!(err, AppError::Editor(EditorError::Config(_))));
    }
}
