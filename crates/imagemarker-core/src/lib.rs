//! ImageMarker Core Library
//!
//! Interactive annotation of page images: marks, their retained node tree,
//! and the gesture layer that draws, moves and selects them.

pub mod camera;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod marks;
pub mod page;
pub mod scene;
pub mod shapes;
pub mod status;
pub mod tools;

pub use camera::Camera;
pub use config::EditorConfig;
pub use editor::{Defaults, ImageMarker, MarkerCore, MarkerHost, NoopHost};
pub use error::{EditorError, EditorResult};
pub use gesture::{PointerSurface, Procedure};
pub use input::{ButtonClass, MouseButton, PointerEvent, PointerInput, TouchPhase};
pub use marks::{Geometry, Mark, MarkData, MarkKey, ShapeKind};
pub use page::{BackgroundImage, FileImageLoader, ImageLoader, MemoryImageLoader};
pub use scene::{NodeId, NodeTree, Scene};
pub use status::{Status, StatusLock};
pub use tools::Mode;
