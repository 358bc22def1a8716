//! Whiteboard canvas model.
//!
//! Keeps the rendered segments in drawing order. Erasing strokes are kept as
//! segments too and composited with `destination-out`, as a 2D canvas would.

use quizroom_server::infrastructure::dto::websocket::{ServerEvent, StrokeDto};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    SourceOver,
    DestinationOut,
}

impl Composite {
    pub fn for_stroke(is_erasing: bool) -> Self {
        if is_erasing {
            Composite::DestinationOut
        } else {
            Composite::SourceOver
        }
    }

    /// Canvas `globalCompositeOperation` name
    pub fn as_str(&self) -> &'static str {
        match self {
            Composite::SourceOver => "source-over",
            Composite::DestinationOut => "destination-out",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub color: String,
    pub width: f64,
    pub composite: Composite,
}

impl From<&StrokeDto> for Segment {
    fn from(stroke: &StrokeDto) -> Self {
        Self {
            from: (stroke.x0, stroke.y0),
            to: (stroke.x1, stroke.y1),
            color: stroke.color.clone(),
            width: stroke.brush_size,
            composite: Composite::for_stroke(stroke.is_erasing),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Canvas {
    segments: Vec<Segment>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, stroke: &StrokeDto) {
        self.segments.push(stroke.into());
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Apply a whiteboard event; returns whether the canvas changed.
    pub fn apply(&mut self, event: &ServerEvent) -> bool {
        match event {
            ServerEvent::WhiteboardDraw(stroke) => {
                self.draw(stroke);
                true
            }
            ServerEvent::WhiteboardClear {} => {
                self.clear();
                true
            }
            _ => false,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_blank(&self) -> bool {
        self.segments.is_empty()
    }
}
