//! Tool selection.

/// The active editing tool, chosen by the host toolbar.
///
/// The tool decides what a pointer gesture produces. `Select` leaves gesture
/// handling to the host (hit tests and transforms go through explicit editor
/// calls), and `Crop` drives the crop overlay instead of creating an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    Arrow,
    Rect,
    Ellipse,
    Freehand,
    Text,
    Pixelate,
    Crop,
}

impl Tool {
    /// Stable name for logs and host status surfaces.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::Arrow => "arrow",
            Tool::Rect => "rect",
            Tool::Ellipse => "ellipse",
            Tool::Freehand => "freehand",
            Tool::Text => "text",
            Tool::Pixelate => "pixelate",
            Tool::Crop => "crop",
        }
    }

    /// Parses a tool name as produced by [`Tool::name`].
    pub fn from_name(name: &str) -> Option<Tool> {
        match name.to_lowercase().as_str() {
            "select" => Some(Tool::Select),
            "arrow" => Some(Tool::Arrow),
            "rect" => Some(Tool::Rect),
            "ellipse" => Some(Tool::Ellipse),
            "freehand" => Some(Tool::Freehand),
            "text" => Some(Tool::Text),
            "pixelate" => Some(Tool::Pixelate),
            "crop" => Some(Tool::Crop),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        let tools = [
            Tool::Select,
            Tool::Arrow,
            Tool::Rect,
            Tool::Ellipse,
            Tool::Freehand,
            Tool::Text,
            Tool::Pixelate,
            Tool::Crop,
        ];
        for tool in tools {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("lasso"), None);
    }
}
