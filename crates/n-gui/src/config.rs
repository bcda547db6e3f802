//! Engine-wide settings.

use crate::attribute::{Attribute, OutputMode};

/// Settings for a [`Gui`](crate::Gui). New views copy the color fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuiConfig {
    /// Colors are reduced to this mode when drawn.
    pub output_mode: OutputMode,
    /// Ask the terminal for mouse reports.
    pub mouse: bool,
    /// Skip drawing frame edges a view marks as shared.
    pub support_overlaps: bool,
    /// Draw frames with `+ - |` and skip junction resolution.
    pub ascii: bool,
    /// Show the hardware cursor in the focused editable view.
    pub cursor: bool,
    /// Draw the focused view's frame with `sel_frame_color`.
    pub highlight: bool,
    pub fg_color: Attribute,
    pub bg_color: Attribute,
    pub sel_fg_color: Attribute,
    pub sel_bg_color: Attribute,
    pub frame_color: Attribute,
    pub sel_frame_color: Attribute,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            output_mode: OutputMode::Normal,
            mouse: false,
            support_overlaps: false,
            ascii: false,
            cursor: false,
            highlight: false,
            fg_color: Attribute::DEFAULT,
            bg_color: Attribute::DEFAULT,
            sel_fg_color: Attribute::DEFAULT,
            sel_bg_color: Attribute::DEFAULT,
            frame_color: Attribute::DEFAULT,
            sel_frame_color: Attribute::DEFAULT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_plain() {
        let cfg = GuiConfig::default();
        assert_eq!(cfg.output_mode, OutputMode::Normal);
        assert!(!cfg.mouse && !cfg.ascii && !cfg.cursor && !cfg.highlight);
        assert!(cfg.bg_color.is_default());
    }
}
