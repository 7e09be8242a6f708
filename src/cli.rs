//! Command-line interface
//!
//! Usage:
//!   shotframe render <INPUT>    Frame an image file (or `-` for stdin) and export it
//!   shotframe paste             Frame the image on the clipboard
//!   shotframe capture           Take an interactive screenshot and frame it
//!   shotframe style             Print the computed layer styles
//!   shotframe gradients         List the gradient presets
//!   shotframe config            Show or initialize the configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{BackgroundType, EditorState, gradient};
use crate::session::messages::EditMsg;

#[derive(Parser)]
#[command(
    name = "shotframe",
    about = "Put screenshots on a padded, rounded, shadowed background",
    version
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Frame an image file
    Render {
        /// Image to frame (png, jpg, webp, ...); `-` reads it from stdin
        input: PathBuf,

        #[command(flatten)]
        editor: EditorArgs,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Frame the image currently on the clipboard
    Paste {
        #[command(flatten)]
        editor: EditorArgs,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Take an interactive screenshot through the desktop portal
    Capture {
        #[command(flatten)]
        editor: EditorArgs,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Print the background and shadow styles as JSON
    Style {
        #[command(flatten)]
        editor: EditorArgs,
    },

    /// List the gradient presets
    Gradients,

    /// Print the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

/// Overrides on top of the configured editor settings
#[derive(Args, Debug, Default, Clone)]
pub struct EditorArgs {
    /// Padding around the screenshot (0-128 px)
    #[arg(long)]
    pub padding: Option<f32>,

    /// Screenshot corner radius (0-64 px)
    #[arg(long)]
    pub corner_radius: Option<f32>,

    /// Shadow intensity (0-40, 0 disables)
    #[arg(long)]
    pub shadow: Option<f32>,

    /// Background type: color|gradient|image
    #[arg(long)]
    pub background: Option<BackgroundType>,

    /// Background color (any CSS color)
    #[arg(long)]
    pub color: Option<String>,

    /// Gradient preset name or a CSS linear-gradient
    #[arg(long)]
    pub gradient: Option<String>,

    /// Background image URL or path
    #[arg(long)]
    pub image_url: Option<String>,

    /// Background blur (0-20 px)
    #[arg(long)]
    pub blur: Option<f32>,
}

impl EditorArgs {
    /// The overrides as editor messages, in control order
    pub fn edits(&self) -> Vec<EditMsg> {
        let gradient = self.gradient.as_ref().map(|v| match gradient::preset(v) {
            Some(preset) => preset.value.to_string(),
            None => v.clone(),
        });
        [
            self.padding.map(EditMsg::Padding),
            self.corner_radius.map(EditMsg::CornerRadius),
            self.shadow.map(EditMsg::Shadow),
            self.background.map(EditMsg::BackgroundType),
            self.color.clone().map(EditMsg::BackgroundColor),
            gradient.map(EditMsg::BackgroundGradient),
            self.image_url.clone().map(EditMsg::BackgroundImageUrl),
            self.blur.map(EditMsg::BackgroundBlur),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Apply the overrides; the result is clamped to the control ranges
    pub fn apply(&self, base: EditorState) -> EditorState {
        self.edits()
            .into_iter()
            .fold(base, |state, edit| edit.apply(&state))
            .sanitized()
    }
}

#[derive(Args, Debug, Default, Clone)]
pub struct ExportArgs {
    /// Directory to write screenshot.png into
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Copy the framed image to the clipboard
    #[arg(long)]
    pub copy: bool,

    /// Skip writing screenshot.png
    #[arg(long)]
    pub no_save: bool,

    /// Pick the destination with a save dialog
    #[arg(long)]
    pub choose_destination: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_flags() {
        let cli = Cli::try_parse_from([
            "shotframe",
            "render",
            "shot.png",
            "--padding",
            "32",
            "--background",
            "gradient",
            "--gradient",
            "ocean",
            "--copy",
            "--no-save",
        ])
        .unwrap();
        let Commands::Render {
            input,
            editor,
            export,
        } = cli.command
        else {
            panic!("expected render");
        };
        assert_eq!(input, PathBuf::from("shot.png"));
        assert!(export.copy && export.no_save);

        let state = editor.apply(EditorState::default());
        assert_eq!(state.padding, 32.0);
        assert_eq!(state.background_type, BackgroundType::Gradient);
        assert_eq!(
            state.background_gradient,
            "linear-gradient(135deg, #74b9ff 0%, #0984e3 100%)"
        );
    }

    #[test]
    fn test_apply_keeps_unset_fields_and_clamps() {
        let args = EditorArgs {
            shadow: Some(90.0),
            gradient: Some("linear-gradient(red, blue)".to_string()),
            ..Default::default()
        };
        let state = args.apply(EditorState::default());
        assert_eq!(state.shadow, 40.0);
        assert_eq!(state.background_gradient, "linear-gradient(red, blue)");
        assert_eq!(state.background_color, "#3b82f6");
    }

    #[test]
    fn test_rejects_unknown_background() {
        assert!(Cli::try_parse_from(["shotframe", "style", "--background", "video"]).is_err());
    }
}
