use clap::Args;

pub const DEFAULT_DPI: f32 = 200.0;
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 200;

/// Rasterization settings shared by the CLI and the MCP server
#[derive(Args, Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Resolution used when converting pages to PNG
    #[arg(long, global = true, env = "PDFDESK_DPI", default_value_t = DEFAULT_DPI)]
    pub dpi: f32,

    /// Longest edge of generated thumbnails, in pixels
    #[arg(
        long = "thumbnail-size",
        global = true,
        env = "PDFDESK_THUMBNAIL_SIZE",
        default_value_t = DEFAULT_THUMBNAIL_SIZE
    )]
    pub thumbnail_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            dpi: DEFAULT_DPI,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
        }
    }
}

impl RenderOptions {
    /// Override the DPI for a single request, keeping it in a range the rasterizer handles
    pub fn with_dpi(self, dpi: Option<f32>) -> Self {
        RenderOptions {
            dpi: dpi.unwrap_or(self.dpi).clamp(18.0, 1200.0),
            ..self
        }
    }

    pub fn with_thumbnail_size(self, size: Option<u32>) -> Self {
        RenderOptions {
            thumbnail_size: size.unwrap_or(self.thumbnail_size).clamp(16, 2048),
            ..self
        }
    }
}
