//! Media engine module
//!
//! Defines the MediaEngine trait and the yt-dlp backed implementation.

mod traits;

pub mod ytdlp;

pub use traits::*;
pub use ytdlp::YtDlp;
