/*!
    Shared vocabulary for the vidconvert workspace.

    Everything a conversion job needs to describe itself lives here: the
    [EncodeParameter] bundle of target settings, the [ProcessParameter]
    progress hub with its [ProgressObserver] fan-out, the [MediaSummary]
    probe result, and the workspace [Error] type. The crate deliberately
    carries no FFmpeg dependency so frontends can depend on it without
    linking the libraries.
*/

mod encode;
mod error;
mod info;
mod progress;

pub use encode::EncodeParameter;
pub use error::{Error, Result};
pub use info::MediaSummary;
pub use progress::{ProcessParameter, ProgressObserver};
