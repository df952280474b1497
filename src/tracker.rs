mod gate;
mod history;
mod interpolator;
mod record;
mod rect;
mod selection;
mod track_session;
mod track_state;

pub use gate::{DetectionGate, GateDecision};
pub use history::{History, TrackPoint};
pub use interpolator::GapInterpolator;
pub use record::{FrameRecord, UNKNOWN_COORDINATE};
pub use rect::Rect;
pub use selection::{Detection, SelectionPolicy};
pub use track_session::{SessionSummary, TrackSession, TrackerConfig};
pub use track_state::{FrameStatus, TrackState};
