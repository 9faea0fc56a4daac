//! Camera model for the viewer: free-flying orientation, mouse look,
//! perspective projection and the scripted presentation flight.

pub mod look;
pub mod orientation;
pub mod presentation;
pub mod projection;

pub use look::MouseLook;
pub use orientation::{MoveDirection, OrientationModel, WORLD_UP};
pub use presentation::{Presentation, PresentationPhase};
pub use projection::PerspectiveProjection;
