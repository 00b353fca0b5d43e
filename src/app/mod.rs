// Application layer - Use case interactors

pub mod container;
pub mod crop_interactor;
pub mod session;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use crop_interactor::{CropInteractor, CropOutput, CropRequest};
pub use session::{CancelHandle, CropSession, ErrorBanner, SessionSettings};
