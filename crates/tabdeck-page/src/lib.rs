//! The new tab page: settings, boot, weather panel, and options actions.

pub mod options;
pub mod page;
pub mod search;
pub mod services;
pub mod settings;
pub mod weather_panel;

pub use options::{PositionStatus, SaveForm, SignInError};
pub use page::{Page, PageState};
pub use services::PageServices;
pub use settings::UserSettings;
pub use weather_panel::{WeatherPanel, WeatherReport};
