pub mod api_credential;
pub mod settings;
pub mod trade;

pub use api_credential::*;
pub use settings::*;
pub use trade::*;
