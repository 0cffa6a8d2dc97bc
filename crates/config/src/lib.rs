pub mod settings;

pub use settings::{
    AdminSettings, AppSettings, DatabaseSettings, JwtSettings, Settings, UploadSettings,
};
