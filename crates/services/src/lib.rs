pub mod auth;
pub mod bootstrap;
pub mod dao;
pub mod policy;
pub mod report;

pub use auth::AuthService;
pub use dao::*;
pub use report::ReportService;
