pub mod credentials;
pub mod history;
pub mod provider;
pub mod translate;
