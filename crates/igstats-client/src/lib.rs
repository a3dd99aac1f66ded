pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod record;
pub(crate) mod retry;
pub mod scrape;
pub mod session;
pub mod shortcode;

pub use api::InstagramApi;
pub use auth::{AuthError, LoginPolicy, SessionManager};
pub use client::InstagramClient;
pub use error::ApiError;
pub use record::{AccountInfo, FieldError, RawMediaRecord, RecordShape};
pub use scrape::{EmbedPage, PublicPageScraper};
pub use session::{DeviceSettings, FileSessionStore, Session, SessionStore, SessionStoreError};
pub use shortcode::media_pk_from_code;
