//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
pub mod users;

pub use error::ApiResult;

use actix_web::web;

/// Mount the versioned API scope.
///
/// JSON extraction failures are reported through
/// [`error::json_error_handler`] so clients always receive the domain error
/// envelope. Callers register [`state::HttpState`] as app data.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use registration::inbound::http::configure_api;
///
/// let app = App::new().configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
            .service(users::create_user),
    );
}
