mod admin;
mod health;
mod redirect;

pub use admin::{
    create_redirect_handler, delete_redirect_handler, get_redirect_handler,
    list_redirects_handler,
};
pub use health::health_handler;
pub use redirect::redirect_handler;
