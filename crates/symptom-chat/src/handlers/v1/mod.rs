//! V1 API handlers.

mod models;
mod sessions;

pub use models::list_models;
pub use sessions::{
    clear_session, create_session, delete_session, get_session, get_settings, send_message,
    update_settings,
};
