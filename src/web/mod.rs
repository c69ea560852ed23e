mod routes;
mod static_files;
mod ws;

pub use routes::create_router;
pub use static_files::{
    content_type_for, render_template, resolve_asset_path, serve_path, SIGNALING_URL_PLACEHOLDER,
};
