//! HTML presentation of dashboard views.

pub mod html;

pub use self::html::{escape_html, render_page};
