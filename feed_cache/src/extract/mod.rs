//! Helpers for pulling server-rendered JSON out of HTML pages
//!
//! Many sites built on Next.js ship their page data inside inline `<script>`
//! tags rather than in the markup. These helpers recover that data so route
//! handlers can map it to feed items without scraping the rendered DOM.

mod errors;
mod next_data;

pub use errors::ExtractError;
pub use next_data::{extract_next_data, extract_next_flight_objects};
