//! Configuration section definitions.
//!
//! Each module corresponds to a section in `site.toml`:
//!
//! | Module  | TOML Section | Purpose                                 |
//! |---------|--------------|-----------------------------------------|
//! | `build` | `[build]`    | Source/dest trees, templates, excludes  |
//! | `serve` | `[serve]`    | Development server                      |
//! | `site`  | `[site]`     | Webroot, users for protected pages      |
//!
//! `[variables]` is a free-form table and lives on `SiteConfig` directly.

pub mod build;
mod serve;
pub mod site;

pub use build::BuildSectionConfig;
pub use serve::ServeConfig;
pub use site::SiteSectionConfig;
