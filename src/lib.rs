//! `cloudseed` — build cloud-init user-data MIME multipart documents.
//!
//! This crate assembles the "user-data" document that cloud-init-style
//! boot agents consume when a new instance launches: one MIME multipart
//! message bundling at most one payload per supported file type
//! (cloud-config, shell script, boothook, ...), optionally Base64-encoded
//! for transport as a launch parameter.
//!
//! ```
//! use cloudseed::builder::UserDataBuilder;
//!
//! let user_data = UserDataBuilder::start()
//!     .add_shell_script("#!/bin/sh\necho hi\n")?
//!     .add_cloud_config("#cloud-config\npackages: [nginx]\n")?
//!     .build_base64()?;
//! # Ok::<(), cloudseed::error::UserDataError>(())
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod filetype;
pub mod mime;
pub mod source;
