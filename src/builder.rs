//! The user-data builder: accumulate at most one payload per category,
//! then render everything as one MIME multipart document.
//!
//! Modeled on the fluent builders around EC2 `RunInstances`: collect the
//! payloads, call [`UserDataBuilder::build_base64`], pass the result as
//! the launch request's user-data parameter.

use std::collections::HashSet;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use encoding_rs::{Encoding, UTF_8};

use crate::error::{Result, UserDataError};
use crate::filetype::FileType;
use crate::mime;
use crate::source;

/// Builds one cloud-init user-data document.
///
/// The charset is fixed at construction. Parts keep their insertion
/// order in the final document — consumers process boot hooks before
/// cloud-config only if the caller added them first. Building is
/// non-destructive: the builder may be built repeatedly and mutated
/// between builds, but a category can never be added twice.
///
/// Not for concurrent mutation; use one builder per document.
#[derive(Debug, Clone)]
pub struct UserDataBuilder {
    charset: &'static Encoding,
    used: HashSet<FileType>,
    parts: Vec<(FileType, String)>,
}

impl UserDataBuilder {
    /// New builder with the UTF-8 charset. Never fails.
    pub fn start() -> Self {
        Self {
            charset: UTF_8,
            used: HashSet::new(),
            parts: Vec::new(),
        }
    }

    /// New builder with the charset named by `label` (a WHATWG encoding
    /// label, e.g. `"utf-8"` or `"windows-1252"`).
    ///
    /// Labels that name a decode-only encoding (UTF-16, `replacement`)
    /// are rejected: their encoder falls back to UTF-8, so the part
    /// headers would declare a charset the body bytes are not in.
    pub fn start_with_charset(label: &str) -> Result<Self> {
        let charset = Encoding::for_label(label.as_bytes())
            .filter(|enc| enc.output_encoding() == *enc)
            .ok_or_else(|| UserDataError::UnsupportedCharset(label.to_string()))?;
        Ok(Self {
            charset,
            used: HashSet::new(),
            parts: Vec::new(),
        })
    }

    /// The charset this builder encodes part bodies with.
    pub fn charset(&self) -> &'static Encoding {
        self.charset
    }

    /// Append a payload for `file_type`.
    ///
    /// Fails with [`UserDataError::DuplicateCategory`] if a part of that
    /// category was already added — cloud-init honors a single part per
    /// content type, so a second one would be silently dropped at boot.
    /// A rejected call leaves the builder exactly as it was.
    pub fn add_file(&mut self, file_type: FileType, content: &str) -> Result<&mut Self> {
        if self.used.contains(&file_type) {
            return Err(UserDataError::DuplicateCategory(file_type));
        }
        self.used.insert(file_type);
        self.parts.push((file_type, content.to_string()));
        Ok(self)
    }

    /// Append a payload for `file_type`, read from a file on disk and
    /// decoded under this builder's charset.
    pub fn add_file_from_path(&mut self, file_type: FileType, path: &Path) -> Result<&mut Self> {
        // Reject duplicates before touching the filesystem.
        if self.used.contains(&file_type) {
            return Err(UserDataError::DuplicateCategory(file_type));
        }
        let content = source::read_payload(path, self.charset)?;
        self.add_file(file_type, &content)
    }

    /// Add a boothook payload.
    pub fn add_cloud_boothook(&mut self, content: &str) -> Result<&mut Self> {
        self.add_file(FileType::CloudBoothook, content)
    }

    /// Add a `#cloud-config` payload.
    pub fn add_cloud_config(&mut self, content: &str) -> Result<&mut Self> {
        self.add_file(FileType::CloudConfig, content)
    }

    /// Add an include-URL-list payload (one URL per line).
    pub fn add_include_url_list(&mut self, content: &str) -> Result<&mut Self> {
        self.add_file(FileType::IncludeUrl, content)
    }

    /// Add a part-handler payload.
    pub fn add_part_handler(&mut self, content: &str) -> Result<&mut Self> {
        self.add_file(FileType::PartHandler, content)
    }

    /// Add a user shell script payload.
    pub fn add_shell_script(&mut self, content: &str) -> Result<&mut Self> {
        self.add_file(FileType::ShellScript, content)
    }

    /// Add an upstart job payload.
    pub fn add_upstart_job(&mut self, content: &str) -> Result<&mut Self> {
        self.add_file(FileType::UpstartJob, content)
    }

    /// Add a `#cloud-config` payload from a file.
    pub fn add_cloud_config_from_path(&mut self, path: &Path) -> Result<&mut Self> {
        self.add_file_from_path(FileType::CloudConfig, path)
    }

    /// Add a user shell script payload from a file.
    pub fn add_shell_script_from_path(&mut self, path: &Path) -> Result<&mut Self> {
        self.add_file_from_path(FileType::ShellScript, path)
    }

    /// Whether a part of this category has been added.
    pub fn is_used(&self, file_type: FileType) -> bool {
        self.used.contains(&file_type)
    }

    /// Number of parts added so far.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// `true` when no parts have been added.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Render the complete MIME multipart document.
    ///
    /// All-or-nothing: either the whole document is returned or an error
    /// is, never a partial render. Repeated calls on an unmutated
    /// builder return byte-identical output, boundary included.
    pub fn build(&self) -> Result<String> {
        let mut rendered = Vec::with_capacity(self.parts.len());
        for (file_type, content) in &self.parts {
            rendered.push(mime::render_part(*file_type, content, self.charset)?);
        }
        let boundary = mime::choose_boundary(&rendered);
        Ok(mime::render_document(
            &rendered,
            &boundary,
            self.charset.name(),
        ))
    }

    /// [`build`](Self::build), then standard Base64 over the document
    /// bytes. The document is pure ASCII (bodies are 7bit or base64), so
    /// no line wrapping is needed for transport.
    pub fn build_base64(&self) -> Result<String> {
        Ok(BASE64.encode(self.build()?.as_bytes()))
    }
}

impl Default for UserDataBuilder {
    fn default() -> Self {
        Self::start()
    }
}
