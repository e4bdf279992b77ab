//! The registry of payload categories cloud-init recognizes.
//!
//! Each category is a fixed MIME content type plus the constant part
//! filename attached to it. The consuming boot agent honors at most one
//! part per category, which is why [`crate::builder::UserDataBuilder`]
//! rejects duplicates.

use std::fmt;

use serde::Serialize;

/// A payload category supported by cloud-init.
///
/// The set is fixed: callers pick from this table, they never define
/// their own content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    /// Boothook data. Stored under `/var/lib/cloud` and executed
    /// immediately — the earliest hook available. The agent provides no
    /// run-once mechanism; the hook itself must guard with the
    /// `INSTANCE_ID` environment variable if it needs one.
    CloudBoothook,

    /// `#cloud-config` data: the declarative YAML configuration format
    /// (packages, users, write_files, ...).
    CloudConfig,

    /// An include file: a list of URLs, one per line. Each URL is
    /// fetched and its content run through the same set of rules, so it
    /// may itself be gzipped, multipart, or plain text.
    #[serde(rename = "include-url-list")]
    IncludeUrl,

    /// A part-handler: python code with `list_types` and `handle_type`
    /// methods, written to `/var/lib/cloud/data` and registered for the
    /// MIME types it declares.
    PartHandler,

    /// A user script, executed "rc.local-like" — very late in the first
    /// boot sequence.
    ShellScript,

    /// An upstart job, placed into `/etc/init` and consumed by upstart
    /// like any other job.
    UpstartJob,
}

impl FileType {
    /// All categories, in registry order.
    pub const ALL: [FileType; 6] = [
        FileType::CloudBoothook,
        FileType::CloudConfig,
        FileType::IncludeUrl,
        FileType::PartHandler,
        FileType::ShellScript,
        FileType::UpstartJob,
    ];

    /// Full MIME content type, e.g. `"text/cloud-config"`.
    pub fn mime_type(self) -> &'static str {
        match self {
            FileType::CloudBoothook => "text/cloud-boothook",
            FileType::CloudConfig => "text/cloud-config",
            FileType::IncludeUrl => "text/x-include-url",
            FileType::PartHandler => "text/part-handler",
            FileType::ShellScript => "text/x-shellscript",
            FileType::UpstartJob => "text/upstart-job",
        }
    }

    /// MIME subtype, e.g. `"cloud-config"` for `"text/cloud-config"`.
    pub fn mime_subtype(self) -> &'static str {
        &self.mime_type()["text/".len()..]
    }

    /// The constant `name=` / `filename=` parameter for this category's
    /// MIME part. Fixed per category, never derived from caller input.
    pub fn file_name(self) -> &'static str {
        match self {
            FileType::CloudBoothook => "cloudinit-cloud-boothook.txt",
            FileType::CloudConfig => "cloudinit-cloud-config.txt",
            FileType::IncludeUrl => "cloudinit-x-include-url.txt",
            FileType::PartHandler => "cloudinit-part-handler.txt",
            FileType::ShellScript => "cloudinit-userdata-script.txt",
            FileType::UpstartJob => "cloudinit-upstart-job.txt",
        }
    }

    /// The CLI spelling of this category, e.g. `"cloud-config"`.
    pub fn name(self) -> &'static str {
        match self {
            FileType::CloudBoothook => "cloud-boothook",
            FileType::CloudConfig => "cloud-config",
            FileType::IncludeUrl => "include-url-list",
            FileType::PartHandler => "part-handler",
            FileType::ShellScript => "shell-script",
            FileType::UpstartJob => "upstart-job",
        }
    }

    /// Look up a category by its CLI spelling.
    pub fn from_name(name: &str) -> Option<FileType> {
        FileType::ALL.into_iter().find(|ft| ft.name() == name)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name(), self.mime_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_prefix() {
        for ft in FileType::ALL {
            assert!(ft.mime_type().starts_with("text/"), "{ft}");
        }
    }

    #[test]
    fn test_mime_subtype_strips_prefix() {
        assert_eq!(FileType::CloudConfig.mime_subtype(), "cloud-config");
        assert_eq!(FileType::ShellScript.mime_subtype(), "x-shellscript");
        assert_eq!(FileType::IncludeUrl.mime_subtype(), "x-include-url");
    }

    #[test]
    fn test_file_names_are_fixed() {
        assert_eq!(
            FileType::CloudConfig.file_name(),
            "cloudinit-cloud-config.txt"
        );
        assert_eq!(
            FileType::ShellScript.file_name(),
            "cloudinit-userdata-script.txt"
        );
    }

    #[test]
    fn test_from_name_roundtrip() {
        for ft in FileType::ALL {
            assert_eq!(FileType::from_name(ft.name()), Some(ft));
        }
        assert_eq!(FileType::from_name("x-shellscript"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            FileType::CloudConfig.to_string(),
            "cloud-config [text/cloud-config]"
        );
    }
}
