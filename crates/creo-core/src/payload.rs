/// How a downloaded package lands on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Extracted into the destination directory, then deleted.
    Zip,
    /// Moved to the destination as-is.
    File,
}

impl PayloadKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::File => "file",
        }
    }

    pub fn is_archive(self) -> bool {
        matches!(self, Self::Zip)
    }

    pub fn infer_from_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        let without_fragment = lower.split('#').next().unwrap_or(&lower);
        let without_query = without_fragment
            .split('?')
            .next()
            .unwrap_or(without_fragment);

        if without_query.ends_with(".zip") {
            return Self::Zip;
        }

        Self::File
    }
}
