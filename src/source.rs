use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::{IndexerError, Result};

/// Buffered line stream over a gzip-compressed dataset resource.
///
/// Lines are decompressed as they are pulled; the file is never materialized
/// in memory. Open failures and mid-stream read failures (including a resource
/// that is not valid gzip) surface as `Resource` errors, which abort the stage
/// consuming the stream.
pub struct GzipLines {
    path: PathBuf,
    lines: Lines<BufReader<GzDecoder<File>>>,
}

impl std::fmt::Debug for GzipLines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GzipLines").field("path", &self.path).finish()
    }
}

impl GzipLines {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| IndexerError::Resource {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(GzDecoder::new(file)).lines(),
        })
    }
}

impl Iterator for GzipLines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.next().map(|line| {
            line.map_err(|e| IndexerError::Resource {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn write_gz(path: &Path, content: &str) {
        let file = File::create(path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn streams_lines_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.tsv.gz");
        write_gz(&path, "first\tline\nsecond\tline\n");

        let lines: Vec<String> = GzipLines::open(&path)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(lines, vec!["first\tline", "second\tline"]);
    }

    #[test]
    fn missing_resource_is_a_resource_error() {
        let err = GzipLines::open(Path::new("/nonexistent/name.basics.tsv.gz")).unwrap_err();
        assert!(matches!(err, IndexerError::Resource { .. }));
    }

    #[test]
    fn invalid_gzip_fails_on_first_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.tsv.gz");
        std::fs::write(&path, b"this is not gzip").unwrap();

        let mut lines = GzipLines::open(&path).unwrap();
        let err = lines.next().unwrap().unwrap_err();
        assert!(matches!(err, IndexerError::Resource { .. }));
    }
}
