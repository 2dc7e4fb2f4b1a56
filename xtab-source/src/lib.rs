//! Byte-stream sources for delimited-text scans.
//!
//! A [`Source`] resolves a path or glob pattern into an ordered list of
//! concrete files and opens each one lazily, selecting a decompressor by
//! file extension (`.gz` → gzip, `.zst` → zstandard, anything else raw).
//! Streams are restartable — re-opening an index yields the bytes from the
//! start — but never seekable mid-stream, which is all a forward-only
//! record scan needs.
//!
//! Path boundaries stay visible to the caller: a cursor walks the resolved
//! path list one file at a time, so it can reset its per-file line counter
//! while keeping a single rowid sequence across the whole set.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use xtab_result::{Error, Result};

/// How a scan's bytes were specified: one literal path, or a glob pattern
/// expanding to many.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// A literal path to a single file.
    File(String),
    /// A glob pattern expanding to zero or more files.
    Glob(String),
}

impl SourceSpec {
    /// Classify a raw source string. Anything containing a glob
    /// metacharacter (`*`, `?`, `[`) is treated as a pattern; there is no
    /// content sniffing beyond that.
    pub fn parse(raw: &str) -> SourceSpec {
        if raw.contains(['*', '?', '[']) {
            SourceSpec::Glob(raw.to_owned())
        } else {
            SourceSpec::File(raw.to_owned())
        }
    }
}

/// An ordered, resolved set of source files behind one logical table.
///
/// Resolution is eager (missing files and empty globs fail at table-creation
/// time); opening is lazy (a file handle exists only while the scan is
/// positioned on that file).
#[derive(Debug, Clone)]
pub struct Source {
    paths: Vec<PathBuf>,
}

impl Source {
    /// Resolve a raw source string into a concrete file list.
    ///
    /// Globs expand via [`glob::glob`] and are sorted lexicographically by
    /// resolved path so multi-file scans have a deterministic order. An
    /// explicit path that does not name an existing file is
    /// [`Error::SourceNotFound`]; a pattern matching nothing is
    /// [`Error::GlobNoMatch`].
    pub fn resolve(raw: &str) -> Result<Source> {
        match SourceSpec::parse(raw) {
            SourceSpec::File(path) => {
                if !Path::new(&path).is_file() {
                    return Err(Error::SourceNotFound(path));
                }
                Ok(Source {
                    paths: vec![PathBuf::from(path)],
                })
            }
            SourceSpec::Glob(pattern) => {
                let mut paths = Vec::new();
                for entry in glob::glob(&pattern)? {
                    let path = entry.map_err(|err| Error::Io(err.into_error()))?;
                    if path.is_file() {
                        paths.push(path);
                    }
                }
                if paths.is_empty() {
                    return Err(Error::GlobNoMatch(pattern));
                }
                paths.sort();
                Ok(Source { paths })
            }
        }
    }

    /// The resolved paths, in scan order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Number of files in the set.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Open the file at `index` from the start.
    ///
    /// Calling this again for the same index restarts the stream, which is
    /// how a fresh cursor re-scans a table.
    pub fn open(&self, index: usize) -> Result<Box<dyn Read>> {
        let path = self
            .paths
            .get(index)
            .ok_or_else(|| Error::Internal(format!("source index {index} out of range")))?;
        open_stream(path)
    }
}

/// Open a single path, selecting a decompressor by file extension only.
pub fn open_stream(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path)
        .map_err(|_| Error::SourceNotFound(path.display().to_string()))?;
    match path.extension().and_then(OsStr::to_str) {
        Some("gz") => Ok(Box::new(BufReader::new(flate2::read::GzDecoder::new(
            BufReader::new(file),
        )))),
        Some("zst") => Ok(Box::new(zstd::Decoder::new(file)?)),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn read_all(mut stream: Box<dyn Read>) -> String {
        let mut out = String::new();
        stream.read_to_string(&mut out).expect("read stream");
        out
    }

    #[test]
    fn single_file_resolves_and_reads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let source = Source::resolve(path.to_str().unwrap()).expect("resolve");
        assert_eq!(source.len(), 1);
        assert_eq!(read_all(source.open(0).unwrap()), "a,b\n1,2\n");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Source::resolve("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(_)));
    }

    #[test]
    fn glob_expands_in_lexicographic_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.csv", "a.csv", "c.csv"] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }
        let pattern = dir.path().join("*.csv");

        let source = Source::resolve(pattern.to_str().unwrap()).expect("resolve");
        let names: Vec<_> = source
            .paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
            .collect();
        assert_eq!(names, ["a.csv", "b.csv", "c.csv"]);
    }

    #[test]
    fn empty_glob_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pattern = dir.path().join("*.tsv");
        let err = Source::resolve(pattern.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, Error::GlobNoMatch(_)));
    }

    #[test]
    fn gzip_stream_is_transparently_decompressed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv.gz");
        let file = File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(b"a,b\n1,2\n").unwrap();
        encoder.finish().unwrap();

        let source = Source::resolve(path.to_str().unwrap()).expect("resolve");
        assert_eq!(read_all(source.open(0).unwrap()), "a,b\n1,2\n");
    }

    #[test]
    fn zstd_stream_is_transparently_decompressed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv.zst");
        let compressed = zstd::encode_all(&b"a,b\n1,2\n"[..], 0).unwrap();
        std::fs::write(&path, compressed).unwrap();

        let source = Source::resolve(path.to_str().unwrap()).expect("resolve");
        assert_eq!(read_all(source.open(0).unwrap()), "a,b\n1,2\n");
    }

    #[test]
    fn reopening_restarts_from_the_beginning() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "x,y\n").unwrap();

        let source = Source::resolve(path.to_str().unwrap()).expect("resolve");
        assert_eq!(read_all(source.open(0).unwrap()), "x,y\n");
        assert_eq!(read_all(source.open(0).unwrap()), "x,y\n");
    }
}
