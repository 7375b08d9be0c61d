// SPDX-License-Identifier: MIT
//! Resource resolution
//!
//! Manifests refer to content by URI, `scheme://host/path`. The host picks
//! a family of providers (`local` for the box itself and the directory it
//! was loaded from) and the scheme says how to post-process the bytes:
//! `file` hands them over unchanged, `deflate` inflates a raw DEFLATE
//! stream. Providers are asked in registration order; the first one that
//! recognises the URI wins.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use flate2::read::DeflateDecoder;
use tracing::{debug, warn};

use crate::container::{BoxFile, ByteSource};
use crate::error::ResourceError;
use crate::serializer::Wire;

/// Host served by the box and directory providers
pub const LOCAL_HOST: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    File,
    Deflate,
    Other(String),
}

impl Scheme {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "file" => Scheme::File,
            "deflate" => Scheme::Deflate,
            other => Scheme::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Scheme::File => "file",
            Scheme::Deflate => "deflate",
            Scheme::Other(s) => s,
        }
    }
}

/// A parsed `scheme://host/path` resource address.
///
/// The path keeps its leading `/` and is not percent-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUri {
    scheme: Scheme,
    host: String,
    path: String,
}

impl ResourceUri {
    pub fn parse(uri: &str) -> Result<Self, ResourceError> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| ResourceError::InvalidUri(uri.to_string()))?;

        let valid_scheme = scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !valid_scheme {
            return Err(ResourceError::InvalidUri(uri.to_string()));
        }

        let (host, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };

        Ok(Self {
            scheme: Scheme::parse(scheme),
            host: host.to_string(),
            path: path.to_string(),
        })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path with one leading separator removed
    pub fn relative_path(&self) -> &str {
        self.path.strip_prefix('/').unwrap_or(&self.path)
    }

    pub fn is_local(&self) -> bool {
        self.host.eq_ignore_ascii_case(LOCAL_HOST)
    }
}

impl FromStr for ResourceUri {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme.as_str(), self.host, self.path)
    }
}

/// Source of resource streams.
///
/// `None` means the provider does not serve this URI and the next provider
/// should be asked; `Some(Err(_))` means it does but opening failed.
pub trait DataProvider {
    fn open(&self, uri: &ResourceUri) -> Option<io::Result<Box<dyn Read + '_>>>;
}

impl<T: DataProvider + ?Sized> DataProvider for &T {
    fn open(&self, uri: &ResourceUri) -> Option<io::Result<Box<dyn Read + '_>>> {
        (**self).open(uri)
    }
}

/// Entries of a loaded box, addressed as `scheme://local/<entry name>`
impl<S: ByteSource, M: Wire> DataProvider for BoxFile<S, M> {
    fn open(&self, uri: &ResourceUri) -> Option<io::Result<Box<dyn Read + '_>>> {
        if !uri.is_local() {
            return None;
        }
        let view = self.resolve(uri.relative_path())?;
        Some(Ok(Box::new(view) as Box<dyn Read + '_>))
    }
}

/// Files below a base directory, addressed as `scheme://local/<relative path>`
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    base: PathBuf,
}

impl DirectoryProvider {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn locate(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            warn!(path = %relative.display(), "rejected resource path outside base directory");
            return None;
        }
        let full = self.base.join(relative);
        full.is_file().then_some(full)
    }
}

impl DataProvider for DirectoryProvider {
    fn open(&self, uri: &ResourceUri) -> Option<io::Result<Box<dyn Read + '_>>> {
        if !uri.is_local() {
            return None;
        }
        let path = self.locate(uri.relative_path())?;
        Some(File::open(path).map(|f| Box::new(f) as Box<dyn Read>))
    }
}

/// Ordered set of providers plus scheme post-processing
#[derive(Default)]
pub struct ResourceManager<'p> {
    providers: Vec<Box<dyn DataProvider + 'p>>,
}

impl<'p> ResourceManager<'p> {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Append a provider; earlier registrations take precedence
    pub fn register(&mut self, provider: impl DataProvider + 'p) -> &mut Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn open(&self, uri: &str) -> Result<Box<dyn Read + '_>, ResourceError> {
        let uri = ResourceUri::parse(uri)?;
        self.open_uri(&uri)
    }

    pub fn open_uri(&self, uri: &ResourceUri) -> Result<Box<dyn Read + '_>, ResourceError> {
        for (i, provider) in self.providers.iter().enumerate() {
            if let Some(stream) = provider.open(uri) {
                debug!(%uri, provider = i, "resolved resource");
                let stream = stream?;
                return Ok(match uri.scheme() {
                    Scheme::Deflate => {
                        Box::new(DeflateDecoder::new(stream)) as Box<dyn Read + '_>
                    }
                    Scheme::File | Scheme::Other(_) => stream,
                });
            }
        }
        Err(ResourceError::NotFound(uri.to_string()))
    }

    /// Resolve and read the whole resource
    pub fn read_to_vec(&self, uri: &str) -> Result<Vec<u8>, ResourceError> {
        let mut out = Vec::new();
        self.open(uri)?.read_to_end(&mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Fixed(&'static [u8]);

    impl DataProvider for Fixed {
        fn open(&self, uri: &ResourceUri) -> Option<io::Result<Box<dyn Read + '_>>> {
            (uri.host() == "fixed").then(|| Ok(Box::new(self.0) as Box<dyn Read>))
        }
    }

    #[test]
    fn test_parse() {
        let uri = ResourceUri::parse("FILE://Local/meshes/body.mesh").unwrap();
        assert_eq!(uri.scheme(), &Scheme::File);
        assert_eq!(uri.host(), "Local");
        assert!(uri.is_local());
        assert_eq!(uri.path(), "/meshes/body.mesh");
        assert_eq!(uri.relative_path(), "meshes/body.mesh");
        assert_eq!(uri.to_string(), "file://Local/meshes/body.mesh");
    }

    #[test]
    fn test_parse_without_path() {
        let uri: ResourceUri = "custom://proc".parse().unwrap();
        assert_eq!(uri.scheme(), &Scheme::Other("custom".into()));
        assert_eq!(uri.path(), "/");
    }

    #[test]
    fn test_relative_path_strips_one_separator() {
        let uri = ResourceUri::parse("file://local//x").unwrap();
        assert_eq!(uri.path(), "//x");
        assert_eq!(uri.relative_path(), "/x");
        assert_eq!(ResourceUri::parse("file://local/x").unwrap().relative_path(), "x");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ResourceUri::parse("no-scheme").is_err());
        assert!(ResourceUri::parse("://local/x").is_err());
        assert!(ResourceUri::parse("1ab://local/x").is_err());
    }

    #[test]
    fn test_first_provider_wins() {
        let mut manager = ResourceManager::new();
        manager.register(Fixed(b"first")).register(Fixed(b"second"));
        assert_eq!(manager.read_to_vec("file://fixed/x").unwrap(), b"first");
    }

    #[test]
    fn test_not_found() {
        let mut manager = ResourceManager::new();
        manager.register(Fixed(b"data"));
        let err = manager.open("file://elsewhere/x").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_deflate_scheme() {
        use flate2::write::DeflateEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"inflated text").unwrap();
        let compressed: &'static [u8] = Box::leak(enc.finish().unwrap().into_boxed_slice());

        let mut manager = ResourceManager::new();
        manager.register(Fixed(compressed));
        assert_eq!(manager.read_to_vec("deflate://fixed/x").unwrap(), b"inflated text");
        assert_eq!(manager.read_to_vec("file://fixed/x").unwrap(), compressed);
    }

    #[test]
    fn test_directory_provider() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"alpha").unwrap();

        let provider = DirectoryProvider::new(dir.path());
        let mut manager = ResourceManager::new();
        manager.register(&provider);

        assert_eq!(manager.read_to_vec("file://local/a.txt").unwrap(), b"alpha");
        assert!(manager.open("file://local/missing.txt").is_err());
        assert!(manager.open("file://remote/a.txt").is_err());
        assert!(manager.open("file://local/../a.txt").is_err());
        assert!(manager.open("file://local//a.txt").is_err());
    }
}
