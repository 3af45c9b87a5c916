use std::path::PathBuf;
use std::sync::Arc;

use webpump_bridge::ContentSource;
use webpump_common::EngineError;

use crate::content::{self, ContentProvider};

/// What the webview loads first.
#[derive(Debug, Clone)]
pub(crate) enum LoadTarget {
    Url(String),
    /// An entry file served over the custom protocol from its own directory.
    Local {
        provider: Arc<ContentProvider>,
        entry: String,
    },
}

impl LoadTarget {
    /// Resolve `source`, serving local paths from `embedded` when the
    /// process is a standalone build.
    pub(crate) fn resolve(
        source: &ContentSource,
        embedded: Option<&Arc<ContentProvider>>,
    ) -> Result<Self, EngineError> {
        let path = match source {
            ContentSource::Url(url) => return Ok(Self::Url(url.clone())),
            ContentSource::Path(path) => path,
        };

        if let Some(provider) = embedded {
            let entry = path.to_string_lossy().replace('\\', "/");
            let entry = entry.trim_start_matches("./").trim_start_matches('/');
            if provider.resolve(entry).is_none() {
                return Err(EngineError::Init(format!(
                    "{entry} is not in the embedded bundle"
                )));
            }
            return Ok(Self::Local {
                provider: Arc::clone(provider),
                entry: entry.to_string(),
            });
        }

        if !path.is_file() {
            return Err(EngineError::Init(format!(
                "content file not found: {}",
                path.display()
            )));
        }
        let entry = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                EngineError::Init(format!("unusable content file name: {}", path.display()))
            })?
            .to_string();
        let root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(Self::Local {
            provider: Arc::new(ContentProvider::new(root)),
            entry,
        })
    }

    pub(crate) fn url(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Local { entry, .. } => content::protocol_url(entry),
        }
    }

    pub(crate) fn provider(&self) -> Option<Arc<ContentProvider>> {
        match self {
            Self::Url(_) => None,
            Self::Local { provider, .. } => Some(Arc::clone(provider)),
        }
    }
}
