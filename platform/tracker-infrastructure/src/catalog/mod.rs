use crate::http::{build_client, get_text, HttpSettings};
use reqwest::blocking::Client;
use std::fs;
use std::path::PathBuf;
use tracker_domain::repositories::catalog::TickerCatalogSource;
use tracker_domain::services::catalog::{parse_catalog, TickerCatalog};

/// Plain-text ticker list served over HTTP.
pub struct HttpTickerCatalog {
    url: String,
    retries: u32,
    client: Client,
}

impl HttpTickerCatalog {
    pub fn new(url: String, http: &HttpSettings) -> Result<Self, String> {
        url::Url::parse(&url).map_err(|err| format!("invalid catalog url {url}: {err}"))?;
        Ok(Self {
            url,
            retries: http.retries,
            client: build_client(http)?,
        })
    }
}

impl TickerCatalogSource for HttpTickerCatalog {
    fn load_catalog(&self) -> Result<TickerCatalog, String> {
        let body = get_text(&self.client, "catalog", &self.url, self.retries)
            .map_err(|err| format!("failed to fetch ticker catalog: {err}"))?;
        Ok(parse_catalog(&body))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

pub struct FileTickerCatalog {
    path: PathBuf,
}

impl FileTickerCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TickerCatalogSource for FileTickerCatalog {
    fn load_catalog(&self) -> Result<TickerCatalog, String> {
        let text = fs::read_to_string(&self.path).map_err(|err| {
            format!(
                "failed to read ticker catalog {}: {err}",
                self.path.display()
            )
        })?;
        Ok(parse_catalog(&text))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::FileTickerCatalog;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tracker_domain::repositories::catalog::TickerCatalogSource;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("{name}_{}_{nanos}.txt", std::process::id()))
    }

    #[test]
    fn file_catalog_parses_symbols() {
        let path = temp_path("tickers");
        fs::write(&path, "Symbol\nAAPL\nmsft, Microsoft\n# comment\nAAPL\n").expect("write");
        let catalog = FileTickerCatalog::new(&path).load_catalog().expect("catalog");
        let names: Vec<&str> = catalog.symbols.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["AAPL", "MSFT"]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_err() {
        let source = FileTickerCatalog::new(temp_path("missing"));
        let err = source.load_catalog().expect_err("missing");
        assert!(err.starts_with("failed to read ticker catalog"));
    }
}
