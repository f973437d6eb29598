//! Curated reference catalog: file loading, validation, facet filtering, and
//! store-name resolution for target URLs.

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::products::{priority_for_score, Product};
use crate::ConfigError;

/// Season a catalog entry is intended for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Temporada {
    #[serde(rename = "caliente")]
    Caliente,
    #[serde(rename = "frio")]
    Frio,
    #[serde(rename = "todo el año")]
    TodoElAno,
}

impl std::fmt::Display for Temporada {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Temporada::Caliente => write!(f, "caliente"),
            Temporada::Frio => write!(f, "frio"),
            Temporada::TodoElAno => write!(f, "todo el año"),
        }
    }
}

/// One curated reference product. Field names follow the catalog file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub titulo: String,
    pub precio: String,
    pub imagen_url: String,
    /// Store the entry belongs to; entries without one match every store.
    #[serde(default)]
    pub tienda: Option<String>,
    pub temporada: Temporada,
    pub categoria: String,
    #[serde(default)]
    pub colores: Vec<String>,
    #[serde(default)]
    pub tallas: Vec<String>,
    pub trend_score: f64,
    pub notas: String,
}

impl CatalogEntry {
    /// Convert the entry to the response-side [`Product`] shape. Priority is
    /// derived from the trend score.
    #[must_use]
    pub fn to_product(&self) -> Product {
        Product {
            title: self.titulo.clone(),
            price: self.precio.clone(),
            colors: self.colores.clone(),
            sizes: self.tallas.clone(),
            image: self.imagen_url.clone(),
            trend_score: self.trend_score,
            recommendation: self.notas.clone(),
            priority: priority_for_score(self.trend_score),
            store: self.tienda.clone(),
            store_url: None,
        }
    }

    fn matches_season(&self, requested: &str) -> bool {
        requested == "todos"
            || self.temporada == Temporada::TodoElAno
            || requested == self.temporada.to_string()
    }

    fn matches_category(&self, requested: &str) -> bool {
        if requested == "todos" {
            return true;
        }
        let entry = self.categoria.to_lowercase();
        let requested = requested.to_lowercase();
        entry.contains(&requested) || requested.contains(&entry)
    }

    fn matches_store(&self, store: Option<&str>) -> bool {
        match (&self.tienda, store) {
            (None, _) | (_, None) => true,
            (Some(tienda), Some(store)) => tienda == store,
        }
    }
}

/// Catalog file contents: reference entries plus an explicit host-to-store
/// mapping used before falling back to hostname heuristics.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub entries: Vec<CatalogEntry>,
    #[serde(default)]
    pub stores: HashMap<String, String>,
}

/// Load and validate the reference catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalog: CatalogFile = serde_yaml::from_str(&content)?;
    validate_catalog(&catalog)?;

    Ok(catalog)
}

fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    for entry in &catalog.entries {
        if entry.titulo.trim().is_empty() {
            return Err(ConfigError::Validation(
                "catalog entry titulo must be non-empty".to_string(),
            ));
        }

        if !(1.0..=10.0).contains(&entry.trend_score) {
            return Err(ConfigError::Validation(format!(
                "catalog entry '{}' has trend_score {} outside [1, 10]",
                entry.titulo, entry.trend_score
            )));
        }
    }

    Ok(())
}

/// Select catalog entries matching the requested season, category, and
/// (optionally) store, preserving file order.
#[must_use]
pub fn filter_entries(
    entries: &[CatalogEntry],
    season: &str,
    categories: &str,
    store: Option<&str>,
) -> Vec<CatalogEntry> {
    entries
        .iter()
        .filter(|e| e.matches_season(season) && e.matches_category(categories) && e.matches_store(store))
        .cloned()
        .collect()
}

/// Resolves a store name from a page URL.
///
/// Known hosts come from the catalog file's explicit mapping; unknown hosts
/// fall back to the second-to-last dot-separated hostname label (so
/// `shop.zara.com` becomes `zara`), and IP-literal or single-label hosts are
/// used as-is.
#[derive(Debug, Clone, Default)]
pub struct StoreDirectory {
    by_host: HashMap<String, String>,
}

impl StoreDirectory {
    #[must_use]
    pub fn new(by_host: HashMap<String, String>) -> Self {
        Self { by_host }
    }

    #[must_use]
    pub fn resolve(&self, url: &str) -> Option<String> {
        let host = host_of(url)?;

        if let Some(store) = self.by_host.get(&host) {
            return Some(store.clone());
        }

        if host.parse::<IpAddr>().is_ok() {
            return Some(host);
        }

        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() >= 2 {
            Some(labels[labels.len() - 2].to_string())
        } else {
            Some(host)
        }
    }
}

fn host_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed.host_str().map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(titulo: &str, temporada: Temporada, categoria: &str, tienda: Option<&str>) -> CatalogEntry {
        CatalogEntry {
            titulo: titulo.to_string(),
            precio: "$499".to_string(),
            imagen_url: format!("https://images.example.com/{titulo}.jpg"),
            tienda: tienda.map(str::to_string),
            temporada,
            categoria: categoria.to_string(),
            colores: vec![],
            tallas: vec![],
            trend_score: 8.0,
            notas: "Producto de catálogo".to_string(),
        }
    }

    #[test]
    fn season_caliente_excludes_frio_entries() {
        let entries = vec![
            entry("Blusa Floral", Temporada::Caliente, "blusas", None),
            entry("Suéter Tejido", Temporada::Frio, "sueteres", None),
            entry("Pantalón Mezclilla", Temporada::TodoElAno, "pantalones", None),
        ];
        let filtered = filter_entries(&entries, "caliente", "todos", None);
        let titles: Vec<&str> = filtered.iter().map(|e| e.titulo.as_str()).collect();
        assert_eq!(titles, vec!["Blusa Floral", "Pantalón Mezclilla"]);
    }

    #[test]
    fn season_todos_matches_everything() {
        let entries = vec![
            entry("Blusa Floral", Temporada::Caliente, "blusas", None),
            entry("Suéter Tejido", Temporada::Frio, "sueteres", None),
        ];
        assert_eq!(filter_entries(&entries, "todos", "todos", None).len(), 2);
    }

    #[test]
    fn category_matches_by_substring_in_either_direction() {
        let entries = vec![entry("Vestido Casual", Temporada::Caliente, "vestidos", None)];
        assert_eq!(filter_entries(&entries, "todos", "vestido", None).len(), 1);
        assert_eq!(
            filter_entries(&entries, "todos", "vestidos de verano", None).len(),
            1
        );
        assert_eq!(filter_entries(&entries, "todos", "pantalones", None).len(), 0);
    }

    #[test]
    fn store_filter_keeps_unattributed_entries() {
        let entries = vec![
            entry("Blusa Floral", Temporada::Caliente, "blusas", None),
            entry("Vestido Casual", Temporada::Caliente, "vestidos", Some("zara")),
            entry("Top Básico", Temporada::Caliente, "tops", Some("shein")),
        ];
        let filtered = filter_entries(&entries, "todos", "todos", Some("zara"));
        let titles: Vec<&str> = filtered.iter().map(|e| e.titulo.as_str()).collect();
        assert_eq!(titles, vec!["Blusa Floral", "Vestido Casual"]);
    }

    #[test]
    fn to_product_derives_priority_from_score() {
        let mut e = entry("Chamarra Acolchada", Temporada::Frio, "chamarras", None);
        e.trend_score = 9.5;
        let product = e.to_product();
        assert_eq!(product.priority, crate::products::Priority::High);
        assert_eq!(product.title, "Chamarra Acolchada");
        assert!(product.store_url.is_none());
    }

    #[test]
    fn validate_rejects_out_of_range_trend_score() {
        let mut e = entry("Blusa Floral", Temporada::Caliente, "blusas", None);
        e.trend_score = 11.0;
        let catalog = CatalogFile {
            entries: vec![e],
            stores: HashMap::new(),
        };
        let err = validate_catalog(&catalog).unwrap_err();
        assert!(err.to_string().contains("outside [1, 10]"));
    }

    #[test]
    fn validate_rejects_empty_title() {
        let mut e = entry("x", Temporada::Caliente, "blusas", None);
        e.titulo = "  ".to_string();
        let catalog = CatalogFile {
            entries: vec![e],
            stores: HashMap::new(),
        };
        let err = validate_catalog(&catalog).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn catalog_file_parses_seasons_from_yaml() {
        let yaml = r#"
entries:
  - titulo: "Pantalón Mezclilla Clásico"
    precio: "$499"
    imagen_url: "https://images.example.com/jeans.jpg"
    temporada: "todo el año"
    categoria: "pantalones"
    colores: ["azul", "negro"]
    tallas: ["26", "28"]
    trend_score: 8.5
    notas: "Versátil para cualquier temporada"
stores:
  "tienda.example.com": "tienda"
"#;
        let catalog: CatalogFile = serde_yaml::from_str(yaml).expect("parse catalog yaml");
        assert_eq!(catalog.entries.len(), 1);
        assert_eq!(catalog.entries[0].temporada, Temporada::TodoElAno);
        assert_eq!(catalog.stores.get("tienda.example.com").map(String::as_str), Some("tienda"));
    }

    #[test]
    fn store_directory_prefers_explicit_mapping() {
        let mut by_host = HashMap::new();
        by_host.insert("tienda.com.mx".to_string(), "tienda-mx".to_string());
        let dir = StoreDirectory::new(by_host);
        assert_eq!(
            dir.resolve("https://tienda.com.mx/vestidos"),
            Some("tienda-mx".to_string())
        );
    }

    #[test]
    fn store_directory_falls_back_to_hostname_label() {
        let dir = StoreDirectory::default();
        assert_eq!(
            dir.resolve("https://shop.zara.com/mx/mujer"),
            Some("zara".to_string())
        );
        assert_eq!(dir.resolve("https://shein.com/sale"), Some("shein".to_string()));
    }

    #[test]
    fn store_directory_keeps_ip_hosts_whole() {
        let dir = StoreDirectory::default();
        assert_eq!(
            dir.resolve("http://127.0.0.1:8080/cat"),
            Some("127.0.0.1".to_string())
        );
    }

    #[test]
    fn store_directory_rejects_invalid_urls() {
        let dir = StoreDirectory::default();
        assert_eq!(dir.resolve("not a url"), None);
    }
}
