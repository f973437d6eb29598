//! Per-request orchestration: fan out over target URLs, run the
//! fetch→sanitize→prompt→extract→validate→dedupe→rank chain for each, then
//! merge with the reference catalog and recompute the summary.

use futures::future::join_all;

use trendlens_core::catalog::{filter_entries, CatalogEntry, CatalogFile, StoreDirectory};
use trendlens_core::products::{AnalysisResponse, Product};
use trendlens_core::rank::{rank_url_products, shuffle_products, summarize, PER_URL_PRODUCT_CAP};
use trendlens_core::similarity::dedup_products;
use trendlens_core::AppConfig;

use crate::error::ExtractError;
use crate::fetch::PageFetcher;
use crate::image::ImageValidator;
use crate::llm::ExtractionClient;
use crate::prompt::{build_system_prompt, build_user_prompt};
use crate::sanitize::sanitize_markup;

/// The full analysis pipeline behind one `analyze` request.
///
/// URLs are processed concurrently; each per-URL task is internally
/// sequential, and its failures degrade to an empty contribution rather than
/// failing the request.
pub struct Analyzer {
    fetcher: PageFetcher,
    llm: ExtractionClient,
    images: ImageValidator,
    catalog: Vec<CatalogEntry>,
    stores: StoreDirectory,
}

impl Analyzer {
    /// Builds an analyzer from application config and a loaded catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] if any of the HTTP clients cannot be
    /// constructed or the configured endpoint URL is invalid.
    pub fn from_config(config: &AppConfig, catalog: CatalogFile) -> Result<Self, ExtractError> {
        Ok(Self::new(
            PageFetcher::new(config.page_fetch_timeout_secs)?,
            ExtractionClient::new(
                &config.llm_base_url,
                config.llm_api_key.clone(),
                &config.llm_model,
                config.llm_request_timeout_secs,
            )?,
            ImageValidator::new(config.image_probe_timeout_secs)?,
            catalog,
        ))
    }

    #[must_use]
    pub fn new(
        fetcher: PageFetcher,
        llm: ExtractionClient,
        images: ImageValidator,
        catalog: CatalogFile,
    ) -> Self {
        Self {
            fetcher,
            llm,
            images,
            catalog: catalog.entries,
            stores: StoreDirectory::new(catalog.stores),
        }
    }

    /// Whether the extraction credential is configured.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.llm.has_credential()
    }

    /// Runs the full pipeline for one request.
    ///
    /// Never fails: per-URL errors are logged and contribute empty lists, so
    /// the caller always gets a (possibly smaller) payload.
    pub async fn analyze(&self, urls: &[String], season: &str, categories: &str) -> AnalysisResponse {
        let tasks = urls.iter().map(|url| self.analyze_url(url, season, categories));
        let per_url: Vec<Vec<Product>> = join_all(tasks).await;

        let mut products = self.catalog_products(season, categories).await;
        products.extend(per_url.into_iter().flatten());

        shuffle_products(&mut products);
        let summary = summarize(&products, urls.len());

        AnalysisResponse {
            urls: urls.to_vec(),
            products,
            summary,
        }
    }

    async fn analyze_url(&self, url: &str, season: &str, categories: &str) -> Vec<Product> {
        match self.analyze_url_inner(url, season, categories).await {
            Ok(products) => {
                tracing::info!(url = %url, count = products.len(), "page analysis complete");
                products
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "page analysis failed, contributing no products");
                Vec::new()
            }
        }
    }

    async fn analyze_url_inner(
        &self,
        url: &str,
        season: &str,
        categories: &str,
    ) -> Result<Vec<Product>, ExtractError> {
        let parsed = url::Url::parse(url).map_err(|e| ExtractError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        let base_url = parsed.origin().ascii_serialization();
        let store = self.stores.resolve(url);

        let raw_markup = self.fetcher.fetch(url).await?;
        let sanitized = sanitize_markup(&raw_markup);

        let references = filter_entries(&self.catalog, season, categories, store.as_deref());
        let system_prompt = build_system_prompt(&references, season, categories);
        let user_prompt = build_user_prompt(url, &base_url, &sanitized, season, categories);

        let extracted = self
            .llm
            .extract_products(&system_prompt, &user_prompt, store.as_deref(), url)
            .await?;

        // Image probes run sequentially: candidate counts are small and the
        // probe timeout already bounds the worst case.
        let mut validated = Vec::with_capacity(extracted.len());
        for product in extracted {
            if self.images.validate(&product.image).await {
                validated.push(product);
            } else {
                tracing::debug!(
                    url = %url,
                    title = %product.title,
                    image = %product.image,
                    "dropping product with unreachable image"
                );
            }
        }

        Ok(rank_url_products(dedup_products(validated), PER_URL_PRODUCT_CAP))
    }

    /// Catalog entries matching the request facets, image-checked and
    /// converted to the response shape. Store attribution is not filtered
    /// here: the merged list spans every analyzed store.
    async fn catalog_products(&self, season: &str, categories: &str) -> Vec<Product> {
        let matching = filter_entries(&self.catalog, season, categories, None);

        let mut products = Vec::with_capacity(matching.len());
        for entry in &matching {
            if self.images.validate(&entry.imagen_url).await {
                products.push(entry.to_product());
            } else {
                tracing::debug!(
                    titulo = %entry.titulo,
                    image = %entry.imagen_url,
                    "dropping catalog entry with unreachable image"
                );
            }
        }
        products
    }
}
