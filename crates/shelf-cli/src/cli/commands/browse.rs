use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use shelf_catalog::{volume_selector, CatalogClient, CatalogConfig, Volume, VolumeSearchSource};
use shelf_core::{
    FetchOutcome, FileTermStore, ListCache, ListConfig, ListError, ListResult, TermStore,
};
use tracing::info;

use crate::cli::args::BrowseArgs;
use crate::exit_codes::{self, EXIT_SUCCESS};

/// Key under which the browse filter is remembered.
const LIST_NAME: &str = "browse";

#[derive(Debug, Serialize)]
struct BrowseReport<'a> {
    query: &'a str,
    filter: String,
    pages_loaded: usize,
    total_loaded: usize,
    exhausted: bool,
    items: Vec<Volume>,
}

pub async fn run(args: BrowseArgs) -> Result<i32> {
    let cache = match build_cache(&args).await {
        Ok(cache) => cache,
        Err(e) => return Ok(report_error(&e)),
    };

    if let Some(filter) = &args.filter {
        cache.set_search_term(filter.clone());
        cache.flush_search().await;
    }

    let mut pages_loaded = 0;
    for _ in 0..args.pages {
        match cache.fetch_next().await {
            Ok(FetchOutcome::Merged { .. }) => pages_loaded += 1,
            Ok(FetchOutcome::Discarded) => continue,
            Ok(FetchOutcome::Exhausted) | Ok(FetchOutcome::Skipped(_)) => break,
            Err(e) => return Ok(report_error(&e)),
        }
    }

    let items = cache.current_view();
    info!(
        query = %args.query,
        pages_loaded,
        total = cache.len(),
        shown = items.len(),
        "browse finished"
    );

    if args.json {
        let report = BrowseReport {
            query: &args.query,
            filter: cache.search_term(),
            pages_loaded,
            total_loaded: cache.len(),
            exhausted: !cache.has_more(),
            items,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for volume in &items {
            println!("{}", format_volume(volume));
        }
        let term = cache.search_term();
        if term.is_empty() {
            eprintln!("{} of {} loaded", items.len(), cache.len());
        } else {
            eprintln!(
                "{} of {} loaded (filter: '{}')",
                items.len(),
                cache.len(),
                term
            );
        }
    }

    Ok(EXIT_SUCCESS)
}

async fn build_cache(args: &BrowseArgs) -> ListResult<ListCache<Volume>> {
    let mut list_config = ListConfig::from_env();
    if let Some(page_size) = args.page_size {
        list_config = list_config.with_page_size(page_size);
    }

    let mut catalog_config = CatalogConfig::from_env();
    if let Some(url) = &args.base_url {
        catalog_config = catalog_config.with_url(url.clone());
    }

    let client = CatalogClient::new(catalog_config)?;
    let source = Arc::new(VolumeSearchSource::new(client, args.query.clone()));

    let mut builder = ListCache::builder(source)
        .name(LIST_NAME)
        .selector(volume_selector())
        .config(list_config);
    if !args.no_persist {
        builder = builder.term_store(term_store(args)?);
    }
    builder.build().await
}

fn term_store(args: &BrowseArgs) -> ListResult<Arc<dyn TermStore>> {
    let store = match &args.term_file {
        Some(path) => FileTermStore::new(path),
        None => FileTermStore::default_location()?,
    };
    Ok(Arc::new(store))
}

fn format_volume(volume: &Volume) -> String {
    let title = if volume.title.is_empty() {
        "N/A"
    } else {
        volume.title.as_str()
    };
    if volume.authors.is_empty() {
        format!("{}\t{}", volume.id, title)
    } else {
        format!("{}\t{} ({})", volume.id, title, volume.authors.join(", "))
    }
}

fn report_error(err: &ListError) -> i32 {
    eprintln!("error: {}", err);
    exit_codes::for_error(err)
}
