mod support;

use std::collections::HashSet;

use comicshelf::application::site::AdapterFailure;
use comicshelf::cache::{
    CacheConfig, ComicInfoCache, METRIC_CACHE_FETCH_ERROR, METRIC_CACHE_HIT,
    METRIC_CACHE_MEMO_EVICT, METRIC_CACHE_MISS,
};
use metrics_util::debugging::DebuggingRecorder;

use support::ScriptedScraper;

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let scraper = ScriptedScraper::echo("3.00");
    let config = CacheConfig {
        memo_capacity: 1,
        ..Default::default()
    };
    let cache = ComicInfoCache::new(scraper.clone(), &config);

    // miss + store, then hit
    cache.get_comic_info("example.com/a").await.expect("fetch a");
    cache.get_comic_info("example.com/a").await.expect("hit a");
    // second key pushes the first out of the one-slot memo
    cache.get_comic_info("example.com/b").await.expect("fetch b");

    let failing = ScriptedScraper::fixed(Err(AdapterFailure::other("offline")));
    let failing_cache = ComicInfoCache::new(failing, &config);
    assert!(failing_cache.get_comic_info("example.com/c").await.is_err());

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for metric in [
        METRIC_CACHE_HIT,
        METRIC_CACHE_MISS,
        METRIC_CACHE_MEMO_EVICT,
        METRIC_CACHE_FETCH_ERROR,
    ] {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
    assert_eq!(scraper.calls(), 2);
}
