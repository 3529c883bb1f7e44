use std::sync::Arc;
use std::thread;
use chrono::Duration;
use nxql_core::core::config::{CursorConfig, EngineConfig};
use nxql_core::core::error::{Error, ErrorKind};
use nxql_core::search::clock::ManualClock;
use nxql_core::search::cursor::{CursorService, Extractor, IterCursor};

fn service(clock: Arc<ManualClock>) -> CursorService<u32, u32> {
    let extractor: Extractor<u32, u32> = Arc::new(|n| {
        if n == 13 {
            Err(Error::extraction("unlucky"))
        } else {
            Ok(n * 10)
        }
    });
    CursorService::with_clock(extractor, CursorConfig::default(), clock)
}

#[test]
fn pages_cover_all_items_in_order() {
    for (n, batch) in [(0u32, 3usize), (6, 3), (7, 3), (1, 5)] {
        let svc = service(Arc::new(ManualClock::default()));
        let id = svc.register_cursor(IterCursor::new(0..n), Some(batch), None).unwrap();
        let mut seen = Vec::new();
        let mut pages = 0;
        loop {
            let page = svc.scroll(&id).unwrap();
            if page.is_empty() {
                break;
            }
            pages += 1;
            seen.extend(page.results);
        }
        assert_eq!(pages, (n as usize).div_ceil(batch), "n={} batch={}", n, batch);
        assert_eq!(seen, (0..n).map(|i| i * 10).collect::<Vec<_>>());
        assert!(svc.scroll(&id).unwrap_err().is_scroll_gone());
        assert!(svc.is_empty());
    }
}

#[test]
fn failed_extractions_do_not_stop_the_batch() {
    let svc = service(Arc::new(ManualClock::default()));
    let id = svc.register_cursor(IterCursor::new(12..16), Some(10), None).unwrap();
    assert_eq!(svc.scroll(&id).unwrap().results, vec![120, 140, 150]);
}

#[test]
fn inactivity_expires_the_scroll() {
    let clock = Arc::new(ManualClock::default());
    let svc = service(clock.clone());
    let id = svc.register_cursor(IterCursor::new(0..100), Some(10), Some(30)).unwrap();
    svc.scroll(&id).unwrap();
    clock.advance(Duration::seconds(29));
    svc.scroll(&id).unwrap();
    clock.advance(Duration::seconds(31));
    assert_eq!(svc.scroll(&id).unwrap_err().kind, ErrorKind::Expired);
    assert_eq!(svc.scroll(&id).unwrap_err().kind, ErrorKind::NotFound);
}

#[test]
fn unregister_and_clear() {
    let svc = service(Arc::new(ManualClock::default()));
    let a = svc.register_cursor(IterCursor::new(0..5), None, None).unwrap();
    svc.register_cursor_with_id("fixed", IterCursor::new(0..5), None, None).unwrap();
    assert_eq!(svc.len(), 2);
    assert!(svc.unregister_cursor(&a));
    assert!(!svc.unregister_cursor(&a));
    svc.clear();
    assert!(!svc.contains("fixed"));
}

#[test]
fn concurrent_scrolls_share_one_cursor() {
    let svc = Arc::new(service(Arc::new(ManualClock::default())));
    let id = svc.register_cursor(IterCursor::new(0..1000), Some(7), None).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let svc = svc.clone();
            let id = id.clone();
            thread::spawn(move || {
                let mut got = Vec::new();
                while let Ok(page) = svc.scroll(&id) {
                    if page.is_empty() {
                        break;
                    }
                    got.extend(page.results);
                }
                got
            })
        })
        .collect();
    let mut all: Vec<u32> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
    all.sort_unstable();
    let expected: Vec<u32> = (0..1000).filter(|&i| i != 13).map(|i| i * 10).collect();
    assert_eq!(all, expected);
}

#[test]
fn engine_config_supplies_cursor_defaults() {
    let config = EngineConfig::from_json_str(r#"{"cursor": {"default_batch_size": 4}}"#).unwrap();
    let extractor: Extractor<u32, u32> = Arc::new(|n| Ok(n));
    let svc = CursorService::from_config(extractor, &config);
    assert_eq!(svc.config().default_batch_size, 4);
    let id = svc.register_cursor(IterCursor::new(0..10), None, None).unwrap();
    assert_eq!(svc.scroll(&id).unwrap().len(), 4);
}
