//! Template cache behaviour through the public entry points

use hashbrace::cache::{CacheSettings, TemplateCache};
use hashbrace::parsing::GrammarLimits;
use hashbrace::{parse, try_parse};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn cache_with_window(window: Duration) -> TemplateCache {
    TemplateCache::new(
        CacheSettings {
            sliding_expiration: window,
            ..CacheSettings::default()
        },
        GrammarLimits::default(),
    )
}

#[test]
fn test_global_parse_returns_same_instance() {
    init_tracing();
    let source = "global identity #{Customer.Name}";
    let first = parse(source).unwrap();
    let second = parse(source).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let outcome = try_parse(source);
    assert!(outcome.success());
    assert!(Arc::ptr_eq(&first, outcome.template.as_ref().unwrap()));
}

#[test]
fn test_global_failure_is_reported_each_time() {
    init_tracing();
    let source = "#{if Broken}never closed";
    let first = parse(source).unwrap_err();
    let second = parse(source).unwrap_err();
    assert_eq!(first, second);
    assert!(!hashbrace::cache::global().contains(source));

    let outcome = try_parse(source);
    assert!(!outcome.success());
    assert_eq!(outcome.error, Some(first.to_string()));
}

#[test]
fn test_error_message_names_the_position() {
    let outcome = try_parse("ok\n#{Foo.}");
    let message = outcome.error.unwrap();
    assert!(message.contains("line 2"), "{}", message);
}

#[test]
fn test_sliding_window_is_reset_by_hits() {
    init_tracing();
    let cache = cache_with_window(Duration::from_millis(300));
    let first = cache.get_or_parse("#{Name}").unwrap();

    // Each hit lands inside the window, so the entry survives well past one
    // window length in total.
    thread::sleep(Duration::from_millis(150));
    let second = cache.get_or_parse("#{Name}").unwrap();
    thread::sleep(Duration::from_millis(150));
    let third = cache.get_or_parse("#{Name}").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &third));

    thread::sleep(Duration::from_millis(500));
    let fourth = cache.get_or_parse("#{Name}").unwrap();
    assert!(!Arc::ptr_eq(&first, &fourth));
    assert_eq!(first, fourth);
}

#[test]
fn test_concurrent_misses_share_one_instance() {
    init_tracing();
    let cache = Arc::new(TemplateCache::default());
    let source = "#{each x in Xs}#{x | Trim}#{/each}";

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.get_or_parse(source).unwrap())
        })
        .collect();
    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(cache.len(), 1);
    let retained = cache.get_or_parse(source).unwrap();
    for result in &results {
        assert!(Arc::ptr_eq(result, &retained));
    }
}

#[test]
fn test_concurrent_distinct_keys() {
    let cache = Arc::new(TemplateCache::default());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..50 {
                    let source = format!("worker {} item {} #{{Value}}", worker, i);
                    cache.get_or_parse(&source).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 200);
}

#[test]
fn test_grammar_limits_apply_through_the_cache() {
    let cache = TemplateCache::new(
        CacheSettings::default(),
        GrammarLimits {
            max_nesting_depth: 1,
            ..GrammarLimits::default()
        },
    );
    assert!(cache.get_or_parse("#{if A}x#{/if}").is_ok());
    assert!(cache.get_or_parse("#{if A}#{if B}x#{/if}#{/if}").is_err());
    assert_eq!(cache.len(), 1);
}
