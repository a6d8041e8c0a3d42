use super::*;

use crate::document::tags::TagRegistry;
use crate::render::fixed::FixedSizeRenderer;

#[test]
fn repeated_requests_hit_the_cache() {
    let registry = TagRegistry::new();
    let tags = TagSet::new();
    let word = WordRequest {
        text: "hello",
        tags: &tags,
        registry: &registry,
    };
    let mut cache = CachingRenderer::new(FixedSizeRenderer::new(10, 20));

    let a = cache.render(&word, StateCombination::ALL[0]).unwrap().unwrap();
    let b = cache.render(&word, StateCombination::ALL[0]).unwrap().unwrap();
    assert_eq!(a.size(), b.size());
    assert_eq!((cache.hits(), cache.misses()), (1, 1));

    cache.render(&word, StateCombination::ALL[1]).unwrap();
    assert_eq!(cache.misses(), 2);
    assert_eq!(cache.into_inner().calls(), 2);
}

#[test]
fn hidden_results_are_cached_too() {
    let registry = TagRegistry::new();
    let tags = TagSet::new();
    let word = WordRequest {
        text: "quiet",
        tags: &tags,
        registry: &registry,
    };
    let hidden = StateCombination::ALL[4];
    let mut cache = CachingRenderer::new(FixedSizeRenderer::new(10, 20).with_hidden(hidden));

    assert!(cache.render(&word, hidden).unwrap().is_none());
    assert!(cache.render(&word, hidden).unwrap().is_none());
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn tags_are_part_of_the_key() {
    let mut registry = TagRegistry::new();
    let plain = TagSet::new();
    let tagged: TagSet = [registry.intern("emphasis").unwrap()].into_iter().collect();
    let mut cache = CachingRenderer::new(FixedSizeRenderer::new(10, 20));

    for tags in [&plain, &tagged] {
        let word = WordRequest {
            text: "same",
            tags,
            registry: &registry,
        };
        cache.render(&word, StateCombination::ALL[0]).unwrap();
    }
    assert_eq!(cache.misses(), 2);
    assert_eq!(cache.hits(), 0);
}

#[test]
fn errors_are_not_cached() {
    let registry = TagRegistry::new();
    let tags = TagSet::new();
    let word = WordRequest {
        text: "boom",
        tags: &tags,
        registry: &registry,
    };
    let mut cache = CachingRenderer::new(FixedSizeRenderer::new(10, 20).with_failure("boom"));
    assert!(cache.render(&word, StateCombination::ALL[0]).is_err());
    assert!(cache.is_empty());
}
