use super::*;

#[test]
fn intern_is_idempotent() {
    let mut reg = TagRegistry::new();
    let a = reg.intern("emphasis").unwrap();
    let b = reg.intern("emphasis").unwrap();
    let c = reg.intern("keyword").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(reg.len(), 2);
    assert_eq!(reg.name(c), Some("keyword"));
    assert_eq!(reg.lookup("keyword"), Some(c));
    assert_eq!(reg.lookup("missing"), None);
}

#[test]
fn tag_set_stays_sorted_and_unique() {
    let mut reg = TagRegistry::new();
    let a = reg.intern("a").unwrap();
    let b = reg.intern("b").unwrap();
    let c = reg.intern("c").unwrap();

    let mut set = TagSet::new();
    assert!(set.insert(c));
    assert!(set.insert(a));
    assert!(!set.insert(c));
    assert!(set.insert(b));
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![a, b, c]);

    assert!(set.remove(b));
    assert!(!set.remove(b));
    assert!(!set.contains(b));
    assert_eq!(set.len(), 2);
}

#[test]
fn insertion_order_does_not_affect_equality() {
    let mut reg = TagRegistry::new();
    let a = reg.intern("a").unwrap();
    let b = reg.intern("b").unwrap();
    let x: TagSet = [a, b].into_iter().collect();
    let y: TagSet = [b, a, b].into_iter().collect();
    assert_eq!(x, y);
}
