//! Concurrent readers and serialized writers.

use std::thread;

use stubtree::parser::SyntaxKind;

use crate::helpers::file_helpers::*;
use crate::helpers::source_fixtures::*;

const THREADS: usize = 8;

#[test]
fn test_concurrent_promotion_converges() {
    let manager = manager();
    let anchor = open_indexed(&manager, CLASS_WITH_MEMBERS);
    let class = {
        let access = manager.read();
        stub_children(&anchor.file_element(), &access, SyntaxKind::CLASS).remove(0)
    };

    let nodes: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    let access = manager.read();
                    class.node(&access).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert!(nodes.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(anchor.tree_loads(), 1);
    assert!(class.is_bound());
}

#[test]
fn test_concurrent_lazy_expansion_converges() {
    let manager = manager();
    let anchor = open_parsed(&manager, NESTED_BODIES);
    let body = {
        let access = manager.read();
        let fun = child(&anchor.file_element(), &access, SyntaxKind::FUN);
        child(&fun, &access, SyntaxKind::BLOCK)
    };

    let counts: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    let access = manager.read();
                    body.children(&access).unwrap().len()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert!(counts.iter().all(|count| *count == counts[0]));
    let access = manager.read();
    assert_eq!(anchor.text(&access).unwrap(), NESTED_BODIES);
}

#[test]
fn test_writers_are_serialized() {
    let manager = manager();
    let anchor = open_parsed(&manager, ONE_CLASS);
    let (file, class) = {
        let access = manager.read();
        let file = anchor.file_element();
        let class = child(&file, &access, SyntaxKind::CLASS);
        (file, class)
    };

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                let write = manager.write();
                file.add(&write, &class).unwrap();
            });
        }
    });

    let access = manager.read();
    let classes = file
        .find_children_by_type(&access, SyntaxKind::CLASS.element_type())
        .unwrap();
    assert_eq!(classes.len(), THREADS + 1);
    assert_eq!(anchor.take_formatting_hints().len(), THREADS);
}

#[test]
fn test_cancellation_reaches_other_threads() {
    let manager = manager();
    let anchor = open_indexed(&manager, CLASS_WITH_MEMBERS);
    let class = {
        let access = manager.read();
        stub_children(&anchor.file_element(), &access, SyntaxKind::CLASS).remove(0)
    };

    let access = manager.read();
    thread::scope(|scope| {
        scope.spawn(|| manager.cancel()).join().unwrap();
    });
    assert!(class.node(&access).unwrap_err().is_cancelled());
    assert!(!anchor.is_tree_loaded());
}
