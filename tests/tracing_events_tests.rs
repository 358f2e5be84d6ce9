//! Structural-change events emitted with the `tracing` feature.

#![cfg(feature = "tracing")]

use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use bitmapped_vector::persistent::PersistentVector;
use rstest::rstest;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Clone, Default)]
struct MessageCollector {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MessageCollector {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

struct MessageVisitor(Option<String>);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: Subscriber> Layer<S> for MessageCollector {
    fn on_event(&self, event: &Event<'_>, _context: Context<'_, S>) {
        if event.metadata().target() != "bitmapped_vector" {
            return;
        }
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if let Some(message) = visitor.0 {
            self.messages.lock().unwrap().push(message);
        }
    }
}

fn collect_messages<F: FnOnce()>(operation: F) -> Vec<String> {
    let collector = MessageCollector::default();
    let subscriber = tracing_subscriber::registry().with(collector.clone());
    tracing::subscriber::with_default(subscriber, operation);
    collector.messages()
}

#[rstest]
fn test_growth_is_traced() {
    let vector: PersistentVector<usize> = (0..1024).collect();
    let messages = collect_messages(|| {
        let _ = vector.add(1024);
    });
    assert!(messages.iter().any(|message| message == "trie grew a level"));
}

#[rstest]
fn test_collapse_is_traced() {
    let vector: PersistentVector<usize> = (0..1025).collect();
    let messages = collect_messages(|| {
        let popped = vector.pop();
        assert_eq!(popped.levels(), 1);
    });
    assert!(messages.iter().any(|message| message == "replacing suffix"));
    assert!(
        messages
            .iter()
            .any(|message| message == "trie dropped a redundant level")
    );
}

#[rstest]
fn test_bulk_build_is_traced() {
    let messages = collect_messages(|| {
        let _: PersistentVector<u8> = (0..100).collect();
    });
    assert_eq!(messages, vec!["building trie from leaves".to_string()]);
}

#[rstest]
fn test_reads_are_silent() {
    let vector: PersistentVector<usize> = (0..5000).collect();
    let messages = collect_messages(|| {
        assert_eq!(vector.get(4321), Some(&4321));
        assert_eq!(vector.iter().count(), 5000);
    });
    assert!(messages.is_empty());
}
