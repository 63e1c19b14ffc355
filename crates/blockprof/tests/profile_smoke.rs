//! End-to-end smoke tests against the public facade.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use blockprof::sink::BlockSink;
use blockprof::{BlockRecord, Color, ProfilerSessionBuilder, StatusFlags};

/// A sink that just counts what it is given, like an exporter would.
#[derive(Default)]
struct CountingSink {
    records: AtomicUsize,
    flushes: AtomicUsize,
}

/// Local newtype so the `BlockSink` impl satisfies the orphan rule.
struct SharedSink(Arc<CountingSink>);

impl BlockSink for SharedSink {
    fn accept(&self, _record: BlockRecord) {
        self.0.records.fetch_add(1, Ordering::Relaxed);
    }

    fn flush_blocking(&self) {
        self.0.flushes.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn custom_sink_receives_records() {
    let sink = Arc::new(CountingSink::default());
    let session = ProfilerSessionBuilder::new("smoke")
        .enabled(true)
        .sink(Box::new(SharedSink(sink.clone())));

    for _ in 0..3 {
        blockprof::profile_block!(session, "iteration");
    }
    session.flush_blocking();

    assert_eq!(sink.records.load(Ordering::Relaxed), 3);
    assert_eq!(sink.flushes.load(Ordering::Relaxed), 1);
}

#[test]
fn parallel_threads_record_without_interference() {
    let (session, storage) = ProfilerSessionBuilder::new("smoke").enabled(true).memory();

    let mut handles = Vec::new();
    for thread_index in 0..4 {
        let session = session.clone();
        handles.push(std::thread::spawn(move || {
            for _ in 0..10 {
                session.run_block(
                    "work",
                    || std::hint::black_box(thread_index),
                    Color::DEFAULT,
                    StatusFlags::ON,
                    file!(),
                    line!(),
                );
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(storage.read().len(), 4 * 10);

    // All threads hit the same callsite, so exactly one descriptor exists
    // and every record points at it.
    assert_eq!(session.num_callsites(), 1);
    let records = storage.take();
    let first = records[0].descriptor;
    assert!(records.iter().all(|r| std::ptr::eq(r.descriptor, first)));
}

#[test]
fn nested_scopes_give_contained_durations() {
    let session = ProfilerSessionBuilder::new("smoke").enabled(true).buffered();

    {
        blockprof::profile_block!(session, "outer");
        std::thread::sleep(std::time::Duration::from_millis(2));
        {
            blockprof::profile_block!(session, "inner", Color::GREEN);
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
    }

    let records = session.drain_backlog();
    assert_eq!(records.len(), 2);

    let inner = &records[0];
    let outer = &records[1];
    assert_eq!(inner.name(), "inner");
    assert_eq!(outer.name(), "outer");
    assert_eq!(inner.color, Color::GREEN);

    assert!(outer.start <= inner.start);
    assert!(inner.end() <= outer.end());
    assert!(outer.duration >= inner.duration);
}
