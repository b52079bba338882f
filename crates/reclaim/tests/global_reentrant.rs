//! Destructors that call back into the process-wide tracker.
//!
//! Lives in its own test binary so the shared tracker starts out empty.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use nebula_reclaim::{Handle, Tag, global};

/// Registers a follow-up allocation when dropped.
struct Requeue;

impl Drop for Requeue {
    fn drop(&mut self) {
        global::register(Handle::new(String::from("follow-up")));
    }
}

#[test]
fn destructors_may_reenter_the_global_tracker() {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        global::enable(1).unwrap();
        let scope = global::request_token().unwrap();

        global::register(Handle::new(Requeue));
        let unscoped = global::release_unscoped();

        global::register_scoped(scope, Handle::new(Requeue)).unwrap();
        let scoped = global::release_by_tag(Tag::Scoped(scope));

        global::register(Handle::new(Requeue));
        let teardown = global::release_all();

        tx.send((unscoped, scoped, teardown)).unwrap();
    });

    let (unscoped, scoped, teardown) = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("release under the global lock deadlocked");

    assert_eq!(unscoped, 1);
    assert_eq!(scoped, 1);
    // two follow-ups from the earlier releases plus one fresh Requeue
    assert_eq!(teardown, 3);

    // the teardown's own follow-up landed after the lock was released
    assert_eq!(global::with(|tracker| tracker.len()), 1);
    assert_eq!(global::release_all(), 1);
}
