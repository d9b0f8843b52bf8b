//! End-to-end tests of the move-in watcher against real inotify.

use std::fs;
use std::os::unix::fs::symlink;
use std::path::Path;
use std::thread;
use std::time::Duration;

use linkwatch::watcher::{Notifier, NotifyError, Stopped, WatchChannel, notify};
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Point `dir/name` at `dest` the way deploy tools do: create a temporary
/// link, then rename it over the old one.
fn swap_symlink(dir: &Path, name: &str, dest: &str) {
    let staging = dir.join(format!(".{name}.tmp"));
    symlink(dest, &staging).unwrap();
    fs::rename(&staging, dir.join(name)).unwrap();
}

#[test]
fn test_symlink_swaps_reach_handler() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("link");

    // Register before starting the loop so no rename can be missed.
    let mut channel = WatchChannel::open().unwrap();
    channel.watch(dir.path()).unwrap();

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let (cancel_tx, cancel_rx) = crossbeam_channel::bounded(1);
    let notifier = Notifier::new(&target).unwrap().cancel_on(cancel_rx);

    let worker = thread::spawn(move || {
        notifier.run_with(channel, move |event| {
            event_tx.send(event).unwrap();
        })
    });

    swap_symlink(dir.path(), "link", "release-1");
    swap_symlink(dir.path(), "sibling", "release-1");
    swap_symlink(dir.path(), "link", "release-2");

    let first = event_rx.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(first.name, "link");
    assert!(first.is_moved_in());

    // The sibling rename happened in between; only the second swap may follow.
    let second = event_rx.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(second.name, "link");
    assert_eq!(fs::read_link(&target).unwrap(), Path::new("release-2"));

    cancel_tx.send(()).unwrap();
    assert_eq!(worker.join().unwrap().unwrap(), Stopped::Cancelled);
    assert!(event_rx.try_recv().is_err());
}

#[test]
fn test_plain_writes_are_not_reported() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("link");

    let mut channel = WatchChannel::open().unwrap();
    channel.watch(dir.path()).unwrap();

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let (cancel_tx, cancel_rx) = crossbeam_channel::bounded(1);
    let notifier = Notifier::new(&target).unwrap().cancel_on(cancel_rx);
    let worker = thread::spawn(move || {
        notifier.run_with(channel, move |event| {
            event_tx.send(event).unwrap();
        })
    });

    // Creating and removing the file in place is not a move-in.
    fs::write(&target, "in place").unwrap();
    fs::remove_file(&target).unwrap();
    swap_symlink(dir.path(), "link", "release-1");

    let event = event_rx.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(event.name, "link");
    assert!(event.is_moved_in());
    assert!(event_rx.recv_timeout(Duration::from_millis(100)).is_err());

    cancel_tx.send(()).unwrap();
    assert_eq!(worker.join().unwrap().unwrap(), Stopped::Cancelled);
}

#[test]
fn test_notify_on_regular_file_parent_fails() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, "not a directory").unwrap();

    let mut calls = 0;
    let err = notify(file.join("link"), |_| calls += 1).unwrap_err();

    match err {
        NotifyError::WatchRegistration { path, .. } => assert_eq!(path, file),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(calls, 0);
}

#[test]
fn test_notify_on_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let err = notify(dir.path().join("gone").join("link"), |_| {}).unwrap_err();
    assert!(matches!(err, NotifyError::WatchRegistration { .. }));
}

#[test]
fn test_notify_rejects_path_without_name() {
    let err = notify("/", |_| {}).unwrap_err();
    assert!(matches!(err, NotifyError::InvalidTarget { .. }));
}

#[test]
fn test_cancelled_watches_release_their_handles() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("link");

    // More rounds than the default per-user inotify instance limit (128).
    for round in 0..200 {
        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded(1);
        cancel_tx.send(()).unwrap();

        let stopped = Notifier::new(&target)
            .unwrap()
            .cancel_on(cancel_rx)
            .run(|_| panic!("quiet directory produced an event"));
        assert_eq!(stopped.unwrap(), Stopped::Cancelled, "round {round}");
    }

    assert!(WatchChannel::open().is_ok());
}
