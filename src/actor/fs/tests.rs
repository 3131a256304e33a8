use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use tempfile::TempDir;

use super::classifier::EventClassifier;
use super::debouncer::{DEBOUNCE_MS, Debouncer, is_temp_file};
use super::types::{ChangeKind, WatchScope};
use super::watch_roots::WatchRoots;
use crate::actor::messages::RebuildMsg;
use crate::utils::path::normalize_path;

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn metadata_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

fn touch(root: &Path, rel: &str) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "x").unwrap();
    path
}

fn raw(entries: &[(&Path, ChangeKind)]) -> FxHashMap<PathBuf, ChangeKind> {
    entries.iter().map(|(p, k)| (p.to_path_buf(), *k)).collect()
}

// ============================================================================
// debouncer
// ============================================================================

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new();
    assert!(!debouncer.is_ready());
    assert_eq!(debouncer.sleep_duration(), Duration::from_secs(86400));
}

#[test]
fn test_event_routing_by_kind() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.md"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/b.html"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/c.scss"], remove_kind()));

    assert_eq!(debouncer.changes.len(), 3);
    assert_eq!(debouncer.changes[Path::new("/tmp/a.md")], ChangeKind::Created);
    assert_eq!(debouncer.changes[Path::new("/tmp/b.html")], ChangeKind::Modified);
    assert_eq!(debouncer.changes[Path::new("/tmp/c.scss")], ChangeKind::Removed);
}

#[test]
fn test_metadata_changes_ignored() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], metadata_kind()));
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_temp_files_ignored() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(
        vec!["/tmp/a.md~", "/tmp/.a.md.swp", "/tmp/b.bak", "/tmp/.hidden", "/tmp/ok.md"],
        modify_kind(),
    ));
    assert_eq!(debouncer.changes.len(), 1);
    assert!(debouncer.changes.contains_key(Path::new("/tmp/ok.md")));

    assert!(is_temp_file(Path::new("/s/.page.html.42.tmp")));
    assert!(!is_temp_file(Path::new("/s/variables.yaml")));
}

#[test]
fn test_dedup_transitions() {
    let mut debouncer = Debouncer::new();

    // restored after removal
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], remove_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], create_kind()));
    // modified then deleted
    debouncer.add_event(&make_event(vec!["/tmp/b.md"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/b.md"], remove_kind()));
    // appeared and vanished
    debouncer.add_event(&make_event(vec!["/tmp/c.md"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/c.md"], remove_kind()));
    // first wins
    debouncer.add_event(&make_event(vec!["/tmp/d.md"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/d.md"], modify_kind()));

    assert_eq!(debouncer.changes[Path::new("/tmp/a.md")], ChangeKind::Created);
    assert_eq!(debouncer.changes[Path::new("/tmp/b.md")], ChangeKind::Removed);
    assert!(!debouncer.changes.contains_key(Path::new("/tmp/c.md")));
    assert_eq!(debouncer.changes[Path::new("/tmp/d.md")], ChangeKind::Created);
}

#[test]
fn test_take_waits_for_debounce_window() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.md"], modify_kind()));

    assert!(!debouncer.is_ready());
    assert!(debouncer.take_if_ready().is_none());
    assert!(debouncer.sleep_duration() <= Duration::from_millis(DEBOUNCE_MS));

    debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 10));
    assert!(debouncer.is_ready());
    let taken = debouncer.take_if_ready().unwrap();
    assert_eq!(taken.len(), 1);
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

// ============================================================================
// classifier
// ============================================================================

#[test]
fn test_single_scope_emits_files() {
    let dir = TempDir::new().unwrap();
    let root = normalize_path(dir.path());
    let a = touch(&root, "src/a.md");
    let b = touch(&root, "src/b.html");

    let out = EventClassifier::classify(
        raw(&[(&b, ChangeKind::Modified), (&a, ChangeKind::Created)]),
        WatchScope::SingleFile,
    );
    assert_eq!(out.messages, vec![RebuildMsg::File(a), RebuildMsg::File(b)]);
    assert!(out.new_dirs.is_empty());
}

#[test]
fn test_single_scope_variables_file_is_full() {
    let dir = TempDir::new().unwrap();
    let root = normalize_path(dir.path());
    let a = touch(&root, "src/a.md");
    let vars = touch(&root, "src/blog/variables.yaml");

    let out = EventClassifier::classify(
        raw(&[(&a, ChangeKind::Modified), (&vars, ChangeKind::Modified)]),
        WatchScope::SingleFile,
    );
    assert_eq!(out.messages, vec![RebuildMsg::Full]);
}

#[test]
fn test_removals_and_vanished_paths_dropped() {
    let dir = TempDir::new().unwrap();
    let root = normalize_path(dir.path());
    let gone = root.join("src/gone.md");
    let missing = root.join("src/never.md");

    let out = EventClassifier::classify(
        raw(&[(&gone, ChangeKind::Removed), (&missing, ChangeKind::Created)]),
        WatchScope::SingleFile,
    );
    assert_eq!(out, Default::default());
}

#[test]
fn test_removed_but_present_is_rebuilt() {
    // atomic saves report a removal of a file that is back in place
    let dir = TempDir::new().unwrap();
    let root = normalize_path(dir.path());
    let a = touch(&root, "src/a.md");

    let out = EventClassifier::classify(raw(&[(&a, ChangeKind::Removed)]), WatchScope::SingleFile);
    assert_eq!(out.messages, vec![RebuildMsg::File(a)]);
}

#[test]
fn test_created_dir_is_expanded() {
    let dir = TempDir::new().unwrap();
    let root = normalize_path(dir.path());
    let x = touch(&root, "src/new/x.md");
    let y = touch(&root, "src/new/deep/y.html");
    touch(&root, "src/new/.x.md.swp");
    let new_dir = root.join("src/new");

    let out = EventClassifier::classify(
        raw(&[(&new_dir, ChangeKind::Created)]),
        WatchScope::SingleFile,
    );
    assert_eq!(out.new_dirs, vec![new_dir.clone(), new_dir.join("deep")]);
    assert_eq!(out.messages, vec![RebuildMsg::File(y), RebuildMsg::File(x)]);
}

#[test]
fn test_full_scope_always_full() {
    let dir = TempDir::new().unwrap();
    let root = normalize_path(dir.path());
    let template = touch(&root, "templates/post.html");
    let config = touch(&root, "site.toml");

    let out = EventClassifier::classify(
        raw(&[(&template, ChangeKind::Modified), (&config, ChangeKind::Modified)]),
        WatchScope::Full,
    );
    assert_eq!(out.messages, vec![RebuildMsg::Full]);

    let partials = root.join("templates/partials");
    std::fs::create_dir_all(&partials).unwrap();
    let out = EventClassifier::classify(raw(&[(&partials, ChangeKind::Created)]), WatchScope::Full);
    assert_eq!(out.new_dirs, vec![partials]);
    assert_eq!(out.messages, vec![RebuildMsg::Full]);
}

#[test]
fn test_modified_dir_ignored() {
    let dir = TempDir::new().unwrap();
    let root = normalize_path(dir.path());
    touch(&root, "src/a.md");
    let src = root.join("src");

    let out = EventClassifier::classify(raw(&[(&src, ChangeKind::Modified)]), WatchScope::SingleFile);
    assert_eq!(out, Default::default());
}

// ============================================================================
// watch roots
// ============================================================================

#[test]
fn test_watch_roots_add_dedups() {
    let dir = TempDir::new().unwrap();
    let root = normalize_path(dir.path());
    let mut roots = WatchRoots::new(vec![root.clone()]);
    roots.add(root.join("new"));
    roots.add(root.join("new"));
    roots.add(root.clone());
    assert_eq!(roots.dirs(), [root.clone(), root.join("new")]);
}

#[test]
fn test_file_roots_watched_through_parent() {
    let dir = TempDir::new().unwrap();
    let root = normalize_path(dir.path());
    let config = touch(&root, "site.toml");
    let templates = root.join("templates");
    std::fs::create_dir_all(&templates).unwrap();

    let roots = WatchRoots::new(vec![config.clone(), templates.clone()]);
    assert_eq!(roots.watch_targets(), vec![root.clone(), templates.clone()]);

    assert!(roots.covers(&config));
    assert!(roots.covers(&templates.join("post.html")));
    assert!(roots.covers(&templates));
    // siblings seen through the parent watch
    assert!(!roots.covers(&root.join("site.toml.new")));
    assert!(!roots.covers(&root.join("README.md")));
    assert!(!roots.covers(&templates.join("partials/nav.html")));
}

#[tokio::test]
async fn test_config_replaced_by_rename_keeps_triggering() {
    use super::FsActor;

    let dir = TempDir::new().unwrap();
    let root = normalize_path(dir.path());
    let config = touch(&root, "site.toml");

    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let actor = FsActor::new(WatchScope::Full, vec![config.clone()], tx).unwrap();
    let handle = tokio::spawn(actor.run());

    for round in 0..3 {
        let fresh = root.join("site.toml.new");
        std::fs::write(&fresh, format!("[site]\ntitle = \"{round}\"\n")).unwrap();
        std::fs::rename(&fresh, &config).unwrap();

        let msg = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert_eq!(msg.ok().flatten(), Some(RebuildMsg::Full), "round {round}");

        // Swallow late events of this round
        tokio::time::sleep(Duration::from_millis(DEBOUNCE_MS * 2)).await;
        while rx.try_recv().is_ok() {}
    }

    handle.abort();
}
