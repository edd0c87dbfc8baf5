// tests/watch_events.rs

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use notify::event::{
    AccessKind, CreateKind, DataChange, EventKind, MetadataKind, ModifyKind, RemoveKind,
    RenameMode,
};
use notify::Event;

use mpbuild::exec::Stage;
use mpbuild::tasks::{compile_all, Category, CategoryMatcher};
use mpbuild::watch::path_utils::relative_str;
use mpbuild::watch::{apply_event, classify, spawn_watcher, FileEvent, FileEventKind, SourceIndex};
use mpbuild_test_utils::fake_toolchain::FakeToolchain;
use mpbuild_test_utils::fixture::ProjectFixture;
use mpbuild_test_utils::{eventually, init_tracing};

type TestResult = Result<(), Box<dyn Error>>;

fn event(kind: EventKind, paths: &[&str]) -> Event {
    paths
        .iter()
        .fold(Event::new(kind), |ev, p| ev.add_path(PathBuf::from(p)))
}

#[test]
fn create_and_remove_map_to_add_and_unlink() {
    assert_eq!(
        classify(&event(EventKind::Create(CreateKind::File), &["/s/a.ts"])),
        vec![FileEvent::new(FileEventKind::Add, "/s/a.ts")]
    );
    assert_eq!(
        classify(&event(EventKind::Remove(RemoveKind::File), &["/s/a.ts"])),
        vec![FileEvent::new(FileEventKind::Unlink, "/s/a.ts")]
    );
}

#[test]
fn content_modifications_are_changes() {
    assert_eq!(
        classify(&event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/s/a.pcss"]
        )),
        vec![FileEvent::new(FileEventKind::Change, "/s/a.pcss")]
    );
    assert_eq!(
        classify(&event(EventKind::Modify(ModifyKind::Any), &["/s/a.pcss"])),
        vec![FileEvent::new(FileEventKind::Change, "/s/a.pcss")]
    );
}

#[test]
fn renames_unlink_the_old_name_and_add_the_new_one() {
    assert_eq!(
        classify(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/s/old.pug", "/s/new.pug"]
        )),
        vec![
            FileEvent::new(FileEventKind::Unlink, "/s/old.pug"),
            FileEvent::new(FileEventKind::Add, "/s/new.pug"),
        ]
    );
    assert_eq!(
        classify(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            &["/s/old.pug"]
        )),
        vec![FileEvent::new(FileEventKind::Unlink, "/s/old.pug")]
    );
    assert_eq!(
        classify(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["/s/new.pug"]
        )),
        vec![FileEvent::new(FileEventKind::Add, "/s/new.pug")]
    );
}

#[test]
fn ambiguous_renames_are_decided_by_existence() -> TestResult {
    let dir = tempfile::tempdir()?;
    let present = dir.path().join("here.ts");
    fs::write(&present, "x")?;
    let absent = dir.path().join("gone.ts");

    let ev = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Any)))
        .add_path(present.clone())
        .add_path(absent.clone());

    assert_eq!(
        classify(&ev),
        vec![
            FileEvent::new(FileEventKind::Add, present),
            FileEvent::new(FileEventKind::Unlink, absent),
        ]
    );
    Ok(())
}

#[test]
fn metadata_and_access_events_are_ignored() {
    assert!(classify(&event(
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
        &["/s/a.ts"]
    ))
    .is_empty());
    assert!(classify(&event(EventKind::Access(AccessKind::Any), &["/s/a.ts"])).is_empty());
}

#[test]
fn relative_str_handles_direct_and_removed_paths() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path().join("src");
    fs::create_dir_all(root.join("pages"))?;

    assert_eq!(
        relative_str(&root, &root.join("pages/a.pug")).as_deref(),
        Some("pages/a.pug")
    );

    let canonical = root.canonicalize()?;
    assert_eq!(
        relative_str(&root, &canonical.join("pages/gone.pug")).as_deref(),
        Some("pages/gone.pug")
    );
    assert_eq!(relative_str(&root, dir.path()), None);
    Ok(())
}

#[tokio::test]
async fn unlink_removes_exactly_the_derived_output() -> TestResult {
    init_tracing();
    let fx = ProjectFixture::new();
    fx.write_source("b.pug", "view b");
    fx.write_source("c.pug", "view c");
    fx.write_output("b.pug.bak", "unrelated");
    let ctx = fx.context(Arc::new(FakeToolchain::new()));
    let matcher = CategoryMatcher::new(Category::Template)?;
    compile_all(&ctx, &matcher).await?;
    let mut index = SourceIndex::scan(&fx.src(), &matcher);
    assert_eq!(fx.output_files(), vec!["b.pug.bak", "b.wxml", "c.wxml"]);

    let source = fx.src().join("b.pug");
    fs::remove_file(&source)?;
    let event = FileEvent::new(FileEventKind::Unlink, source.clone());
    apply_event(&ctx, &matcher, &mut index, &event).await?;

    assert_eq!(fx.output_files(), vec!["b.pug.bak", "c.wxml"]);
    assert!(!index.contains(&source));
    assert!(index.contains(&fx.src().join("c.pug")));
    Ok(())
}

#[tokio::test]
async fn add_and_change_reproduce_the_output() -> TestResult {
    init_tracing();
    let fx = ProjectFixture::new();
    let tools = FakeToolchain::new();
    let ctx = fx.context(Arc::new(tools.clone()));
    let matcher = CategoryMatcher::new(Category::Style)?;
    let mut index = SourceIndex::new();

    let source = fx.write_source("pages/a.pcss", "v1");
    let added = FileEvent::new(FileEventKind::Add, source.clone());
    apply_event(&ctx, &matcher, &mut index, &added).await?;
    assert_eq!(
        fx.read_output("pages/a.wxss"),
        FakeToolchain::expected_output(Stage::Style, "v1")
    );

    fx.write_source("pages/a.pcss", "v2");
    let changed = FileEvent::new(FileEventKind::Change, source.clone());
    apply_event(&ctx, &matcher, &mut index, &changed).await?;
    assert_eq!(
        fx.read_output("pages/a.wxss"),
        FakeToolchain::expected_output(Stage::Style, "v2")
    );
    assert_eq!(tools.transformed_sources().len(), 2);
    assert!(index.contains(&source));
    Ok(())
}

#[tokio::test]
async fn unlink_of_a_never_compiled_file_is_harmless() -> TestResult {
    init_tracing();
    let fx = ProjectFixture::new();
    let ctx = fx.context(Arc::new(FakeToolchain::new()));
    let matcher = CategoryMatcher::new(Category::Script)?;

    let event = FileEvent::new(FileEventKind::Unlink, fx.src().join("never.ts"));
    apply_event(&ctx, &matcher, &mut SourceIndex::new(), &event).await?;

    assert!(fx.output_files().is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn a_live_session_follows_source_changes() -> TestResult {
    init_tracing();
    let fx = ProjectFixture::new();
    let tools = FakeToolchain::new().fail_on("broken.pcss");
    let ctx = Arc::new(fx.context(Arc::new(tools.clone())));

    let session = spawn_watcher(Arc::clone(&ctx), Category::Style)?;
    assert_eq!(session.category(), Category::Style);

    fx.write_source("broken.pcss", "oops");
    fx.write_source("app.pcss", "page {}");
    fx.write_source("app.ts", "ignored by the style session");

    let expected = FakeToolchain::expected_output(Stage::Style, "page {}");
    let out = fx.dist().join("app.wxss");
    assert!(
        eventually(|| fs::read_to_string(&out).map(|s| s == expected).unwrap_or(false)).await,
        "app.wxss was never produced"
    );
    assert!(!fx.dist().join("app.js").exists());
    assert!(!fx.dist().join("broken.wxss").exists());

    fs::remove_file(fx.src().join("app.pcss"))?;
    assert!(
        eventually(|| !out.exists()).await,
        "app.wxss was not removed after unlink"
    );

    drop(session);
    Ok(())
}

#[tokio::test]
async fn adding_a_directory_compiles_its_matching_files() -> TestResult {
    init_tracing();
    let fx = ProjectFixture::new();
    fx.write_source("pages/home/index.pcss", "home");
    fx.write_source("pages/home/deep/card.css", "card");
    fx.write_source("pages/home/index.ts", "Page({})");
    fx.write_source("pages/home/icon.png", "PNG");
    let tools = FakeToolchain::new();
    let ctx = fx.context(Arc::new(tools.clone()));
    let matcher = CategoryMatcher::new(Category::Style)?;
    let mut index = SourceIndex::new();

    let event = FileEvent::new(FileEventKind::Add, fx.src().join("pages"));
    apply_event(&ctx, &matcher, &mut index, &event).await?;

    assert_eq!(
        fx.output_files(),
        vec!["pages/home/deep/card.wxss", "pages/home/index.wxss"]
    );
    assert_eq!(index.len(), 2);
    assert_eq!(tools.transformed_sources().len(), 2);
    Ok(())
}

#[tokio::test]
async fn a_failing_file_does_not_stop_a_directory_add() -> TestResult {
    init_tracing();
    let fx = ProjectFixture::new();
    fx.write_source("lib/a.ts", "a");
    fx.write_source("lib/b.ts", "b(");
    fx.write_source("lib/c.ts", "c");
    let ctx = fx.context(Arc::new(FakeToolchain::new().fail_on("b.ts")));
    let matcher = CategoryMatcher::new(Category::Script)?;
    let mut index = SourceIndex::new();

    let event = FileEvent::new(FileEventKind::Add, fx.src().join("lib"));
    let result = apply_event(&ctx, &matcher, &mut index, &event).await;

    assert!(result.is_err());
    assert_eq!(fx.output_files(), vec!["lib/a.js", "lib/c.js"]);
    Ok(())
}

#[tokio::test]
async fn unlinking_a_directory_removes_only_owned_outputs() -> TestResult {
    init_tracing();
    let fx = ProjectFixture::new();
    fx.write_source("pages/a.pcss", "a");
    fx.write_source("pages/logo.png", "PNG");
    let ctx = fx.context(Arc::new(FakeToolchain::new()));
    let style = CategoryMatcher::new(Category::Style)?;
    let assets = CategoryMatcher::new(Category::Assets)?;
    compile_all(&ctx, &style).await?;
    compile_all(&ctx, &assets).await?;
    let mut style_index = SourceIndex::scan(&fx.src(), &style);
    let mut assets_index = SourceIndex::scan(&fx.src(), &assets);
    fx.write_output("pages/b.wxml", "hand-placed");

    fs::remove_dir_all(fx.src().join("pages"))?;
    let event = FileEvent::new(FileEventKind::Unlink, fx.src().join("pages"));
    apply_event(&ctx, &style, &mut style_index, &event).await?;
    assert_eq!(fx.output_files(), vec!["pages/b.wxml", "pages/logo.png"]);

    apply_event(&ctx, &assets, &mut assets_index, &event).await?;
    assert_eq!(fx.output_files(), vec!["pages/b.wxml"]);
    assert!(style_index.is_empty());
    assert!(assets_index.is_empty());
    Ok(())
}

#[tokio::test]
async fn an_unknown_directory_unlink_leaves_the_output_directory() -> TestResult {
    init_tracing();
    let fx = ProjectFixture::new();
    fx.write_output("pages/b.wxml", "hand-placed");
    let ctx = fx.context(Arc::new(FakeToolchain::new()));
    let assets = CategoryMatcher::new(Category::Assets)?;

    // `**/*` matches the directory name itself.
    assert!(assets.matches("pages"));
    let event = FileEvent::new(FileEventKind::Unlink, fx.src().join("pages"));
    apply_event(&ctx, &assets, &mut SourceIndex::new(), &event).await?;

    assert_eq!(fx.output_files(), vec!["pages/b.wxml"]);
    Ok(())
}

#[test]
fn source_index_drops_everything_below_a_path() {
    let mut index = SourceIndex::new();
    index.insert("/s/pages/a.pcss");
    index.insert("/s/pages/sub/b.pcss");
    index.insert("/s/pages-extra/c.pcss");
    index.insert("/s/app.pcss");

    let mut gone = index.remove_under(std::path::Path::new("/s/pages"));
    gone.sort();

    assert_eq!(
        gone,
        vec![
            PathBuf::from("/s/pages/a.pcss"),
            PathBuf::from("/s/pages/sub/b.pcss"),
        ]
    );
    assert_eq!(index.len(), 2);
    assert!(index.contains(std::path::Path::new("/s/pages-extra/c.pcss")));
    assert_eq!(
        index.remove_under(std::path::Path::new("/s/app.pcss")),
        vec![PathBuf::from("/s/app.pcss")]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn live_sessions_follow_directory_moves_and_renames() -> TestResult {
    init_tracing();
    let fx = ProjectFixture::new();
    let staging = fx.root().join("staging/pages");
    fs::create_dir_all(&staging)?;
    fs::write(staging.join("a.pcss"), "a {}")?;
    fs::write(staging.join("logo.png"), "PNG")?;
    let ctx = Arc::new(fx.context(Arc::new(FakeToolchain::new())));

    let style = spawn_watcher(Arc::clone(&ctx), Category::Style)?;
    let assets = spawn_watcher(Arc::clone(&ctx), Category::Assets)?;

    fs::rename(&staging, fx.src().join("pages"))?;

    let dist = fx.dist();
    let moved_in = ["pages/a.wxss", "pages/logo.png"];
    assert!(
        eventually(|| moved_in.iter().all(|rel| dist.join(rel).is_file())).await,
        "moved-in directory was not compiled: {:?}",
        fx.output_files()
    );
    assert_eq!(
        fx.read_output("pages/a.wxss"),
        FakeToolchain::expected_output(Stage::Style, "a {}")
    );

    fx.write_output("pages/b.wxml", "hand-placed");
    fs::rename(fx.src().join("pages"), fx.src().join("views"))?;

    assert!(
        eventually(|| {
            fx.output_files() == vec!["pages/b.wxml", "views/a.wxss", "views/logo.png"]
        })
        .await,
        "rename left {:?}",
        fx.output_files()
    );

    drop(style);
    drop(assets);
    Ok(())
}
