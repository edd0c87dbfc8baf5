// tests/path_derivation.rs

use std::path::{Path, PathBuf};

use proptest::prelude::*;

use mpbuild::paths::{derive_output_path, relative_to_root, slash_path, ExtensionMap};

fn derive(source: &str) -> Option<PathBuf> {
    derive_output_path(
        Path::new(source),
        Path::new("/proj/src"),
        Path::new("/proj/dist"),
        &ExtensionMap::default(),
    )
}

#[test]
fn mapped_extensions_are_renamed() {
    assert_eq!(derive("/proj/src/a.pcss"), Some(PathBuf::from("/proj/dist/a.wxss")));
    assert_eq!(derive("/proj/src/a.css"), Some(PathBuf::from("/proj/dist/a.wxss")));
    assert_eq!(derive("/proj/src/p/index.pug"), Some(PathBuf::from("/proj/dist/p/index.wxml")));
    assert_eq!(derive("/proj/src/p/old.jade"), Some(PathBuf::from("/proj/dist/p/old.wxml")));
    assert_eq!(derive("/proj/src/app.ts"), Some(PathBuf::from("/proj/dist/app.js")));
}

#[test]
fn unmapped_extensions_pass_through() {
    assert_eq!(derive("/proj/src/app.js"), Some(PathBuf::from("/proj/dist/app.js")));
    assert_eq!(derive("/proj/src/img/logo.png"), Some(PathBuf::from("/proj/dist/img/logo.png")));
    assert_eq!(derive("/proj/src/LICENSE"), Some(PathBuf::from("/proj/dist/LICENSE")));
}

#[test]
fn only_the_final_extension_is_mapped() {
    assert_eq!(derive("/proj/src/types.d.ts"), Some(PathBuf::from("/proj/dist/types.d.js")));
    assert_eq!(derive("/proj/src/ts.json"), Some(PathBuf::from("/proj/dist/ts.json")));
}

#[test]
fn relative_sources_are_taken_from_the_source_root() {
    assert_eq!(derive("pages/home.pug"), Some(PathBuf::from("/proj/dist/pages/home.wxml")));
    assert_eq!(derive("pages/home.pug"), derive("/proj/src/pages/home.pug"));
}

#[test]
fn paths_outside_the_source_root_have_no_output() {
    assert_eq!(derive("/elsewhere/a.ts"), None);
    assert_eq!(derive("/proj/srcx/a.ts"), None);
    assert_eq!(derive("../a.ts"), None);
    assert_eq!(derive("/proj/src/../a.ts"), None);
    assert_eq!(derive("/proj/src"), None);
}

#[test]
fn relative_roots_are_stripped_when_the_source_repeats_them() {
    let out = derive_output_path(
        Path::new("src/pages/a.pcss"),
        Path::new("src"),
        Path::new("dist"),
        &ExtensionMap::default(),
    );
    assert_eq!(out, Some(PathBuf::from("dist/pages/a.wxss")));
    assert_eq!(relative_to_root(Path::new("src/x.ts"), Path::new("src")), Some(Path::new("x.ts")));
}

#[test]
fn custom_extension_maps_are_honoured() {
    let map = ExtensionMap::from_pairs([("scss", "wxss")]);
    assert_eq!(map.map("scss"), "wxss");
    assert_eq!(map.map("ts"), "ts");
    assert_eq!(map.apply(Path::new("a/b.scss")), PathBuf::from("a/b.wxss"));
}

#[test]
fn slash_path_uses_forward_slashes() {
    let rel = Path::new("pages").join("home").join("index.pug");
    assert_eq!(slash_path(&rel), "pages/home/index.pug");
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,7}"
}

fn extension() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["ts", "js", "pug", "jade", "css", "pcss", "png", "json", "wxml"])
}

proptest! {
    #[test]
    fn derivation_is_pure_and_stays_under_the_output_root(
        dirs in prop::collection::vec(segment(), 0..4),
        stem in segment(),
        ext in extension(),
    ) {
        let mut rel = PathBuf::new();
        for dir in &dirs {
            rel.push(dir);
        }
        rel.push(format!("{stem}.{ext}"));

        let source_root = Path::new("/proj/src");
        let output_root = Path::new("/proj/dist");
        let map = ExtensionMap::default();

        let from_abs = derive_output_path(&source_root.join(&rel), source_root, output_root, &map);
        let from_rel = derive_output_path(&rel, source_root, output_root, &map);
        let again = derive_output_path(&rel, source_root, output_root, &map);

        prop_assert_eq!(&from_abs, &from_rel);
        prop_assert_eq!(&from_rel, &again);

        let out = from_abs.unwrap();
        let unmapped = output_root.join(&rel);
        prop_assert!(out.starts_with(output_root));
        prop_assert_eq!(out.parent(), unmapped.parent());
        prop_assert_eq!(out.file_stem(), rel.file_stem());
        prop_assert_eq!(
            out.extension().and_then(|e| e.to_str()),
            Some(map.map(ext))
        );
    }

    #[test]
    fn sources_outside_the_root_never_derive(
        dirs in prop::collection::vec(segment(), 0..3),
        stem in segment(),
        ext in extension(),
    ) {
        let mut source = PathBuf::from("/other");
        for dir in &dirs {
            source.push(dir);
        }
        source.push(format!("{stem}.{ext}"));

        let out = derive_output_path(
            &source,
            Path::new("/proj/src"),
            Path::new("/proj/dist"),
            &ExtensionMap::default(),
        );
        prop_assert_eq!(out, None);
    }
}
