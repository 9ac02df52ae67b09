use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tagscope::include;
use tagscope::project::ProjectLayout;
use tagscope::util;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn set(paths: &[&PathBuf]) -> BTreeSet<PathBuf> {
    paths.iter().map(|p| (*p).clone()).collect()
}

#[test]
fn direct_includes_keep_quoted_only() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.c");
    write(
        &file,
        "#include <stdio.h>\n  #include \"util.h\"\n#include \"util.h\"\n\t#include \"sub/io.h\"\nint x;\n",
    );
    let includes = include::direct_includes(&file);
    let expected: BTreeSet<String> = ["util.h", "sub/io.h"].iter().map(|s| s.to_string()).collect();
    assert_eq!(includes, expected);
}

#[test]
fn system_only_includes_are_empty() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("sys.c");
    write(&file, "#include <system.h>\n");
    assert!(include::direct_includes(&file).is_empty());
}

#[test]
fn missing_file_has_no_includes() {
    let dir = tempfile::tempdir().unwrap();
    assert!(include::direct_includes(&dir.path().join("gone.c")).is_empty());
}

#[test]
fn non_utf8_bytes_do_not_hide_includes() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("latin1.c");
    let mut bytes = b"/* caf\xe9 */\n".to_vec();
    bytes.extend_from_slice(b"#include \"ok.h\"\n");
    fs::write(&file, bytes).unwrap();
    assert!(include::direct_includes(&file).contains("ok.h"));
}

#[test]
fn resolve_prefers_earlier_root() {
    let dir = tempfile::tempdir().unwrap();
    let root_a = util::absolutize(&dir.path().join("a"));
    let root_b = util::absolutize(&dir.path().join("b"));
    write(&root_a.join("x.h"), "");
    write(&root_b.join("x.h"), "");
    write(&root_b.join("y.h"), "");

    let roots = vec![root_a.clone(), root_b.clone()];
    assert_eq!(include::resolve(&roots, "x.h"), Some(root_a.join("x.h")));
    assert_eq!(include::resolve(&roots, "y.h"), Some(root_b.join("y.h")));
    assert_eq!(include::resolve(&roots, "z.h"), None);
}

#[test]
fn resolve_ignores_directories() {
    let dir = tempfile::tempdir().unwrap();
    let root = util::absolutize(dir.path());
    fs::create_dir_all(root.join("inc.h")).unwrap();
    assert_eq!(include::resolve(&[root], "inc.h"), None);
}

#[test]
fn closure_survives_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let root = util::absolutize(dir.path());
    let a = root.join("a.c");
    let b = root.join("b.h");
    write(&a, "#include \"b.h\"\n");
    write(&b, "#include \"a.c\"\n");

    let closure = include::transitive_closure(&[root.clone()], &a);
    let members: BTreeSet<PathBuf> = closure.into_iter().collect();
    assert_eq!(members, set(&[&a, &b]));
}

#[test]
fn closure_spans_roots_and_skips_unresolvable() {
    let dir = tempfile::tempdir().unwrap();
    let base = util::absolutize(dir.path());
    let src = base.join("src");
    let inc = base.join("include");
    let main = src.join("main.c");
    let api = inc.join("api.h");
    let types = inc.join("detail").join("types.h");
    let local = src.join("local.h");
    write(
        &main,
        "#include <stdlib.h>\n#include \"api.h\"\n#include \"local.h\"\n#include \"missing.h\"\n",
    );
    write(&api, "#include \"detail/types.h\"\n#include \"local.h\"\n");
    write(&types, "typedef int handle;\n");
    write(&local, "#include \"api.h\"\n");

    let closure = include::transitive_closure(&[src.clone(), inc.clone()], &main);
    let members: BTreeSet<PathBuf> = closure.iter().cloned().collect();
    assert_eq!(members, set(&[&main, &api, &types, &local]));
}

#[test]
fn closure_of_lone_file_is_itself() {
    let dir = tempfile::tempdir().unwrap();
    let root = util::absolutize(dir.path());
    let file = root.join("solo.c");
    write(&file, "int solo;\n");
    let closure = include::transitive_closure(&[root], &file);
    assert_eq!(closure.len(), 1);
    assert!(closure.contains(&file));
}

#[test]
fn parent_relative_includes_collapse_to_one_member() {
    let dir = tempfile::tempdir().unwrap();
    let root = util::absolutize(dir.path());
    let main = root.join("src").join("main.c");
    let shared = root.join("shared.h");
    write(&main, "#include \"../shared.h\"\n#include \"shared.h\"\n");
    write(&shared, "");

    let closure = include::transitive_closure(&[root.join("src"), root.clone()], &main);
    assert_eq!(closure.len(), 2);
    assert!(closure.contains(&shared));
}

#[test]
fn search_roots_follow_project_layout() {
    let dir = tempfile::tempdir().unwrap();
    let base = util::absolutize(dir.path());
    let file = base.join("src").join("main.c");
    write(&file, "");

    assert_eq!(include::search_roots(&file, None), vec![base.join("src")]);

    let layout = ProjectLayout::new(
        base.join("app.project"),
        vec![PathBuf::from("include"), PathBuf::from("src")],
    );
    assert_eq!(
        include::search_roots(&file, Some(&layout)),
        vec![base.join("include"), base.join("src")]
    );

    let empty = ProjectLayout::new(base.join("app.project"), Vec::new());
    assert_eq!(include::search_roots(&file, Some(&empty)), vec![base.join("src")]);
}
