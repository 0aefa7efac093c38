//! End-to-end tests: discovery, parallel build, liveness and deletion on
//! real Java sources.

use classprune::analysis::RetainReason;
use classprune::graph::ResolutionStrategy;
use classprune::refactor::SafeDeleter;
use classprune::{Config, Pipeline, PipelineError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/shop")
}

fn config_for(targets: &[&str]) -> Config {
    Config {
        targets: targets.iter().map(|t| t.to_string()).collect(),
        ..Config::default()
    }
}

/// Copy the fixture project so that deletions do not touch the repository
fn copy_fixture() -> TempDir {
    fn copy_dir(from: &Path, to: &Path) {
        fs::create_dir_all(to).unwrap();
        for entry in fs::read_dir(from).unwrap() {
            let entry = entry.unwrap();
            let target = to.join(entry.file_name());
            if entry.file_type().unwrap().is_dir() {
                copy_dir(&entry.path(), &target);
            } else {
                fs::copy(entry.path(), &target).unwrap();
            }
        }
    }

    let dir = TempDir::new().unwrap();
    copy_dir(&fixture_path(), dir.path());
    dir
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn test_fixture_deletable_set() {
    let config = config_for(&["com.shop.legacy.LegacyExporter"]);
    let analysis = Pipeline::new(&config).run(&fixture_path()).unwrap();

    let deletable: Vec<_> = analysis.liveness.deletable_names().collect();
    assert_eq!(
        deletable,
        vec![
            "com.shop.legacy.CsvWriter",
            "com.shop.legacy.Edge",
            "com.shop.legacy.Escaper",
            "com.shop.legacy.LegacyExporter",
            "com.shop.legacy.LegacyFormat",
            "com.shop.legacy.Node",
        ]
    );
}

#[test]
fn test_fixture_retained_units_and_reasons() {
    let config = config_for(&["com.shop.legacy.LegacyExporter"]);
    let analysis = Pipeline::new(&config).run(&fixture_path()).unwrap();

    let money = analysis
        .liveness
        .retained
        .iter()
        .find(|r| r.name == "com.shop.util.Money")
        .expect("Money is used by OrderService");
    assert_eq!(money.reason, RetainReason::Referenced);
    assert_eq!(money.referenced_by, vec!["com.shop.OrderService"]);

    let audit = analysis
        .liveness
        .retained
        .iter()
        .find(|r| r.name == "com.example.tools.Audit")
        .expect("Audit is reserved");
    assert_eq!(audit.reason, RetainReason::Reserved);
    assert!(analysis.liveness.reserved_skipped.contains("com.example.tools.Audit"));
}

#[test]
fn test_fixture_reports_skipped_files_and_cycles() {
    let config = config_for(&["com.shop.legacy.LegacyExporter"]);
    let analysis = Pipeline::new(&config).run(&fixture_path()).unwrap();

    assert_eq!(analysis.build.skipped.len(), 1);
    assert!(analysis.build.skipped[0].path.ends_with("Broken.java"));
    assert!(!analysis.build.catalog.contains("com.shop.Broken"));

    assert_eq!(analysis.cycles.len(), 1);
    assert_eq!(
        analysis.cycles[0].members,
        vec!["com.shop.legacy.Edge", "com.shop.legacy.Node"]
    );
}

#[test]
fn test_reverse_graph_matches_forward_graph() {
    let config = config_for(&["com.shop.App"]);
    let analysis = Pipeline::new(&config).run(&fixture_path()).unwrap();

    let graph = &analysis.build.graph;
    assert!(graph.reverse().is_transpose_of(graph));
    assert_eq!(graph.unit_count(), analysis.build.catalog.len());
}

#[test]
fn test_single_thread_and_many_threads_agree() {
    let mut config = config_for(&["com.shop.legacy.LegacyExporter"]);
    config.workers.threads = Some(1);
    let single = Pipeline::new(&config).run(&fixture_path()).unwrap();

    config.workers.threads = Some(8);
    let many = Pipeline::new(&config).run(&fixture_path()).unwrap();

    assert_eq!(single.liveness, many.liveness);
    assert_eq!(single.build.graph.reference_count(), many.build.graph.reference_count());
}

#[test]
fn test_delete_end_to_end_is_idempotent() {
    let project = copy_fixture();
    let config = config_for(&["com.shop.legacy.LegacyExporter"]);
    let analysis = Pipeline::new(&config).run(project.path()).unwrap();
    let plan = analysis.plan(&config);
    assert_eq!(plan.len(), 6);

    let deleter = SafeDeleter::new(false, false, None);
    let summary = deleter.execute(&plan).unwrap();
    assert_eq!(summary.deleted.len(), 6);
    assert!(summary.failed.is_empty());

    let java = project.path().join("src/main/java/com/shop");
    assert!(!java.join("legacy/LegacyExporter.java").exists());
    assert!(!java.join("legacy/Escaper.java").exists());
    assert!(java.join("util/Money.java").exists());
    assert!(java.join("App.java").exists());

    let again = deleter.execute(&plan).unwrap();
    assert!(again.deleted.is_empty());
    assert_eq!(again.already_gone.len(), 6);
}

#[test]
fn test_absent_target_is_deleted_by_name() {
    let project = TempDir::new().unwrap();
    write(project.path(), "src/main/java/app/Main.java", "package app; class Main {}");
    // Unparsable, so it never reaches the catalog
    write(project.path(), "src/main/java/app/Dead.java", "package app; class Dead {");

    let config = config_for(&["app.Dead"]);
    let analysis = Pipeline::new(&config).run(project.path()).unwrap();
    assert!(analysis.liveness.absent_targets.contains("app.Dead"));

    let plan = analysis.plan(&config);
    assert_eq!(plan.len(), 1);
    assert!(plan.files[0].path.ends_with("app/Dead.java"));
}

#[test]
fn test_resolution_strategies_differ_on_foreign_simple_names() {
    let project = TempDir::new().unwrap();
    // `Helper` lives in another package and is not imported
    write(project.path(), "a/User.java", "package a; class User { Helper helper; }");
    write(project.path(), "b/Helper.java", "package b; public class Helper {}");

    let mut config = config_for(&["a.User"]);
    let analysis = Pipeline::new(&config).run(project.path()).unwrap();
    assert!(analysis.liveness.is_deletable("b.Helper"));

    config.resolution = ResolutionStrategy::NamespaceQualify;
    let analysis = Pipeline::new(&config).run(project.path()).unwrap();
    assert!(!analysis.liveness.is_deletable("b.Helper"));
    assert_eq!(analysis.liveness.candidates, 1);
}

#[test]
fn test_nested_types_count_for_the_top_level_class() {
    let project = TempDir::new().unwrap();
    write(
        project.path(),
        "p/Outer.java",
        "package p; public class Outer { public static class Inner {} }",
    );
    write(project.path(), "p/Target.java", "package p; class Target { Outer.Inner inner; }");
    write(project.path(), "p/Other.java", "package p; class Other { p.Outer.Inner inner; }");

    let config = config_for(&["p.Target"]);
    let analysis = Pipeline::new(&config).run(project.path()).unwrap();

    assert!(!analysis.liveness.is_deletable("p.Outer"));
    assert_eq!(analysis.liveness.retained[0].referenced_by, vec!["p.Other"]);
}

#[test]
fn test_shared_file_is_left_alone() {
    let project = TempDir::new().unwrap();
    write(
        project.path(),
        "p/Pair.java",
        "package p; class Dead {} class Alive {}",
    );
    write(project.path(), "p/Target.java", "package p; class Target { Dead d; }");
    write(project.path(), "p/User.java", "package p; class User { Alive a; }");

    let config = config_for(&["p.Target"]);
    let analysis = Pipeline::new(&config).run(project.path()).unwrap();

    assert!(!analysis.liveness.is_deletable("p.Dead"));
    let plan = analysis.plan(&config);
    assert_eq!(plan.len(), 1);
    assert!(plan.files[0].path.ends_with("Target.java"));
}

#[test]
fn test_stage_failures_propagate() {
    let config = config_for(&[]);
    assert!(matches!(
        Pipeline::new(&config).run(&fixture_path()),
        Err(PipelineError::NoTargets)
    ));

    let config = config_for(&["a.B"]);
    let missing = fixture_path().join("does-not-exist");
    assert!(matches!(
        Pipeline::new(&config).run(&missing),
        Err(PipelineError::RootNotFound(_))
    ));
}

#[test]
fn test_target_sharing_a_file_keeps_its_dependencies() {
    let project = TempDir::new().unwrap();
    write(
        project.path(),
        "p/Pair.java",
        "package p; class Target { Helper h; } class Alive {}",
    );
    write(project.path(), "p/Helper.java", "package p; class Helper {}");
    write(project.path(), "p/User.java", "package p; class User { Alive a; }");

    let config = config_for(&["p.Target"]);
    let analysis = Pipeline::new(&config).run(project.path()).unwrap();

    assert!(!analysis.liveness.is_deletable("p.Helper"));
    let plan = analysis.plan(&config);
    assert!(plan.is_empty());
    assert_eq!(plan.shared.len(), 1);
    assert!(plan.shared[0].path.ends_with("Pair.java"));
    assert_eq!(plan.shared[0].deletable, vec!["p.Target"]);
    assert_eq!(plan.shared[0].surviving, vec!["p.Alive"]);
}

fn nested_import_project(user_import: &str) -> TempDir {
    let project = TempDir::new().unwrap();
    write(
        project.path(),
        "lib/Outer.java",
        "package lib; public class Outer { public static class Inner {} }",
    );
    write(
        project.path(),
        "app/Target.java",
        "package app; import lib.Outer; class Target { Outer o; }",
    );
    write(
        project.path(),
        "app/User.java",
        &format!("package app; import {}; class User {{ Inner i; }}", user_import),
    );
    project
}

#[test]
fn test_wildcard_import_of_nested_types_keeps_the_outer_class() {
    let project = nested_import_project("lib.Outer.*");

    for count_imports in [true, false] {
        let mut config = config_for(&["app.Target"]);
        config.count_imports = count_imports;
        let analysis = Pipeline::new(&config).run(project.path()).unwrap();

        assert_eq!(analysis.build.graph.dependencies_of("app.User"), vec!["lib.Outer"]);
        assert!(!analysis.liveness.is_deletable("lib.Outer"));
        assert_eq!(analysis.liveness.retained[0].referenced_by, vec!["app.User"]);
    }
}

#[test]
fn test_single_import_of_nested_type_keeps_the_outer_class() {
    let project = nested_import_project("lib.Outer.Inner");

    let mut config = config_for(&["app.Target"]);
    config.count_imports = false;
    let analysis = Pipeline::new(&config).run(project.path()).unwrap();

    assert_eq!(analysis.build.graph.dependencies_of("app.User"), vec!["lib.Outer"]);
    assert!(!analysis.liveness.is_deletable("lib.Outer"));
    assert_eq!(analysis.liveness.deletable_names().collect::<Vec<_>>(), vec!["app.Target"]);
}

#[test]
fn test_sealed_parent_keeps_its_permitted_subclass() {
    let project = TempDir::new().unwrap();
    write(
        project.path(),
        "s/Shape.java",
        "package s; public sealed interface Shape permits Circle {}",
    );
    write(project.path(), "s/Circle.java", "package s; final class Circle implements Shape {}");
    write(project.path(), "s/Factory.java", "package s; class Factory { Circle make() { return null; } }");
    write(project.path(), "s/Canvas.java", "package s; class Canvas { Shape shape; }");

    let config = config_for(&["s.Factory"]);
    let analysis = Pipeline::new(&config).run(project.path()).unwrap();

    assert!(!analysis.liveness.is_deletable("s.Circle"));
    assert!(!analysis.liveness.is_deletable("s.Shape"));
    assert_eq!(analysis.liveness.deletable_names().collect::<Vec<_>>(), vec!["s.Factory"]);
}
