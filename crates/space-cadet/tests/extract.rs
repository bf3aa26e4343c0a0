//! End-to-end extraction over project fixtures

use std::fs;
use std::path::Path;

use space_cadet::{extract, extract_with_config, ClassEntity, ExplorerConfig, ExplorerError};
use tempfile::{tempdir, TempDir};

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempdir().unwrap();
    for (relative, content) in files {
        write(dir.path(), relative, content);
    }
    dir
}

fn names(classes: &[ClassEntity]) -> Vec<&str> {
    classes.iter().map(ClassEntity::name).collect()
}

fn path_of(root: &Path, relative: &str) -> String {
    root.join(relative).to_string_lossy().into_owned()
}

#[test]
fn test_single_file_two_classes() {
    let dir = project(&[
        ("tsconfig.json", "{}"),
        ("a.ts", "class Foo {}\nclass Bar {}\n"),
    ]);

    let classes = extract(dir.path()).unwrap();

    assert_eq!(names(&classes), vec!["Foo", "Bar"]);
    for class in &classes {
        assert_eq!(class.path(), path_of(dir.path(), "a.ts"));
        assert_eq!(class.position(), None);
    }
}

#[test]
fn test_files_in_path_order() {
    let dir = project(&[
        ("tsconfig.json", "{}"),
        ("src/b.ts", "export class B {}"),
        ("src/a.ts", "export class A {}"),
        ("src/nested/c.tsx", "export class C { render() { return <p />; } }"),
        ("README.md", "class NotCode {}"),
    ]);

    let classes = extract(dir.path()).unwrap();
    assert_eq!(names(&classes), vec!["A", "B", "C"]);
    assert_eq!(classes[2].path(), path_of(dir.path(), "src/nested/c.tsx"));
}

#[test]
fn test_no_config_is_config_not_found() {
    let dir = project(&[("a.ts", "class Foo {}")]);
    let result = extract(dir.path());
    assert!(matches!(result, Err(ExplorerError::ConfigNotFound { .. })));
}

#[test]
fn test_config_found_above_root() {
    let dir = project(&[
        ("tsconfig.json", r#"{ "include": ["packages/**/*"] }"#),
        ("packages/core/model.ts", "export class Model {}"),
    ]);

    let classes = extract(dir.path().join("packages/core")).unwrap();
    assert_eq!(names(&classes), vec!["Model"]);
}

#[test]
fn test_vendor_directories_excluded() {
    let dir = project(&[
        ("tsconfig.json", "{}"),
        ("index.ts", "export class App {}"),
        ("node_modules/lib/index.d.ts", "export declare class Vendored {}"),
        ("bower_components/old/old.ts", "class Old {}"),
    ]);

    let classes = extract(dir.path()).unwrap();
    assert_eq!(names(&classes), vec!["App"]);
}

#[test]
fn test_vendor_excluded_even_when_imported() {
    let dir = project(&[
        ("tsconfig.json", r#"{ "files": ["main.ts"] }"#),
        (
            "main.ts",
            "import { Vendored } from './node_modules/lib/index';\nexport class Main {}",
        ),
        ("node_modules/lib/index.ts", "export class Vendored {}"),
    ]);

    let classes = extract(dir.path()).unwrap();
    assert_eq!(names(&classes), vec!["Main"]);
}

#[test]
fn test_relative_imports_followed() {
    let dir = project(&[
        ("tsconfig.json", r#"{ "files": ["src/main.ts"] }"#),
        (
            "src/main.ts",
            "import { Util } from './lib/util';\nimport '../shared/extra.js';\nimport * as fs from 'fs';\nexport class Main {}",
        ),
        ("src/lib/util.ts", "export class Util {}"),
        ("shared/extra.ts", "export class Extra {}"),
        ("src/unused.ts", "export class Unused {}"),
    ]);

    let classes = extract(dir.path()).unwrap();
    assert_eq!(names(&classes), vec!["Main", "Util", "Extra"]);

    let config = ExplorerConfig::default().with_follow_imports(false);
    let classes = extract_with_config(dir.path(), config).unwrap();
    assert_eq!(names(&classes), vec!["Main"]);
}

#[test]
fn test_extends_include_relative_to_base() {
    let dir = project(&[
        ("config/base.json", r#"{ "include": ["../lib/**/*"] }"#),
        ("app/tsconfig.json", r#"{ "extends": "../config/base.json" }"#),
        ("lib/shape.ts", "export abstract class Shape {}"),
        ("app/ignored.ts", "export class Ignored {}"),
    ]);

    let classes = extract(dir.path().join("app")).unwrap();
    assert_eq!(names(&classes), vec!["Shape"]);
}

#[test]
fn test_explicit_exclude() {
    let dir = project(&[
        (
            "tsconfig.json",
            r#"{
                // legacy code stays out
                "include": ["src"],
                "exclude": ["src/legacy"],
            }"#,
        ),
        ("src/modern.ts", "export class Modern {}"),
        ("src/legacy/old.ts", "export class Old {}"),
    ]);

    let classes = extract(dir.path()).unwrap();
    assert_eq!(names(&classes), vec!["Modern"]);
}

#[test]
fn test_out_dir_excluded_by_default() {
    let dir = project(&[
        ("tsconfig.json", r#"{ "compilerOptions": { "outDir": "dist" } }"#),
        ("src/a.ts", "export class Source {}"),
        ("dist/a.d.ts", "export declare class Built {}"),
    ]);

    let classes = extract(dir.path()).unwrap();
    assert_eq!(names(&classes), vec!["Source"]);
}

#[test]
fn test_missing_listed_file_is_skipped() {
    let dir = project(&[
        ("tsconfig.json", r#"{ "files": ["gone.ts", "here.ts"] }"#),
        ("here.ts", "class Here {}"),
    ]);

    let classes = extract(dir.path()).unwrap();
    assert_eq!(names(&classes), vec!["Here"]);
}

#[test]
fn test_anonymous_default_export() {
    let dir = project(&[
        ("tsconfig.json", "{}"),
        ("a.ts", "export default class {}"),
        ("b.ts", "export default class Named {}"),
    ]);

    let classes = extract(dir.path()).unwrap();
    assert_eq!(names(&classes), vec!["Unknown", "Named"]);
}

#[test]
fn test_allow_js() {
    let files = [
        ("a.ts", "class Typed {}"),
        ("legacy.js", "class Legacy {}"),
    ];

    let dir = project(&files);
    write(dir.path(), "tsconfig.json", "{}");
    assert_eq!(names(&extract(dir.path()).unwrap()), vec!["Typed"]);

    write(
        dir.path(),
        "tsconfig.json",
        r#"{ "compilerOptions": { "allowJs": true } }"#,
    );
    assert_eq!(names(&extract(dir.path()).unwrap()), vec!["Typed", "Legacy"]);
}

#[test]
fn test_malformed_config() {
    let dir = project(&[("tsconfig.json", "{ \"include\": [ }"), ("a.ts", "class A {}")]);
    let result = extract(dir.path());
    assert!(matches!(result, Err(ExplorerError::ConfigParse { .. })));
}

#[test]
fn test_syntax_errors_warn_unless_strict() {
    let dir = project(&[
        ("tsconfig.json", "{}"),
        ("a.ts", "export class Good {}"),
        ("b.ts", "class Broken { method( }"),
    ]);

    let classes = extract(dir.path()).unwrap();
    assert_eq!(classes[0].name(), "Good");

    let strict = ExplorerConfig::default().with_strict_syntax(true);
    let result = extract_with_config(dir.path(), strict);
    assert!(matches!(result, Err(ExplorerError::ParseOrCompile { .. })));
}

#[test]
fn test_empty_project() {
    let dir = project(&[("tsconfig.json", "{}")]);
    assert!(extract(dir.path()).unwrap().is_empty());
}
