use std::{fs, path::Path};

use ember::bytecode::module_cache::ModuleCache;
use ember::driver::compile_source;
use tempfile::TempDir;

fn cache_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[test]
fn stored_module_is_loaded_back() {
    let tmp = TempDir::new().expect("temp dir");
    let cache = ModuleCache::new(tmp.path().join("cache"));
    let source = "fn sq(x) { return x * x; } print(sq(4));";
    let module = compile_source(source).expect("compiles");

    assert!(cache.load(Path::new("sq.em"), source).is_none());
    cache
        .store(Path::new("sq.em"), source, &module)
        .expect("store");

    assert_eq!(cache.load(Path::new("sq.em"), source), Some(module));
    let files = cache_files(cache.dir());
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("sq-") && files[0].ends_with(".json"));
}

#[test]
fn edited_source_misses() {
    let tmp = TempDir::new().expect("temp dir");
    let cache = ModuleCache::new(tmp.path());
    let before = "print(1);";
    let module = compile_source(before).expect("compiles");
    cache
        .store(Path::new("main.em"), before, &module)
        .expect("store");

    assert!(cache.load(Path::new("main.em"), "print(2);").is_none());
    assert!(cache.load(Path::new("main.em"), before).is_some());
}

#[test]
fn corrupt_entry_is_a_miss() {
    let tmp = TempDir::new().expect("temp dir");
    let cache = ModuleCache::new(tmp.path());
    let source = "let a = 1;";
    let module = compile_source(source).expect("compiles");
    cache
        .store(Path::new("a.em"), source, &module)
        .expect("store");

    for name in cache_files(tmp.path()) {
        fs::write(tmp.path().join(name), "{ not json").expect("overwrite");
    }
    assert!(cache.load(Path::new("a.em"), source).is_none());
}

#[test]
fn entry_failing_verification_is_a_miss() {
    let tmp = TempDir::new().expect("temp dir");
    let cache = ModuleCache::new(tmp.path());
    let source = "let a = 1;";
    let mut module = compile_source(source).expect("compiles");
    module.constants.clear();
    cache
        .store(Path::new("a.em"), source, &module)
        .expect("store");

    assert!(cache.load(Path::new("a.em"), source).is_none());
}
