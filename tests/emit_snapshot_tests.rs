//! Snapshot tests for emitted doctest files and rewritten pages
//!
//! Review changes: `cargo insta review`

use blockdoc::emit::render_test_file;
use blockdoc::page::process_page;
use blockdoc::{BlockRegistry, DoctestConfig, LanguageFilter, RegistryHost};

/// Scan a page into a fresh registry, returning the rewritten page and the page's test file.
fn scan_and_emit(page: &str, source: &str) -> (String, String) {
    let mut registry = BlockRegistry::new();
    registry.reset(page);
    let rendered = process_page(page, source, &LanguageFilter::python(), &mut RegistryHost::new(&mut registry))
        .expect("page scan failed");

    let config = DoctestConfig::default();
    let tests = registry
        .materialize()
        .into_iter()
        .find(|p| p.page == page)
        .map(|p| render_test_file(&p, &config))
        .unwrap_or_default();
    (rendered, tests)
}

const TUTORIAL: &str = "\
# Tutorial

```python
// import pytest
// with pytest.raises(ValueError):
       raise ValueError('This is helpful')
       // print('This should not print')
```

```python
   for f in foo():
       print(f)
// from foo import bar
   bar()
```
";

#[test]
fn test_tutorial_page_rendering() {
    let (rendered, _) = scan_and_emit("tutorial", TUTORIAL);
    insta::assert_snapshot!(rendered.trim_end(), @r"
    # Tutorial

    ```python
    raise ValueError('This is helpful')
    ```

    ```python
    for f in foo():
        print(f)
    bar()
    ```
    ");
}

#[test]
fn test_tutorial_doctests() {
    let (_, tests) = scan_and_emit("tutorial", TUTORIAL);
    insta::assert_snapshot!(tests.trim_end(), @r"
    def test_tutorial_l4():
        import pytest
        with pytest.raises(ValueError):
            raise ValueError('This is helpful')
            print('This should not print')

    def test_tutorial_l11():
        for f in foo():
            print(f)
        from foo import bar
        bar()
    ");
}
