#![no_main]

use blockdoc::{BlockRegistry, BlockText, LanguageFilter, RegistryHost, normalize, process_page};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Normalizing any block must not panic and keeps one executable line per input line
        let block = BlockText::from_text(s, 1);
        let rendering = normalize(&block);
        if !block.is_empty() {
            assert_eq!(rendering.executable.split('\n').count(), block.len());
        }

        // Scanning the text as a page must not panic either
        let mut registry = BlockRegistry::new();
        let _ = process_page("fuzz", s, &LanguageFilter::python(), &mut RegistryHost::new(&mut registry));
    }
});
