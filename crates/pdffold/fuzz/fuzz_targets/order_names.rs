#![no_main]

use libfuzzer_sys::fuzz_target;
use pdffold::discovery::CandidateFile;
use pdffold::ordering::{OrderingRules, collate, normalize_name};
use std::cmp::Ordering;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let names: Vec<&str> = s.split('\n').filter(|n| !n.is_empty() && !n.contains('/')).collect();

    // Collation is a total order on normalized names.
    for pair in names.windows(2) {
        let a = normalize_name(pair[0]);
        let b = normalize_name(pair[1]);
        assert_eq!(collate(&a, &b), collate(&b, &a).reverse());
        assert_eq!(collate(&a, &a), Ordering::Equal);
    }

    // Sorting depends only on the names, not on their input order.
    let files: Vec<CandidateFile> = names
        .iter()
        .map(|n| CandidateFile::from_path(format!("/fuzz/{n}")))
        .collect();
    let mut reversed = files.clone();
    reversed.reverse();

    let rules = OrderingRules::default();
    let keys = |files: Vec<CandidateFile>| -> Vec<_> {
        rules
            .sort(files)
            .into_iter()
            .map(|f| rules.key_for(&f.name))
            .collect()
    };
    assert_eq!(keys(files), keys(reversed));
});
