//! Property tests over generated source trees

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;
use treesync_sync::{sync_directory, SyncOptions};
use treesync_tests::test_utils::{list_files, TreeFixture};
use treesync_types::Concurrency;

fn file_names() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[a-d]{1,3}\\.(txt|log)", 1..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_excluded_names_never_reach_destination(
        names in file_names(),
        pattern in "[a-d]|log",
        concurrency in 1usize..6,
    ) {
        let fixture = TreeFixture::new().unwrap();
        for (i, name) in names.iter().enumerate() {
            let relative = format!("d{}/{}", i % 3, name);
            fixture.write_file(&relative, i, 1_000).unwrap();
        }

        let options = SyncOptions::default()
            .with_exclude([pattern.clone()])
            .with_concurrency(Concurrency::new(concurrency).unwrap());
        let report = tokio_test::block_on(sync_directory(
            fixture.source(),
            fixture.destination(),
            options,
        ))
        .unwrap();

        let expected: Vec<PathBuf> = list_files(fixture.source())
            .unwrap()
            .into_iter()
            .filter(|path| !path.to_string_lossy().contains(pattern.as_str()))
            .collect();
        let copied = list_files(fixture.destination()).unwrap();

        prop_assert_eq!(&copied, &expected);
        prop_assert_eq!(report.stats.files_copied, expected.len() as u64);
    }

    #[test]
    fn prop_second_run_copies_nothing(names in file_names()) {
        let fixture = TreeFixture::new().unwrap();
        for (i, name) in names.iter().enumerate() {
            fixture.write_file(name, i * 3, 1_000).unwrap();
        }

        let first = tokio_test::block_on(sync_directory(
            fixture.source(),
            fixture.destination(),
            SyncOptions::default(),
        ))
        .unwrap();
        let second = tokio_test::block_on(sync_directory(
            fixture.source(),
            fixture.destination(),
            SyncOptions::default(),
        ))
        .unwrap();

        prop_assert_eq!(first.stats.files_copied, names.len() as u64);
        prop_assert_eq!(second.stats.files_copied, 0);
        prop_assert_eq!(second.stats.files_unchanged, names.len() as u64);
    }
}
